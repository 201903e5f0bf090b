//! Engine session management
//!
//! A [`Session`] owns the write half of the transport and a background reader task.
//! The reader completes pending requests, answers requests coming from the engine, and
//! hands notifications the UI subscribed to to a forwarding task, which feeds them into
//! a bounded channel. A slow UI stalls only the forwarder, so responses keep flowing.
//! When the transport closes and the last notification is delivered, the channel
//! closes too; that is the engine-exit signal.

use crate::{
    engine::{Engine, UiOptions},
    protocol::{Message, MessageCodec},
    RpcError,
};
use async_trait::async_trait;
use bytes::BytesMut;
use rmpv::Value;
use std::collections::{HashMap, HashSet};
use std::io;
use std::process::Stdio;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Capacity of the notification channel; a full channel blocks the forwarder
pub const NOTIFICATION_CAPACITY: usize = 128;

/// A notification forwarded to the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub method: String,
    pub params: Vec<Value>,
}

type Writer = Box<dyn AsyncWrite + Send + Unpin>;
type ResponseTx = oneshot::Sender<Result<Value, RpcError>>;

/// Requests waiting for a response
#[derive(Default)]
struct Pending {
    waiting: HashMap<u32, ResponseTx>,
    closed: bool,
}

/// State shared with the reader task
struct Shared {
    writer: Mutex<Writer>,
    pending: Mutex<Pending>,
    subscriptions: Mutex<HashSet<String>>,
}

impl Shared {
    async fn send(&self, msg: &Message) -> Result<(), RpcError> {
        let mut buf = BytesMut::new();
        MessageCodec::encode(msg, &mut buf)?;

        let mut writer = self.writer.lock().await;
        writer.write_all(&buf).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Mark the session closed and fail every outstanding request
    async fn close(&self) {
        let mut pending = self.pending.lock().await;
        pending.closed = true;
        for (_, tx) in pending.waiting.drain() {
            let _ = tx.send(Err(RpcError::Closed));
        }
    }
}

/// MessagePack-RPC session with an engine
pub struct Session {
    shared: Arc<Shared>,
    next_id: AtomicU32,
    reader: JoinHandle<()>,
    forwarder: JoinHandle<()>,
    /// Engine process when spawned by us; killed on drop
    _child: Option<Child>,
}

impl Session {
    /// Attach to an engine over an arbitrary byte transport
    pub fn new<R, W>(reader: R, writer: W) -> (Self, mpsc::Receiver<Notification>)
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let shared = Arc::new(Shared {
            writer: Mutex::new(Box::new(writer)),
            pending: Mutex::new(Pending::default()),
            subscriptions: Mutex::new(HashSet::new()),
        });

        let (notify_tx, notify_rx) = mpsc::channel(NOTIFICATION_CAPACITY);
        let (backlog_tx, backlog_rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(read_loop(reader, shared.clone(), backlog_tx));
        let forwarder = tokio::spawn(forward_notifications(backlog_rx, notify_tx));

        let session = Self {
            shared,
            next_id: AtomicU32::new(1),
            reader,
            forwarder,
            _child: None,
        };

        (session, notify_rx)
    }

    /// Spawn `program` with `args` and talk to it over its stdio
    pub fn spawn(
        program: &str,
        args: &[String],
    ) -> Result<(Self, mpsc::Receiver<Notification>), RpcError> {
        debug!("Spawning engine {} {:?}", program, args);

        let spawn_error = |source| RpcError::Spawn {
            program: program.to_string(),
            source,
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;

        let stdin = child.stdin.take().ok_or_else(|| {
            spawn_error(io::Error::new(io::ErrorKind::Other, "engine stdin was not captured"))
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            spawn_error(io::Error::new(io::ErrorKind::Other, "engine stdout was not captured"))
        })?;

        let (mut session, notify_rx) = Self::new(stdout, stdin);
        session._child = Some(child);
        Ok((session, notify_rx))
    }

    /// Forward notifications named `method` to the notification channel
    pub async fn subscribe(&self, method: &str) {
        self.shared
            .subscriptions
            .lock()
            .await
            .insert(method.to_string());
    }

    /// Send a request and wait for its result
    pub async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();

        {
            let mut pending = self.shared.pending.lock().await;
            if pending.closed {
                return Err(RpcError::Closed);
            }
            pending.waiting.insert(id, tx);
        }

        let msg = Message::Request {
            id,
            method: method.to_string(),
            params,
        };
        if let Err(e) = self.shared.send(&msg).await {
            self.shared.pending.lock().await.waiting.remove(&id);
            return Err(e);
        }

        rx.await.map_err(|_| RpcError::Closed)?
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.reader.abort();
        self.forwarder.abort();
    }
}

#[async_trait]
impl Engine for Session {
    async fn attach_ui(
        &self,
        width: u16,
        height: u16,
        options: UiOptions,
    ) -> Result<(), RpcError> {
        self.request(
            "nvim_ui_attach",
            vec![Value::from(width), Value::from(height), options.to_value()],
        )
        .await?;
        Ok(())
    }

    async fn input(&self, keys: &str) -> Result<i64, RpcError> {
        let written = self.request("nvim_input", vec![Value::from(keys)]).await?;
        written
            .as_i64()
            .ok_or_else(|| RpcError::Protocol(format!("nvim_input returned {written}")))
    }

    async fn try_resize_ui(&self, width: u16, height: u16) -> Result<(), RpcError> {
        self.request(
            "nvim_ui_try_resize",
            vec![Value::from(width), Value::from(height)],
        )
        .await?;
        Ok(())
    }
}

/// Read messages until the transport closes
async fn read_loop<R>(
    mut reader: R,
    shared: Arc<Shared>,
    backlog: mpsc::UnboundedSender<Notification>,
) where
    R: AsyncRead + Unpin,
{
    let mut buf = BytesMut::with_capacity(64 * 1024);
    let mut codec = MessageCodec::new();

    'read: loop {
        // Handle every complete message already buffered
        loop {
            match codec.decode(&mut buf) {
                Ok(Some(msg)) => handle_message(msg, &shared, &backlog).await,
                Ok(None) => break,
                Err(e) => {
                    warn!("Dropping engine session: {}", e);
                    break 'read;
                }
            }
        }

        match reader.read_buf(&mut buf).await {
            Ok(0) => {
                debug!("Engine closed its output");
                break;
            }
            Ok(n) => debug!("Read {} bytes from engine", n),
            Err(e) => {
                warn!("Engine read failed: {}", e);
                break;
            }
        }
    }

    shared.close().await;
}

/// Move notifications from the reader's backlog into the UI channel, in order.
///
/// Ends once the reader is gone and the backlog is drained, or the UI stops listening.
async fn forward_notifications(
    mut backlog: mpsc::UnboundedReceiver<Notification>,
    notify_tx: mpsc::Sender<Notification>,
) {
    while let Some(notification) = backlog.recv().await {
        // Waits while the UI is behind; redraws must never be dropped
        if notify_tx.send(notification).await.is_err() {
            debug!("Notification receiver dropped");
            break;
        }
    }
}

async fn handle_message(
    msg: Message,
    shared: &Shared,
    backlog: &mpsc::UnboundedSender<Notification>,
) {
    match msg {
        Message::Response { id, error, result } => {
            let tx = shared.pending.lock().await.waiting.remove(&id);
            match tx {
                Some(tx) => {
                    let outcome = if error.is_nil() {
                        Ok(result)
                    } else {
                        Err(RpcError::Remote(error.to_string()))
                    };
                    let _ = tx.send(outcome);
                }
                None => warn!("Response for unknown request {}", id),
            }
        }

        Message::Notification { method, params } => {
            if !shared.subscriptions.lock().await.contains(&method) {
                debug!("Unsubscribed notification {}", method);
                return;
            }
            if backlog.send(Notification { method, params }).is_err() {
                debug!("Notification forwarder stopped");
            }
        }

        Message::Request { id, method, .. } => {
            debug!("Rejecting engine request {} ({})", id, method);
            let reply = Message::Response {
                id,
                error: Value::from(format!("{method} is not supported")),
                result: Value::Nil,
            };
            if let Err(e) = shared.send(&reply).await {
                warn!("Failed to answer engine request: {}", e);
            }
        }
    }
}
