//! Session tests against an in-memory engine

use bytes::BytesMut;
use nvgrid_rpc::{Engine, Message, MessageCodec, RpcError, Session, UiOptions};
use rmpv::Value;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::time::timeout;

/// Engine end of an in-memory transport
struct FakeEngine {
    stream: DuplexStream,
    buf: BytesMut,
    codec: MessageCodec,
}

impl FakeEngine {
    async fn read(&mut self) -> Message {
        loop {
            if let Some(msg) = self.codec.decode(&mut self.buf).expect("decode") {
                return msg;
            }
            let n = self.stream.read_buf(&mut self.buf).await.expect("read");
            assert!(n > 0, "session closed the transport");
        }
    }

    async fn write(&mut self, msg: Message) {
        let mut buf = BytesMut::new();
        MessageCodec::encode(&msg, &mut buf).expect("encode");
        self.stream.write_all(&buf).await.expect("write");
    }
}

fn connect() -> (
    Session,
    tokio::sync::mpsc::Receiver<nvgrid_rpc::Notification>,
    FakeEngine,
) {
    let (ui_side, engine_side) = tokio::io::duplex(64 * 1024);
    let (reader, writer) = tokio::io::split(ui_side);
    let (session, notifications) = Session::new(reader, writer);

    let engine = FakeEngine {
        stream: engine_side,
        buf: BytesMut::new(),
        codec: MessageCodec::new(),
    };
    (session, notifications, engine)
}

fn notification(method: &str, n: i64) -> Message {
    Message::Notification {
        method: method.to_string(),
        params: vec![Value::from(n)],
    }
}

#[tokio::test]
async fn subscribed_notifications_arrive_in_order() {
    let (session, mut notifications, mut engine) = connect();
    session.subscribe("redraw").await;

    engine.write(notification("redraw", 1)).await;
    engine.write(notification("nvim_buf_lines_event", 2)).await;
    engine.write(notification("redraw", 3)).await;

    let first = notifications.recv().await.expect("first");
    assert_eq!(first.method, "redraw");
    assert_eq!(first.params, vec![Value::from(1)]);

    let second = notifications.recv().await.expect("second");
    assert_eq!(second.params, vec![Value::from(3)]);

    // Engine going away closes the channel
    drop(engine);
    assert!(notifications.recv().await.is_none());
}

#[tokio::test]
async fn response_behind_full_notification_queue_is_delivered() {
    let (session, mut notifications, mut engine) = connect();
    session.subscribe("redraw").await;

    let engine_side = async {
        let Message::Request { id, .. } = engine.read().await else {
            panic!("expected a request");
        };
        // More redraws than the UI queue holds, none of them read yet
        for n in 0..200 {
            engine.write(notification("redraw", n)).await;
        }
        engine
            .write(Message::Response {
                id,
                error: Value::Nil,
                result: Value::from(1),
            })
            .await;
    };

    let (written, ()) = timeout(
        Duration::from_secs(2),
        async { tokio::join!(session.input("a"), engine_side) },
    )
    .await
    .expect("input response was stuck behind notifications");
    assert_eq!(written.expect("input"), 1);

    for n in 0..200 {
        let next = notifications.recv().await.expect("notification");
        assert_eq!(next.params, vec![Value::from(n)]);
    }
}

#[tokio::test]
async fn input_request_round_trip() {
    let (session, _notifications, mut engine) = connect();

    let engine_side = async {
        let request = engine.read().await;
        let Message::Request { id, method, params } = request else {
            panic!("expected a request");
        };
        assert_eq!(method, "nvim_input");
        assert_eq!(params, vec![Value::from("<Esc>")]);

        engine
            .write(Message::Response {
                id,
                error: Value::Nil,
                result: Value::from(5),
            })
            .await;
    };

    let (written, ()) = tokio::join!(session.input("<Esc>"), engine_side);
    assert_eq!(written.expect("input"), 5);
}

#[tokio::test]
async fn attach_and_resize_send_expected_params() {
    let (session, _notifications, mut engine) = connect();

    let engine_side = async {
        for expected in ["nvim_ui_attach", "nvim_ui_try_resize"] {
            let Message::Request { id, method, params } = engine.read().await else {
                panic!("expected a request");
            };
            assert_eq!(method, expected);
            assert_eq!(params[0], Value::from(120));
            assert_eq!(params[1], Value::from(40));
            if method == "nvim_ui_attach" {
                assert_eq!(params[2], UiOptions::default().to_value());
            }

            engine
                .write(Message::Response {
                    id,
                    error: Value::Nil,
                    result: Value::Nil,
                })
                .await;
        }
    };

    let ui_side = async {
        session
            .attach_ui(120, 40, UiOptions::default())
            .await
            .expect("attach");
        session.try_resize_ui(120, 40).await.expect("resize");
    };

    tokio::join!(ui_side, engine_side);
}

#[tokio::test]
async fn remote_error_is_reported() {
    let (session, _notifications, mut engine) = connect();

    let engine_side = async {
        let Message::Request { id, .. } = engine.read().await else {
            panic!("expected a request");
        };
        engine
            .write(Message::Response {
                id,
                error: Value::Array(vec![Value::from(0), Value::from("invalid key")]),
                result: Value::Nil,
            })
            .await;
    };

    let (result, ()) = tokio::join!(session.input("x"), engine_side);
    assert!(matches!(result, Err(RpcError::Remote(_))));
}

#[tokio::test]
async fn pending_request_fails_when_engine_exits() {
    let (session, _notifications, mut engine) = connect();

    let engine_side = async move {
        let _ = engine.read().await;
        drop(engine);
    };

    let (result, ()) = tokio::join!(session.try_resize_ui(80, 24), engine_side);
    assert!(matches!(result, Err(RpcError::Closed)));

    // Later requests fail immediately
    assert!(matches!(session.input("x").await, Err(RpcError::Closed)));
}

#[tokio::test]
async fn engine_requests_are_rejected() {
    let (_session, _notifications, mut engine) = connect();

    engine
        .write(Message::Request {
            id: 77,
            method: "nvim_clipboard_get".to_string(),
            params: vec![],
        })
        .await;

    match engine.read().await {
        Message::Response { id, error, result } => {
            assert_eq!(id, 77);
            assert!(!error.is_nil());
            assert!(result.is_nil());
        }
        other => panic!("expected a response, got {other:?}"),
    }
}
