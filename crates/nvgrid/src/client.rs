//! nvgrid client: engine start-up, terminal input and the main event loop

use crate::{
    config::{Args, Config},
    logging,
    screen::CrosstermSurface,
    terminal_guard::TerminalGuard,
};
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
};
use nvgrid_redraw::{Dispatcher, Surface};
use nvgrid_rpc::{Engine, Notification, Session, UiOptions};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Capacity of the terminal input queue
pub const INPUT_CAPACITY: usize = 128;

/// How long the input reader waits for an event before checking for shutdown
const INPUT_POLL: Duration = Duration::from_millis(100);

/// Event produced by the terminal input reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Keys in the engine's input notation
    Key(String),
    /// New terminal size as (width, height)
    Resize(u16, u16),
}

pub async fn run() -> Result<()> {
    let config = Config::from_args(Args::parse())?;
    logging::init(&config)?;

    let engine_args = config.engine_args();
    info!("Starting {} {:?}", config.engine, engine_args);

    let (session, mut notify_rx) = Session::spawn(&config.engine, &engine_args)
        .with_context(|| format!("Failed to start {}", config.engine))?;
    // Subscribe before attaching so no redraw is missed
    session.subscribe("redraw").await;

    let (width, height) = terminal::size().context("Failed to query terminal size")?;
    let guard = TerminalGuard::acquire()?;

    let surface = CrosstermSurface::new(io::stdout());
    let mut dispatcher = Dispatcher::new(surface, width, height);

    session
        .attach_ui(width, height, UiOptions::default())
        .await
        .context("Failed to attach UI")?;
    info!("Attached as {}x{} UI", width, height);

    let (input_tx, mut input_rx) = mpsc::channel(INPUT_CAPACITY);
    let input_handle = spawn_input_reader(input_tx);

    let result = run_event_loop(
        &session,
        &mut dispatcher,
        &mut input_rx,
        &mut notify_rx,
        (width, height),
    )
    .await;

    // Closing the queue stops the reader at its next poll
    drop(input_rx);
    let _ = input_handle.await;
    drop(guard);

    if let Err(e) = &result {
        warn!("Session ended with error: {:#}", e);
    } else {
        info!("Session ended");
    }
    result
}

/// Read terminal events on a blocking thread and queue them for the event loop.
///
/// The reader stops when the queue is closed or the terminal fails; either way the
/// sender is dropped, which the event loop sees as end of input.
pub fn spawn_input_reader(tx: mpsc::Sender<InputEvent>) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || loop {
        if tx.is_closed() {
            break;
        }

        match event::poll(INPUT_POLL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                warn!("Terminal poll failed: {}", e);
                break;
            }
        }

        let input = match event::read() {
            Ok(Event::Key(key)) => key_to_input(key).map(InputEvent::Key),
            Ok(Event::Resize(width, height)) => Some(InputEvent::Resize(width, height)),
            // Mouse, focus and paste events are not forwarded
            Ok(_) => None,
            Err(e) => {
                warn!("Terminal read failed: {}", e);
                break;
            }
        };

        if let Some(input) = input {
            if tx.blocking_send(input).is_err() {
                break;
            }
        }
    })
}

/// Multiplex terminal input and engine notifications until either side goes away.
///
/// Returns `Ok` when the engine exits, terminal input ends, or forwarding input or a
/// resize to the engine fails. A redraw batch that cannot be decoded or drawn is fatal.
pub async fn run_event_loop<E, S>(
    engine: &E,
    dispatcher: &mut Dispatcher<S>,
    input_rx: &mut mpsc::Receiver<InputEvent>,
    notify_rx: &mut mpsc::Receiver<Notification>,
    mut size: (u16, u16),
) -> Result<()>
where
    E: Engine + ?Sized,
    S: Surface,
{
    loop {
        tokio::select! {
            input = input_rx.recv() => match input {
                Some(InputEvent::Key(keys)) => {
                    debug!("Input {}", keys);
                    if let Err(e) = engine.input(&keys).await {
                        info!("Input forwarding failed, ending session: {}", e);
                        return Ok(());
                    }
                }
                Some(InputEvent::Resize(width, height)) => {
                    if (width, height) == size {
                        continue;
                    }
                    size = (width, height);
                    dispatcher.resize(width, height);

                    if let Err(e) = engine.try_resize_ui(width, height).await {
                        info!("Resize request failed, ending session: {}", e);
                        return Ok(());
                    }
                }
                None => {
                    info!("Terminal input closed");
                    return Ok(());
                }
            },

            notification = notify_rx.recv() => match notification {
                Some(Notification { method, params }) => {
                    if method != "redraw" {
                        debug!("Ignoring notification {}", method);
                        continue;
                    }
                    dispatcher
                        .apply_batch(&params)
                        .context("Failed to apply redraw batch")?;
                }
                None => {
                    info!("Engine exited");
                    return Ok(());
                }
            },
        }
    }
}

/// Translate a key press into the engine's input notation.
///
/// Returns `None` for key releases and keys the engine has no name for.
pub fn key_to_input(key: KeyEvent) -> Option<String> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let mut prefix = String::new();
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        prefix.push_str("C-");
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        prefix.push_str("M-");
    }

    let name = match key.code {
        KeyCode::Char(c) => {
            // Plain characters go through literally
            if prefix.is_empty() && c != '<' {
                return Some(c.to_string());
            }
            let name = match c {
                '<' => "lt".to_string(),
                ' ' => "Space".to_string(),
                // The engine folds case under Ctrl, so Shift has to be spelled out
                _ if c.is_ascii_alphabetic()
                    && key.modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::SHIFT) =>
                {
                    format!("S-{}", c.to_ascii_lowercase())
                }
                _ => c.to_string(),
            };
            return Some(format!("<{prefix}{name}>"));
        }
        KeyCode::BackTab => return Some(format!("<{prefix}S-Tab>")),
        KeyCode::F(n @ 1..=12) => format!("F{n}"),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Backspace => "BS".to_string(),
        KeyCode::Enter => "CR".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Insert => "Insert".to_string(),
        KeyCode::Delete => "Del".to_string(),
        _ => return None,
    };

    if key.modifiers.contains(KeyModifiers::SHIFT) {
        prefix.push_str("S-");
    }
    Some(format!("<{prefix}{name}>"))
}
