//! Terminal front-end for an embedded editor engine
//!
//! Spawns the engine, attaches as a line-grid UI and mirrors its redraw stream onto the
//! terminal while forwarding keystrokes and resizes back.

pub mod client;
pub mod config;
pub mod logging;
pub mod screen;
pub mod terminal_guard;
