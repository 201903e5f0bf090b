//! Engine RPC layer for nvgrid
//!
//! Speaks MessagePack-RPC with an embedded editor engine over its stdio (or any async
//! byte stream), correlating request responses and forwarding subscribed notifications
//! in arrival order.

pub mod engine;
pub mod protocol;
pub mod session;

pub use engine::{Engine, UiOptions};
pub use protocol::{Message, MessageCodec};
pub use session::{Notification, Session, NOTIFICATION_CAPACITY};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("Failed to spawn engine `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Engine returned error: {0}")]
    Remote(String),

    #[error("Session closed")]
    Closed,
}
