//! Engine API used by the UI
//!
//! The event loop only needs three calls from the engine; they sit behind [`Engine`] so
//! the loop can run against a scripted engine in tests.

use crate::RpcError;
use async_trait::async_trait;
use rmpv::Value;

/// UI capabilities requested when attaching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiOptions {
    /// Colours are sent as 24-bit RGB
    pub rgb: bool,
    /// Screen updates use the `grid_*` line-based events
    pub ext_linegrid: bool,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            rgb: true,
            ext_linegrid: true,
        }
    }
}

impl UiOptions {
    /// Options map as sent to `nvim_ui_attach`
    pub fn to_value(&self) -> Value {
        Value::Map(vec![
            (Value::from("rgb"), Value::from(self.rgb)),
            (Value::from("ext_linegrid"), Value::from(self.ext_linegrid)),
        ])
    }
}

/// Calls the event loop makes into the engine
#[async_trait]
pub trait Engine: Send + Sync {
    /// Attach this process as a UI of the given size
    async fn attach_ui(&self, width: u16, height: u16, options: UiOptions)
        -> Result<(), RpcError>;

    /// Queue keys as typed input. Returns the number of bytes the engine accepted.
    async fn input(&self, keys: &str) -> Result<i64, RpcError>;

    /// Ask the engine to resize the attached UI
    async fn try_resize_ui(&self, width: u16, height: u16) -> Result<(), RpcError>;
}
