use async_trait::async_trait;
use nvgrid_rpc::{Engine, RpcError, UiOptions};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A call received by a [`ScriptedEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Attach { width: u16, height: u16 },
    Input(String),
    Resize { width: u16, height: u16 },
}

/// Engine double that records calls and can be told to fail
#[derive(Debug, Clone, Default)]
pub struct ScriptedEngine {
    calls: Arc<Mutex<Vec<EngineCall>>>,
    closed: Arc<Mutex<bool>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behave as if the engine went away; every later call fails with `Closed`
    pub async fn close(&self) {
        *self.closed.lock().await = true;
    }

    pub async fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().await.clone()
    }

    /// Keys sent through `input`, in order
    pub async fn inputs(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|call| match call {
                EngineCall::Input(keys) => Some(keys.clone()),
                _ => None,
            })
            .collect()
    }

    async fn record(&self, call: EngineCall) -> Result<(), RpcError> {
        if *self.closed.lock().await {
            return Err(RpcError::Closed);
        }
        self.calls.lock().await.push(call);
        Ok(())
    }
}

#[async_trait]
impl Engine for ScriptedEngine {
    async fn attach_ui(
        &self,
        width: u16,
        height: u16,
        _options: UiOptions,
    ) -> Result<(), RpcError> {
        self.record(EngineCall::Attach { width, height }).await
    }

    async fn input(&self, keys: &str) -> Result<i64, RpcError> {
        self.record(EngineCall::Input(keys.to_string())).await?;
        Ok(keys.len() as i64)
    }

    async fn try_resize_ui(&self, width: u16, height: u16) -> Result<(), RpcError> {
        self.record(EngineCall::Resize { width, height }).await
    }
}
