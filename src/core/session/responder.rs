use async_trait::async_trait;
use serde_json::{Value, json};

use crate::core::realtime::FunctionCall;

/// Produces the response payload for a model function call.
#[async_trait]
pub trait ToolResponder: Send + Sync {
    async fn respond(&self, call: &FunctionCall) -> Value;
}

/// Acknowledges every call with `{"result": "ok"}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcknowledgeResponder;

#[async_trait]
impl ToolResponder for AcknowledgeResponder {
    async fn respond(&self, _call: &FunctionCall) -> Value {
        json!({"result": "ok"})
    }
}
