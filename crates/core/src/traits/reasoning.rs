//! Reasoning engine interface

use crate::conversation::ChatMessage;
use crate::error::Result;
use async_trait::async_trait;

/// Language-model reasoning interface
///
/// The engine receives the bounded chat context and returns its raw reply
/// text. The reply carries tool and sentiment markers in a tagged format;
/// parsing that contract is the orchestrator's job, not the engine's, so
/// swapping engine backends never changes dialogue semantics.
#[async_trait]
pub trait ReasoningEngine: Send + Sync + 'static {
    /// Produce a raw reply for the given context window
    async fn respond(&self, context: &[ChatMessage]) -> Result<String>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}
