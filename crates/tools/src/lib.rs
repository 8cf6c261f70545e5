//! Tool collaborators for the voice dialogue orchestrator
//!
//! Each collaborator returns a [`ToolReply`]: the text to speak plus an
//! optional machine-readable payload for the client UI. Dispatching tool
//! directives to these collaborators is the orchestrator's job.

pub mod knowledge;
pub mod records;
pub mod station;

pub use knowledge::KnowledgeBase;
pub use records::{InvoiceRecord, RecordStore};
pub use station::{StationDirectory, StationInfo, StationSnapshot};

use serde_json::Value;
use thiserror::Error;

/// Tool execution errors
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid tool parameters: {0}")]
    InvalidParams(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("No data available: {0}")]
    NoData(String),
}

/// Result of one tool invocation
#[derive(Debug, Clone)]
pub struct ToolReply {
    /// Text to speak in place of the reasoning engine's reply
    pub speech: String,
    /// Structured payload for the client UI (map popups, invoice tables)
    pub payload: Option<Value>,
}

impl ToolReply {
    pub fn speech_only(speech: impl Into<String>) -> Self {
        Self {
            speech: speech.into(),
            payload: None,
        }
    }

    pub fn with_payload(speech: impl Into<String>, payload: Value) -> Self {
        Self {
            speech: speech.into(),
            payload: Some(payload),
        }
    }
}
