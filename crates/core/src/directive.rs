//! Structured results from the recognition and reasoning stages

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Transcript produced by the speech recognizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResult {
    pub text: String,
    /// Recognition confidence in [0, 1]
    pub confidence: f32,
}

impl TranscriptResult {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// A tool invocation requested by the reasoning engine
///
/// At most one per turn; not persisted beyond the turn that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDirective {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

impl ToolDirective {
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// String argument lookup, absent and non-string both map to `None`
    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Value::as_str)
    }

    pub fn arg_bool(&self, key: &str) -> Option<bool> {
        self.args.get(key).and_then(Value::as_bool)
    }
}

/// Parsed reasoning engine reply: spoken text, optional tool, sentiment
#[derive(Debug, Clone)]
pub struct ReasoningOutcome {
    pub speech_text: String,
    pub directive: Option<ToolDirective>,
    /// Caller sentiment in [0, 1]; 0.7 is neutral
    pub sentiment: f32,
}

impl ReasoningOutcome {
    pub fn speech_only(text: impl Into<String>, sentiment: f32) -> Self {
        Self {
            speech_text: text.into(),
            directive: None,
            sentiment,
        }
    }
}
