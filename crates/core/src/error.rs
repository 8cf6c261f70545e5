//! Shared error type for the dialogue crates

use thiserror::Error;

/// Top-level error for the dialogue pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error("Speech recognition error: {0}")]
    Recognition(String),

    #[error("Reasoning engine error: {0}")]
    Reasoning(String),

    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    #[error("Tool execution error: {0}")]
    Tool(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
