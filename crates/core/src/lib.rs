//! Core types and traits for the voice dialogue orchestrator
//!
//! This crate defines the shared vocabulary of the workspace: audio frames,
//! conversation history and the bounded chat context, transcript and tool
//! directive types, the common error type, and the capability traits for
//! the three external engines (recognition, reasoning, synthesis).

pub mod audio;
pub mod conversation;
pub mod directive;
pub mod error;
pub mod traits;

pub use audio::{AudioFrame, SampleRate};
pub use conversation::{
    ChatContext, ChatMessage, ChatRole, ConversationHistory, HistoryStats, HistoryTurn, Sender,
};
pub use directive::{ReasoningOutcome, ToolDirective, TranscriptResult};
pub use error::{Error, Result};
pub use traits::{AudioStream, ReasoningEngine, SpeechRecognizer, SpeechSynthesizer};
