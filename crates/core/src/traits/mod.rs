//! Capability traits for the external engines

pub mod reasoning;
pub mod speech;

pub use reasoning::ReasoningEngine;
pub use speech::{AudioStream, SpeechRecognizer, SpeechSynthesizer};
