//! Configuration for the voice dialogue orchestrator
//!
//! Supports loading configuration from:
//! - TOML files (config/default.toml, config/{env}.toml)
//! - Environment variables (VOICE_DIALOGUE_ prefix)
//! - Struct defaults

pub mod prompts;
pub mod settings;

pub use settings::{load_settings, DialogueConfig, ServerConfig, Settings};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}
