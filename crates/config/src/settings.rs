//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Dialogue thresholds and timing
    #[serde(default)]
    pub dialogue: DialogueConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Thresholds governing the turn state machine
///
/// The filter threshold (`min_confidence`) and the handoff threshold
/// (`handoff_confidence`) are intentionally different: a turn between the
/// two is dropped from the conversation but does not strike the guard.
/// They stay independently tunable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Minimum mean absolute amplitude (PCM16 scale) to run recognition
    #[serde(default = "default_min_audio_energy")]
    pub min_audio_energy: f32,

    /// Minimum recognition confidence to accept a transcript
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,

    /// Minimum transcript length in characters after trimming
    #[serde(default = "default_min_transcript_chars")]
    pub min_transcript_chars: usize,

    /// Confidence below this counts a strike toward forced handoff
    #[serde(default = "default_handoff_confidence")]
    pub handoff_confidence: f32,

    /// Consecutive strikes that force a handoff
    #[serde(default = "default_handoff_strike_limit")]
    pub handoff_strike_limit: u32,

    /// Sentiment at or below this escalates the call
    #[serde(default = "default_sentiment_escalation_threshold")]
    pub sentiment_escalation_threshold: f32,

    /// Tool name that marks a turn as already escalating
    #[serde(default = "default_escalation_tool")]
    pub escalation_tool: String,

    /// Messages kept in the reasoning context window
    #[serde(default = "default_chat_context_window")]
    pub chat_context_window: usize,

    /// Bound on one recognition call, milliseconds
    #[serde(default = "default_recognition_timeout_ms")]
    pub recognition_timeout_ms: u64,

    /// Bound on one reasoning engine call, milliseconds
    #[serde(default = "default_reasoning_timeout_ms")]
    pub reasoning_timeout_ms: u64,

    /// Bound on starting one synthesis stream, milliseconds
    #[serde(default = "default_synthesis_timeout_ms")]
    pub synthesis_timeout_ms: u64,

    /// Duration of the silent frame substituted on synthesis failure
    #[serde(default = "default_synthesis_fallback_ms")]
    pub synthesis_fallback_ms: u64,
}

fn default_min_audio_energy() -> f32 {
    800.0
}

fn default_min_confidence() -> f32 {
    0.70
}

fn default_min_transcript_chars() -> usize {
    3
}

fn default_handoff_confidence() -> f32 {
    0.50
}

fn default_handoff_strike_limit() -> u32 {
    2
}

fn default_sentiment_escalation_threshold() -> f32 {
    0.3
}

fn default_escalation_tool() -> String {
    "escalate_to_agent".to_string()
}

fn default_chat_context_window() -> usize {
    10
}

fn default_recognition_timeout_ms() -> u64 {
    8_000
}

fn default_reasoning_timeout_ms() -> u64 {
    10_000
}

fn default_synthesis_timeout_ms() -> u64 {
    15_000
}

fn default_synthesis_fallback_ms() -> u64 {
    500
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            min_audio_energy: default_min_audio_energy(),
            min_confidence: default_min_confidence(),
            min_transcript_chars: default_min_transcript_chars(),
            handoff_confidence: default_handoff_confidence(),
            handoff_strike_limit: default_handoff_strike_limit(),
            sentiment_escalation_threshold: default_sentiment_escalation_threshold(),
            escalation_tool: default_escalation_tool(),
            chat_context_window: default_chat_context_window(),
            recognition_timeout_ms: default_recognition_timeout_ms(),
            reasoning_timeout_ms: default_reasoning_timeout_ms(),
            synthesis_timeout_ms: default_synthesis_timeout_ms(),
            synthesis_fallback_ms: default_synthesis_fallback_ms(),
        }
    }
}

/// Load settings from config files and environment
///
/// Priority: env vars (`VOICE_DIALOGUE_` prefix) > `config/{env}.toml` >
/// `config/default.toml` > struct defaults.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    let default_path = Path::new("config/default.toml");
    if default_path.exists() {
        builder = builder.add_source(File::from(default_path));
    }

    if let Some(env_name) = env {
        let env_path = format!("config/{env_name}.toml");
        if Path::new(&env_path).exists() {
            builder = builder.add_source(File::with_name(&env_path));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("VOICE_DIALOGUE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| ConfigError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dialogue_thresholds() {
        let settings = Settings::default();
        assert_eq!(settings.dialogue.min_confidence, 0.70);
        assert_eq!(settings.dialogue.handoff_confidence, 0.50);
        assert_eq!(settings.dialogue.handoff_strike_limit, 2);
        assert_eq!(settings.dialogue.sentiment_escalation_threshold, 0.3);
        assert_eq!(settings.dialogue.chat_context_window, 10);
        assert_eq!(settings.dialogue.min_transcript_chars, 3);
    }

    #[test]
    fn toml_overrides_defaults() {
        let toml = r#"
            [dialogue]
            min_confidence = 0.8
            handoff_strike_limit = 3
        "#;
        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.dialogue.min_confidence, 0.8);
        assert_eq!(settings.dialogue.handoff_strike_limit, 3);
        // untouched fields keep defaults
        assert_eq!(settings.dialogue.handoff_confidence, 0.50);
        assert_eq!(settings.server.port, 8000);
    }
}
