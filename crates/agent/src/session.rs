//! Per-call session state

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Last-turn latencies in milliseconds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnMetrics {
    pub recognition_ms: u64,
    pub reasoning_ms: u64,
    pub synthesis_ms: u64,
}

/// Mutable per-call record
///
/// One instance per session, owned by the orchestrator; mutation only
/// happens inside the turn handler.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub id: Uuid,
    pub active: bool,
    /// True while synthesis audio is streaming
    pub speaking: bool,
    pub should_end: bool,
    pub end_reason: Option<String>,
    pub last_user_text: String,
    pub last_bot_text: String,
    pub last_tool: Option<String>,
    pub last_sentiment: f32,
    pub sentiment_history: Vec<f32>,
    pub metrics: TurnMetrics,
    pub barge_in_counter: u32,
    /// Caller identity, filled opportunistically during the call
    pub customer_phone: Option<String>,
    pub customer_name: Option<String>,
    /// Machine-readable payload from the last tool, for the client UI
    pub structured_tool_payload: Option<Value>,
    pub service_resolved: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            active: true,
            speaking: false,
            should_end: false,
            end_reason: None,
            last_user_text: String::new(),
            last_bot_text: String::new(),
            last_tool: None,
            last_sentiment: 0.7,
            sentiment_history: Vec::new(),
            metrics: TurnMetrics::default(),
            barge_in_counter: 0,
            customer_phone: None,
            customer_name: None,
            structured_tool_payload: None,
            service_resolved: false,
        }
    }

    /// Restore initial values, keeping the session id
    pub fn reset(&mut self) {
        let id = self.id;
        *self = Self::new();
        self.id = id;
    }

    /// Mark the session as ending
    pub fn end(&mut self, reason: impl Into<String>) {
        self.should_end = true;
        self.end_reason = Some(reason.into());
        self.active = false;
    }

    pub fn record_sentiment(&mut self, sentiment: f32) {
        self.last_sentiment = sentiment;
        self.sentiment_history.push(sentiment);
    }

    /// Read-only view for the client polling surface
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            active: self.active,
            should_end: self.should_end,
            end_reason: self.end_reason.clone(),
            last_user_text: self.last_user_text.clone(),
            last_bot_text: self.last_bot_text.clone(),
            last_tool: self.last_tool.clone(),
            last_sentiment: self.last_sentiment,
            metrics: self.metrics.clone(),
            structured_tool_payload: self.structured_tool_payload.clone(),
            service_resolved: self.service_resolved,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialized snapshot returned by the polling endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub active: bool,
    pub should_end: bool,
    pub end_reason: Option<String>,
    pub last_user_text: String,
    pub last_bot_text: String,
    pub last_tool: Option<String>,
    pub last_sentiment: f32,
    pub metrics: TurnMetrics,
    pub structured_tool_payload: Option<Value>,
    pub service_resolved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_neutral() {
        let state = SessionState::new();
        assert!(state.active);
        assert!(!state.should_end);
        assert_eq!(state.last_sentiment, 0.7);
        assert!(state.sentiment_history.is_empty());
    }

    #[test]
    fn reset_keeps_id() {
        let mut state = SessionState::new();
        let id = state.id;
        state.end("manual_stop");
        state.record_sentiment(0.2);
        state.reset();
        assert_eq!(state.id, id);
        assert!(state.active);
        assert!(state.end_reason.is_none());
        assert!(state.sentiment_history.is_empty());
    }

    #[test]
    fn end_sets_flags() {
        let mut state = SessionState::new();
        state.end("user_requested");
        assert!(state.should_end);
        assert!(!state.active);
        assert_eq!(state.end_reason.as_deref(), Some("user_requested"));
    }
}
