//! Sentiment-driven escalation decision

use voice_dialogue_core::ToolDirective;

/// Decides whether a turn's sentiment forces a transfer to a human
///
/// Pure function of the turn's sentiment and tool directive; both the
/// threshold and the already-escalating tool name come from config.
#[derive(Debug, Clone)]
pub struct SentimentEscalationPolicy {
    threshold: f32,
    escalation_tool: String,
}

impl SentimentEscalationPolicy {
    pub fn new(threshold: f32, escalation_tool: impl Into<String>) -> Self {
        Self {
            threshold,
            escalation_tool: escalation_tool.into(),
        }
    }

    /// Escalate when sentiment is at or below the threshold, unless the
    /// reasoning engine already issued the escalation tool this turn
    pub fn should_escalate(&self, sentiment: f32, directive: Option<&ToolDirective>) -> bool {
        if sentiment > self.threshold {
            return false;
        }
        directive.map_or(true, |d| d.name != self.escalation_tool)
    }
}
