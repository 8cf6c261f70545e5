//! Conversation history and the bounded reasoning context window

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The caller
    User,
    /// The voice assistant
    Bot,
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

/// One entry in the append-only conversation audit log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub sender: Sender,
    pub text: String,
    /// Recognition confidence, user turns only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    pub timestamp: DateTime<Utc>,
    /// Tool invoked while producing this turn, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// Sentiment score, bot turns only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<f32>,
}

impl HistoryTurn {
    pub fn user(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            confidence: Some(confidence),
            timestamp: Utc::now(),
            tool_name: None,
            sentiment: None,
        }
    }

    pub fn bot(text: impl Into<String>, tool_name: Option<String>, sentiment: f32) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            confidence: None,
            timestamp: Utc::now(),
            tool_name,
            sentiment: Some(sentiment),
        }
    }
}

/// Derived statistics over the full history, reported on agent handoff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_turns: usize,
    pub avg_confidence: f32,
    pub low_confidence_count: usize,
}

/// Append-only audit log of the whole call
///
/// Distinct from [`ChatContext`]: this is never truncated, only cleared
/// on session reset.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    turns: Vec<HistoryTurn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: HistoryTurn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[HistoryTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Stats used when handing the call to a human agent
    pub fn stats(&self, low_confidence_threshold: f32) -> HistoryStats {
        let confidences: Vec<f32> = self.turns.iter().filter_map(|t| t.confidence).collect();
        let avg_confidence = if confidences.is_empty() {
            0.0
        } else {
            confidences.iter().sum::<f32>() / confidences.len() as f32
        };
        let low_confidence_count = confidences
            .iter()
            .filter(|&&c| c < low_confidence_threshold)
            .count();
        HistoryStats {
            total_turns: self.turns.len(),
            avg_confidence,
            low_confidence_count,
        }
    }

    /// Short topic summary for the receiving agent
    ///
    /// Lists the tools the call touched plus the first user utterance,
    /// which is usually the reason for calling.
    pub fn topic_summary(&self) -> String {
        let mut topics: Vec<&str> = Vec::new();
        for turn in &self.turns {
            if let Some(tool) = turn.tool_name.as_deref() {
                let topic = match tool {
                    "get_nearest_station" | "show_directions" => "station locations",
                    "get_invoice" => "invoice lookup",
                    "search_knowledge_base" => "general support",
                    "escalate_to_agent" => "escalation",
                    "end_call" => "call wrap-up",
                    _ => continue,
                };
                if !topics.contains(&topic) {
                    topics.push(topic);
                }
            }
        }
        let opening = self
            .turns
            .iter()
            .find(|t| t.sender == Sender::User)
            .map(|t| t.text.as_str())
            .unwrap_or("");
        match (topics.is_empty(), opening.is_empty()) {
            (true, true) => "No conversation recorded.".to_string(),
            (true, false) => format!("Caller opened with: \"{opening}\""),
            (false, true) => format!("Topics discussed: {}.", topics.join(", ")),
            (false, false) => {
                format!(
                    "Topics discussed: {}. Caller opened with: \"{opening}\"",
                    topics.join(", ")
                )
            },
        }
    }
}

/// Role of a message sent to the reasoning engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One message in the reasoning context window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Bounded FIFO window of recent messages passed to the reasoning engine
#[derive(Debug, Clone)]
pub struct ChatContext {
    messages: VecDeque<ChatMessage>,
    max_messages: usize,
}

impl ChatContext {
    pub fn new(max_messages: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(max_messages),
            max_messages,
        }
    }

    /// Append a message, dropping the oldest once the window is full
    pub fn push(&mut self, message: ChatMessage) {
        if self.messages.len() == self.max_messages {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_context_keeps_last_ten() {
        let mut ctx = ChatContext::new(10);
        for i in 0..11 {
            ctx.push(ChatMessage::user(format!("message {i}")));
        }
        assert_eq!(ctx.len(), 10);
        let messages = ctx.messages();
        assert_eq!(messages[0].content, "message 1");
        assert_eq!(messages[9].content, "message 10");
    }

    #[test]
    fn history_is_unbounded() {
        let mut history = ConversationHistory::new();
        for i in 0..11 {
            history.push(HistoryTurn::user(format!("turn {i}"), 0.9));
        }
        assert_eq!(history.len(), 11);
    }

    #[test]
    fn stats_count_low_confidence() {
        let mut history = ConversationHistory::new();
        history.push(HistoryTurn::user("hello", 0.9));
        history.push(HistoryTurn::bot("hi there", None, 0.7));
        history.push(HistoryTurn::user("mumble", 0.4));
        let stats = history.stats(0.5);
        assert_eq!(stats.total_turns, 3);
        assert_eq!(stats.low_confidence_count, 1);
        assert!((stats.avg_confidence - 0.65).abs() < 1e-6);
    }

    #[test]
    fn topic_summary_names_tools() {
        let mut history = ConversationHistory::new();
        history.push(HistoryTurn::user("where is the nearest station", 0.9));
        history.push(HistoryTurn::bot(
            "The nearest station is 1 km away",
            Some("get_nearest_station".to_string()),
            0.7,
        ));
        let summary = history.topic_summary();
        assert!(summary.contains("station locations"));
        assert!(summary.contains("where is the nearest station"));
    }
}
