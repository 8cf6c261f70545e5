//! Tagged reasoning-reply parser
//!
//! The reasoning engine embeds its tool call and sentiment score as
//! bracketed markers inside free text:
//!
//! ```text
//! [TOOL: {"name": "get_invoice", "args": {"action": "initiate"}}]
//! [SENTIMENT: 0.6]
//! Ji zaroor, main check karti hoon.
//! ```
//!
//! This is the single place that contract is parsed; everything downstream
//! works with [`ReasoningOutcome`]. Malformed markers degrade to defaults
//! rather than failing the turn.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use voice_dialogue_core::{ReasoningOutcome, ToolDirective};

const DEFAULT_SENTIMENT: f32 = 0.7;

static TOOL_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[TOOL:\s*(\{.*?\}|null)\]").expect("tool tag regex"));
static SENTIMENT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[SENTIMENT:\s*([\d.]+)\]").expect("sentiment tag regex"));
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").expect("tag strip regex"));

/// Parse a raw tagged reply into its structured outcome
pub fn parse_tagged_reply(raw: &str) -> ReasoningOutcome {
    let directive = TOOL_TAG
        .captures(raw)
        .and_then(|caps| parse_directive(caps.get(1).map_or("", |m| m.as_str())));

    let sentiment = SENTIMENT_TAG
        .captures(raw)
        .and_then(|caps| caps.get(1)?.as_str().parse::<f32>().ok())
        .map(|s| s.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_SENTIMENT);

    let mut speech_text = ANY_TAG.replace_all(raw, "").trim().to_string();
    if speech_text.is_empty() {
        // nothing left after stripping: speak the raw reply as-is
        speech_text = raw.trim().to_string();
    }

    ReasoningOutcome {
        speech_text,
        directive,
        sentiment,
    }
}

fn parse_directive(tag_body: &str) -> Option<ToolDirective> {
    if tag_body == "null" {
        return None;
    }
    let value: Value = match serde_json::from_str(tag_body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, body = tag_body, "Malformed tool tag, ignoring");
            return None;
        },
    };
    let name = value.get("name")?.as_str()?.to_string();
    let args = value
        .get("args")
        .cloned()
        .unwrap_or(Value::Object(Default::default()));
    Some(ToolDirective { name, args })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_reply_parses() {
        let raw = "[TOOL: {\"name\": \"get_nearest_station\", \"args\": {}}]\n\
                   [SENTIMENT: 0.4]\n\
                   Main abhi check karti hoon.";
        let outcome = parse_tagged_reply(raw);
        let directive = outcome.directive.unwrap();
        assert_eq!(directive.name, "get_nearest_station");
        assert!((outcome.sentiment - 0.4).abs() < 1e-6);
        assert_eq!(outcome.speech_text, "Main abhi check karti hoon.");
    }

    #[test]
    fn null_tool_is_none() {
        let raw = "[TOOL: null]\n[SENTIMENT: 0.7]\nBataiye, kaise madad karoon?";
        let outcome = parse_tagged_reply(raw);
        assert!(outcome.directive.is_none());
        assert_eq!(outcome.speech_text, "Bataiye, kaise madad karoon?");
    }

    #[test]
    fn missing_tags_default() {
        let outcome = parse_tagged_reply("Just plain text with no markers.");
        assert!(outcome.directive.is_none());
        assert!((outcome.sentiment - DEFAULT_SENTIMENT).abs() < 1e-6);
        assert_eq!(outcome.speech_text, "Just plain text with no markers.");
    }

    #[test]
    fn malformed_tool_json_is_ignored() {
        let raw = "[TOOL: {broken json]\n[SENTIMENT: 0.6]\nHello.";
        let outcome = parse_tagged_reply(raw);
        assert!(outcome.directive.is_none());
        assert_eq!(outcome.speech_text, "Hello.");
    }

    #[test]
    fn sentiment_is_clamped() {
        let outcome = parse_tagged_reply("[SENTIMENT: 3.5]\nOkay.");
        assert!((outcome.sentiment - 1.0).abs() < 1e-6);
    }

    #[test]
    fn tags_only_reply_keeps_raw() {
        let raw = "[TOOL: null][SENTIMENT: 0.7]";
        let outcome = parse_tagged_reply(raw);
        assert_eq!(outcome.speech_text, raw);
    }
}
