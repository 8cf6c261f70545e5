//! Tool directive dispatch

use std::sync::Arc;

use serde_json::{json, Value};
use voice_dialogue_config::prompts::{END_CALL_MESSAGE, TOOL_APOLOGY};
use voice_dialogue_core::ToolDirective;
use voice_dialogue_tools::{KnowledgeBase, StationDirectory, ToolError};

use crate::invoice::InvoiceFlow;

/// How the turn proceeds after tool handling
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// Keep going: speak `speech`, attach `payload` to the session
    Continue {
        speech: String,
        payload: Option<Value>,
    },
    /// Speak `speech`, then exit the session to a human agent
    Escalate { reason: String, speech: String },
    /// Speak `speech`, then end the session normally
    End { reason: String, speech: String },
}

/// Maps reasoning-engine tool directives to concrete actions
///
/// Unknown tools are a logged no-op; collaborator failures become a fixed
/// apology. Neither ends the call.
pub struct ToolDispatcher {
    stations: Arc<StationDirectory>,
    knowledge: KnowledgeBase,
}

impl ToolDispatcher {
    pub fn new(stations: Arc<StationDirectory>) -> Self {
        Self {
            stations,
            knowledge: KnowledgeBase::new(),
        }
    }

    /// Execute one directive
    ///
    /// `reasoning_speech` is the reply the reasoning engine produced; tools
    /// that return their own speech overwrite it, the rest keep it.
    pub fn dispatch(
        &self,
        directive: &ToolDirective,
        reasoning_speech: &str,
        invoice: &mut InvoiceFlow,
    ) -> DispatchOutcome {
        tracing::info!(tool = %directive.name, "Dispatching tool directive");
        let result = match directive.name.as_str() {
            "get_nearest_station" => {
                let reply = self.stations.find(1, 5);
                Ok(DispatchOutcome::Continue {
                    speech: reply.speech,
                    payload: reply.payload,
                })
            },
            "show_directions" => {
                // the client opens its map popup; speak the destination
                let speech = match self.stations.best(1) {
                    Some(station) => format!(
                        "Main aapko {} ka raasta dikha rahi hu. Map open ho raha hai.",
                        station.short_name()
                    ),
                    None => "Ek second, main aapko map dikha rahi hu jisme saare \
                             stations hain."
                        .to_string(),
                };
                Ok(DispatchOutcome::Continue {
                    speech,
                    payload: Some(json!({"show_map_popup": true})),
                })
            },
            "search_knowledge_base" => directive
                .arg_str("query")
                .ok_or_else(|| ToolError::InvalidParams("query is required".into()))
                .map(|query| {
                    let reply = self.knowledge.search_reply(query);
                    DispatchOutcome::Continue {
                        speech: reply.speech,
                        payload: reply.payload,
                    }
                }),
            "get_invoice" => invoice.handle(directive).map(|reply| DispatchOutcome::Continue {
                speech: reply.speech,
                payload: reply.payload,
            }),
            "escalate_to_agent" => {
                let reason = directive
                    .arg_str("reason")
                    .unwrap_or("agent_requested")
                    .to_string();
                Ok(DispatchOutcome::Escalate {
                    reason,
                    speech: reasoning_speech.to_string(),
                })
            },
            "end_call" => {
                let reason = directive
                    .arg_str("reason")
                    .unwrap_or("user_requested")
                    .to_string();
                let speech = if reasoning_speech.trim().is_empty() {
                    END_CALL_MESSAGE.to_string()
                } else {
                    reasoning_speech.to_string()
                };
                Ok(DispatchOutcome::End { reason, speech })
            },
            unknown => {
                tracing::warn!(tool = unknown, "Unknown tool directive, keeping reply");
                Ok(DispatchOutcome::Continue {
                    speech: reasoning_speech.to_string(),
                    payload: None,
                })
            },
        };

        result.unwrap_or_else(|e| {
            tracing::error!(tool = %directive.name, error = %e, "Tool execution failed");
            DispatchOutcome::Continue {
                speech: TOOL_APOLOGY.to_string(),
                payload: None,
            }
        })
    }
}
