//! The per-session turn state machine
//!
//! One orchestrator per call. A turn flows: energy gate, recognition,
//! confidence filter, handoff guard, reasoning, tool dispatch, sentiment
//! check, history update, synthesis. Turns are strictly sequential; the
//! next one starts only after this one's audio has finished streaming.
//!
//! Output is an explicit event stream with two message kinds: status
//! updates for the client UI and synthesized audio chunks. The transport
//! layer can start playback on the first chunk.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;

use voice_dialogue_config::prompts::{
    ESCALATION_MESSAGE, FILTERED_PLACEHOLDER, LISTENING_PLACEHOLDER, OPENING_MESSAGE,
    REASONING_APOLOGY, SYSTEM_PROMPT,
};
use voice_dialogue_config::DialogueConfig;
use voice_dialogue_core::{
    AudioFrame, ChatContext, ChatMessage, ChatRole, ConversationHistory, HistoryStats,
    HistoryTurn, ReasoningEngine, ReasoningOutcome, Result, SampleRate, SpeechRecognizer,
    SpeechSynthesizer, TranscriptResult,
};
use voice_dialogue_tools::{RecordStore, StationDirectory};

use crate::dispatch::{DispatchOutcome, ToolDispatcher};
use crate::gating::{AudioEnergyGate, ConfidenceFilter, FilterVerdict};
use crate::handoff::HandoffGuard;
use crate::invoice::InvoiceFlow;
use crate::reply::parse_tagged_reply;
use crate::sentiment::SentimentEscalationPolicy;
use crate::session::{SessionSnapshot, SessionState};

/// Status updates interleaved with audio in the turn output stream
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnStatus {
    /// Waiting for usable speech (empty transcript)
    Listening { placeholder: &'static str },
    /// Transcript rejected by the confidence filter
    Filtered { placeholder: &'static str },
    /// Transcript accepted into the conversation
    Recognized { text: String, confidence: f32 },
    /// Bot reply decided; synthesis follows
    Responding {
        text: String,
        sentiment: f32,
        tool: Option<String>,
    },
    /// Call is being transferred to a human
    Escalated { reason: String },
    /// Call finished
    Ended { reason: String },
}

/// One message in the turn output stream
#[derive(Debug, Clone)]
pub enum TurnEvent {
    Status(TurnStatus),
    Audio(AudioFrame),
}

/// Full history plus derived stats, for the agent-handoff surface
#[derive(Debug, Clone, Serialize)]
pub struct HistoryReport {
    pub turns: Vec<HistoryTurn>,
    pub stats: HistoryStats,
    pub summary: String,
}

/// Top-level turn handler composing the gates, guard, sub-dialogue,
/// dispatcher, and engines into one session state machine
pub struct DialogueOrchestrator {
    recognizer: Arc<dyn SpeechRecognizer>,
    reasoner: Arc<dyn ReasoningEngine>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    dispatcher: ToolDispatcher,
    gate: AudioEnergyGate,
    filter: ConfidenceFilter,
    policy: SentimentEscalationPolicy,
    config: DialogueConfig,
    // Per-session state. Locks are short-lived and never held across await.
    state: Mutex<SessionState>,
    history: Mutex<ConversationHistory>,
    context: Mutex<ChatContext>,
    guard: Mutex<HandoffGuard>,
    invoice: Mutex<InvoiceFlow>,
}

impl DialogueOrchestrator {
    pub fn new(
        recognizer: Arc<dyn SpeechRecognizer>,
        reasoner: Arc<dyn ReasoningEngine>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        stations: Arc<StationDirectory>,
        config: DialogueConfig,
    ) -> Self {
        Self {
            recognizer,
            reasoner,
            synthesizer,
            dispatcher: ToolDispatcher::new(stations),
            gate: AudioEnergyGate::new(config.min_audio_energy),
            filter: ConfidenceFilter::new(config.min_confidence, config.min_transcript_chars),
            policy: SentimentEscalationPolicy::new(
                config.sentiment_escalation_threshold,
                config.escalation_tool.clone(),
            ),
            state: Mutex::new(SessionState::new()),
            history: Mutex::new(ConversationHistory::new()),
            context: Mutex::new(ChatContext::new(config.chat_context_window)),
            guard: Mutex::new(HandoffGuard::new(
                config.handoff_confidence,
                config.handoff_strike_limit,
            )),
            invoice: Mutex::new(InvoiceFlow::new(RecordStore::new())),
            config,
        }
    }

    /// Stream the opening greeting at call start
    pub async fn greet(&self, events: &mpsc::Sender<TurnEvent>) -> Result<()> {
        self.record_bot_turn(OPENING_MESSAGE, None, 0.7, None);
        self.send_status(
            events,
            TurnStatus::Responding {
                text: OPENING_MESSAGE.to_string(),
                sentiment: 0.7,
                tool: None,
            },
        )
        .await;
        self.speak(OPENING_MESSAGE, events).await;
        Ok(())
    }

    /// Process one captured audio turn
    pub async fn handle_turn(
        &self,
        audio: AudioFrame,
        events: &mpsc::Sender<TurnEvent>,
    ) -> Result<()> {
        if self.emit_if_ended(events).await {
            return Ok(());
        }

        // Gating: silent turns are dropped with no output at all
        if !self.gate.check(&audio) {
            return Ok(());
        }

        // Recognizing
        let started = Instant::now();
        let timeout = Duration::from_millis(self.config.recognition_timeout_ms);
        let transcript = match tokio::time::timeout(timeout, self.recognizer.transcribe(&audio)).await
        {
            Ok(Ok(t)) => t,
            Ok(Err(e)) => {
                // absence of text is handled as an empty transcript below
                tracing::warn!(error = %e, "Recognition failed");
                TranscriptResult::new("", 0.0)
            },
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.config.recognition_timeout_ms,
                    "Recognition timed out"
                );
                TranscriptResult::new("", 0.0)
            },
        };
        self.state.lock().metrics.recognition_ms = started.elapsed().as_millis() as u64;

        // Filtering and guard check
        match self.filter.check(&transcript) {
            FilterVerdict::Empty => {
                self.send_status(
                    events,
                    TurnStatus::Listening {
                        placeholder: LISTENING_PLACEHOLDER,
                    },
                )
                .await;
                return Ok(());
            },
            FilterVerdict::TooShort => {
                self.send_status(
                    events,
                    TurnStatus::Filtered {
                        placeholder: FILTERED_PLACEHOLDER,
                    },
                )
                .await;
                return Ok(());
            },
            FilterVerdict::LowConfidence => {
                let trigger = self.guard.lock().check_and_update(transcript.confidence);
                if trigger {
                    return self.force_handoff(events).await;
                }
                self.send_status(
                    events,
                    TurnStatus::Filtered {
                        placeholder: FILTERED_PLACEHOLDER,
                    },
                )
                .await;
                return Ok(());
            },
            FilterVerdict::Accept => {
                // accepted confidence is above the guard threshold too
                self.guard.lock().check_and_update(transcript.confidence);
            },
        }

        // End request may have arrived while recognizing
        if self.emit_if_ended(events).await {
            return Ok(());
        }

        let user_text = transcript.text.trim().to_string();
        self.state.lock().last_user_text = user_text.clone();
        self.history
            .lock()
            .push(HistoryTurn::user(&user_text, transcript.confidence));
        self.context.lock().push(ChatMessage::user(&user_text));
        self.send_status(
            events,
            TurnStatus::Recognized {
                text: user_text.clone(),
                confidence: transcript.confidence,
            },
        )
        .await;

        // Reasoning, bounded by the configured timeout
        let outcome = self.reason().await;

        // ToolHandling
        let mut speech = outcome.speech_text.clone();
        let mut payload = None;
        if let Some(directive) = &outcome.directive {
            let dispatched = {
                let mut invoice = self.invoice.lock();
                self.dispatcher.dispatch(directive, &speech, &mut invoice)
            };
            match dispatched {
                DispatchOutcome::Continue {
                    speech: tool_speech,
                    payload: tool_payload,
                } => {
                    speech = tool_speech;
                    payload = tool_payload;
                    if directive.name == "get_nearest_station" {
                        self.state.lock().service_resolved = true;
                    }
                },
                DispatchOutcome::Escalate { reason, speech } => {
                    return self
                        .finish(
                            events,
                            &speech,
                            Some(directive.name.clone()),
                            outcome.sentiment,
                            format!("escalation_{reason}"),
                            true,
                        )
                        .await;
                },
                DispatchOutcome::End { reason, speech } => {
                    return self
                        .finish(
                            events,
                            &speech,
                            Some(directive.name.clone()),
                            outcome.sentiment,
                            reason,
                            false,
                        )
                        .await;
                },
            }
        }

        // EscalationCheck
        if self
            .policy
            .should_escalate(outcome.sentiment, outcome.directive.as_ref())
        {
            return self
                .finish(
                    events,
                    ESCALATION_MESSAGE,
                    Some(self.config.escalation_tool.clone()),
                    outcome.sentiment,
                    "sentiment_escalation".to_string(),
                    true,
                )
                .await;
        }

        // HistoryUpdate + Synthesizing
        let tool_name = outcome.directive.as_ref().map(|d| d.name.clone());
        self.record_bot_turn(&speech, tool_name.clone(), outcome.sentiment, payload);
        self.send_status(
            events,
            TurnStatus::Responding {
                text: speech.clone(),
                sentiment: outcome.sentiment,
                tool: tool_name,
            },
        )
        .await;
        self.speak(&speech, events).await;
        Ok(())
    }

    /// Snapshot for the client polling surface
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().snapshot()
    }

    /// Reset everything for a fresh call
    pub fn reset(&self) {
        self.state.lock().reset();
        self.history.lock().clear();
        self.context.lock().clear();
        self.guard.lock().reset();
        self.invoice.lock().reset();
        tracing::info!("Session reset");
    }

    /// External end request (hang-up, client stop button)
    ///
    /// Observed at the top of the next turn and at mid-turn checkpoints.
    pub fn request_end(&self, reason: impl Into<String>) {
        self.state.lock().end(reason);
    }

    pub fn is_ended(&self) -> bool {
        self.state.lock().should_end
    }

    /// Full history plus stats and a topic summary for agent handoff
    pub fn history_report(&self) -> HistoryReport {
        let history = self.history.lock();
        HistoryReport {
            turns: history.turns().to_vec(),
            stats: history.stats(self.config.handoff_confidence),
            summary: history.topic_summary(),
        }
    }

    async fn reason(&self) -> ReasoningOutcome {
        let messages = {
            let mut msgs = vec![ChatMessage {
                role: ChatRole::System,
                content: SYSTEM_PROMPT.to_string(),
            }];
            msgs.extend(self.context.lock().messages());
            msgs
        };

        let started = Instant::now();
        let timeout = Duration::from_millis(self.config.reasoning_timeout_ms);
        let outcome = match tokio::time::timeout(timeout, self.reasoner.respond(&messages)).await {
            Ok(Ok(raw)) => parse_tagged_reply(&raw),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Reasoning failed, substituting apology");
                ReasoningOutcome::speech_only(REASONING_APOLOGY, 0.5)
            },
            Err(_) => {
                tracing::warn!(timeout_ms = self.config.reasoning_timeout_ms, "Reasoning timed out");
                ReasoningOutcome::speech_only(REASONING_APOLOGY, 0.5)
            },
        };
        self.state.lock().metrics.reasoning_ms = started.elapsed().as_millis() as u64;
        outcome
    }

    /// Chronic low-confidence audio: stream the handoff notice and end
    async fn force_handoff(&self, events: &mpsc::Sender<TurnEvent>) -> Result<()> {
        let message = self.guard.lock().escalation_message();
        let sentiment = self.state.lock().last_sentiment;
        self.finish(
            events,
            message,
            Some(self.config.escalation_tool.clone()),
            sentiment,
            "audio_quality_escalation".to_string(),
            true,
        )
        .await
    }

    /// Terminal exit: speak the closing text, then mark the session ended
    async fn finish(
        &self,
        events: &mpsc::Sender<TurnEvent>,
        speech: &str,
        tool: Option<String>,
        sentiment: f32,
        reason: String,
        escalated: bool,
    ) -> Result<()> {
        self.record_bot_turn(speech, tool.clone(), sentiment, None);
        self.send_status(
            events,
            TurnStatus::Responding {
                text: speech.to_string(),
                sentiment,
                tool,
            },
        )
        .await;
        self.speak(speech, events).await;

        self.state.lock().end(reason.clone());
        let status = if escalated {
            TurnStatus::Escalated { reason }
        } else {
            TurnStatus::Ended { reason }
        };
        self.send_status(events, status).await;
        Ok(())
    }

    fn record_bot_turn(
        &self,
        text: &str,
        tool: Option<String>,
        sentiment: f32,
        payload: Option<serde_json::Value>,
    ) {
        self.history
            .lock()
            .push(HistoryTurn::bot(text, tool.clone(), sentiment));
        self.context.lock().push(ChatMessage::assistant(text));
        let mut state = self.state.lock();
        state.last_bot_text = text.to_string();
        state.last_tool = tool;
        state.record_sentiment(sentiment);
        if payload.is_some() {
            state.structured_tool_payload = payload;
        }
    }

    /// Stream synthesized audio; a synthesizer failure substitutes one
    /// silent frame so the call never hangs waiting for audio
    async fn speak(&self, text: &str, events: &mpsc::Sender<TurnEvent>) {
        let started = Instant::now();
        self.state.lock().speaking = true;

        let timeout = Duration::from_millis(self.config.synthesis_timeout_ms);
        match tokio::time::timeout(timeout, self.synthesizer.synthesize_stream(text)).await {
            Ok(Ok(mut stream)) => {
                while let Some(item) = stream.next().await {
                    match item {
                        Ok(frame) => {
                            if events.send(TurnEvent::Audio(frame)).await.is_err() {
                                break;
                            }
                        },
                        Err(e) => {
                            tracing::warn!(error = %e, "Synthesis stream failed mid-utterance");
                            self.send_silence(events).await;
                            break;
                        },
                    }
                }
            },
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Synthesis failed, substituting silence");
                self.send_silence(events).await;
            },
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.config.synthesis_timeout_ms,
                    "Synthesis timed out, substituting silence"
                );
                self.send_silence(events).await;
            },
        }

        let mut state = self.state.lock();
        state.speaking = false;
        state.metrics.synthesis_ms = started.elapsed().as_millis() as u64;
    }

    async fn send_silence(&self, events: &mpsc::Sender<TurnEvent>) {
        let frame = AudioFrame::silence(
            Duration::from_millis(self.config.synthesis_fallback_ms),
            SampleRate::Hz16000,
        );
        let _ = events.send(TurnEvent::Audio(frame)).await;
    }

    async fn send_status(&self, events: &mpsc::Sender<TurnEvent>, status: TurnStatus) {
        let _ = events.send(TurnEvent::Status(status)).await;
    }

    /// Emit the terminal status when an end request is pending
    async fn emit_if_ended(&self, events: &mpsc::Sender<TurnEvent>) -> bool {
        let reason = {
            let state = self.state.lock();
            if !state.should_end {
                return false;
            }
            state
                .end_reason
                .clone()
                .unwrap_or_else(|| "manual_stop".to_string())
        };
        self.send_status(events, TurnStatus::Ended { reason }).await;
        true
    }
}
