//! Session orchestration for the voice dialogue system
//!
//! This crate owns the turn state machine: input-quality gating, the
//! handoff guard, the invoice sub-dialogue, tool dispatch, sentiment
//! escalation, and per-session state. Engines are injected as trait
//! objects from `voice-dialogue-core`.

pub mod dispatch;
pub mod gating;
pub mod handoff;
pub mod invoice;
pub mod orchestrator;
pub mod reply;
pub mod sentiment;
pub mod session;

pub use dispatch::{DispatchOutcome, ToolDispatcher};
pub use gating::{AudioEnergyGate, ConfidenceFilter, FilterVerdict};
pub use handoff::HandoffGuard;
pub use invoice::{InvoiceFlow, LookupPhase};
pub use orchestrator::{DialogueOrchestrator, HistoryReport, TurnEvent, TurnStatus};
pub use reply::parse_tagged_reply;
pub use sentiment::SentimentEscalationPolicy;
pub use session::{SessionSnapshot, SessionState, TurnMetrics};
