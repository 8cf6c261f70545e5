//! Invoice lookup sub-dialogue
//!
//! Multi-turn state machine: collect a driver id, confirm it, then answer
//! summary and breakdown questions from the confirmed record. One instance
//! per session, reset with the session.

use serde_json::json;
use voice_dialogue_core::ToolDirective;
use voice_dialogue_tools::{RecordStore, ToolError, ToolReply};

/// Phase of the lookup flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupPhase {
    #[default]
    Idle,
    AwaitingId,
    Confirming,
    Confirmed,
}

/// Driver invoice lookup state machine
///
/// Invariants: `confirmed_id` is set iff the phase is `Confirmed`;
/// `pending_id` is set only while `Confirming`.
#[derive(Debug, Default)]
pub struct InvoiceFlow {
    phase: LookupPhase,
    pending_id: Option<String>,
    confirmed_id: Option<String>,
    store: RecordStore,
}

impl InvoiceFlow {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> LookupPhase {
        self.phase
    }

    pub fn pending_id(&self) -> Option<&str> {
        self.pending_id.as_deref()
    }

    pub fn confirmed_id(&self) -> Option<&str> {
        self.confirmed_id.as_deref()
    }

    pub fn reset(&mut self) {
        self.phase = LookupPhase::Idle;
        self.pending_id = None;
        self.confirmed_id = None;
        tracing::info!("Invoice flow reset");
    }

    /// Route one tool directive through the state machine
    ///
    /// Unexpected actions before an id is confirmed fall back to
    /// `initiate`, so a confused reasoning step re-enters the flow
    /// instead of wedging it.
    pub fn handle(&mut self, directive: &ToolDirective) -> Result<ToolReply, ToolError> {
        let action = directive.arg_str("action").unwrap_or("initiate");
        match action {
            "initiate" => Ok(self.initiate()),
            "provide_id" => {
                let raw = directive
                    .arg_str("driver_id")
                    .ok_or_else(|| ToolError::InvalidParams("driver_id is required".into()))?;
                Ok(self.provide_id(raw))
            },
            "confirm" => {
                let confirmed = directive.arg_bool("confirmed").unwrap_or(false);
                Ok(self.confirm(confirmed))
            },
            "get_summary" => Ok(self.summary()),
            "get_penalty" => Ok(self.penalty_details()),
            "get_swaps" => Ok(self.swap_details()),
            other => {
                tracing::warn!(action = other, "Unknown invoice action, re-initiating");
                Ok(self.initiate())
            },
        }
    }

    /// Accepts "D105", "d105", "105" and yields "D105"
    fn normalize_id(raw: &str) -> String {
        let mut id = raw.trim().to_uppercase();
        if id.chars().all(|c| c.is_ascii_digit()) && !id.is_empty() {
            id = format!("D{id}");
        }
        if !id.starts_with('D') {
            id = format!("D{id}");
        }
        id
    }

    fn initiate(&mut self) -> ToolReply {
        self.phase = LookupPhase::AwaitingId;
        self.pending_id = None;
        self.confirmed_id = None;
        tracing::info!("Invoice flow initiated, awaiting driver id");
        ToolReply::speech_only("Ji zaroor! Aapki Driver ID kya hai?")
    }

    fn provide_id(&mut self, raw: &str) -> ToolReply {
        let normalized = Self::normalize_id(raw);
        tracing::info!(raw, normalized = %normalized, "Received driver id");

        if !self.store.contains(&normalized) {
            tracing::warn!(id = %normalized, "Driver id not found");
            // phase unchanged: keep waiting for a usable id
            if self.phase == LookupPhase::Idle {
                self.phase = LookupPhase::AwaitingId;
            }
            return ToolReply::speech_only(format!(
                "Maaf kijiye, {normalized} ID humare system mein nahi mili. \
                 Kya aap dobara sahi ID bata sakte hain?"
            ));
        }

        self.pending_id = Some(normalized.clone());
        self.confirmed_id = None;
        self.phase = LookupPhase::Confirming;
        ToolReply::with_payload(
            format!("Aapki Driver ID {normalized} hai, kya yeh sahi hai?"),
            json!({"driver_id": normalized}),
        )
    }

    fn confirm(&mut self, confirmed: bool) -> ToolReply {
        if self.phase != LookupPhase::Confirming || self.pending_id.is_none() {
            return self.initiate();
        }
        if confirmed {
            self.confirmed_id = self.pending_id.take();
            self.phase = LookupPhase::Confirmed;
            tracing::info!(id = self.confirmed_id.as_deref(), "Driver id confirmed");
            self.summary()
        } else {
            self.pending_id = None;
            self.phase = LookupPhase::AwaitingId;
            tracing::info!("Driver denied id, asking again");
            ToolReply::speech_only("Theek hai, kripya apni sahi Driver ID bataiye.")
        }
    }

    fn confirmed_record(&mut self) -> Option<&'static voice_dialogue_tools::InvoiceRecord> {
        if self.phase != LookupPhase::Confirmed {
            return None;
        }
        self.confirmed_id.as_deref().and_then(|id| self.store.get(id))
    }

    fn summary(&mut self) -> ToolReply {
        let Some(invoice) = self.confirmed_record() else {
            return self.initiate();
        };
        let total_swaps = invoice.swaps_summary.total_swaps_month;
        let total_cost = invoice.financials.final_total_payable;
        ToolReply::with_payload(
            format!(
                "Main dekh rahi hoon, aapke iss month total {total_swaps} swaps hue hain \
                 aur aapka total payable amount {total_cost} rupees hai. \
                 Kya aapko aur koi detail chahiye jaise penalty ya swap breakdown?"
            ),
            json!({
                "driver_id": invoice.driver_id,
                "total_swaps": total_swaps,
                "total_cost": total_cost,
            }),
        )
    }

    fn penalty_details(&mut self) -> ToolReply {
        let Some(invoice) = self.confirmed_record() else {
            return self.initiate();
        };
        let p = &invoice.penalty_summary;
        let net = invoice.financials.net_penalty_payable;
        let speech = if p.chargeable_incidents == 0 {
            format!(
                "Aapke iss month {} incidents hue the, lekin {} exempted the isliye aapko \
                 koi penalty nahi lagti. Bahut accha performance hai!",
                p.total_incidents, p.exempted_incidents
            )
        } else {
            format!(
                "Aapke iss month {} incidents hue, jinme se {} exempted the. \
                 {} chargeable incidents ke liye penalty {} rupees bani, \
                 lekin {} rupees diverted ho gaye. \
                 Aapko sirf {net} rupees penalty pay karni hai.",
                p.total_incidents,
                p.exempted_incidents,
                p.chargeable_incidents,
                p.total_penalty_cost,
                p.penalty_diverted
            )
        };
        let payload = serde_json::to_value(p).unwrap_or_default();
        ToolReply::with_payload(speech, payload)
    }

    fn swap_details(&mut self) -> ToolReply {
        let Some(invoice) = self.confirmed_record() else {
            return self.initiate();
        };
        let swaps = &invoice.swaps_summary;
        let primary = &swaps.primary_swaps;
        let secondary = &swaps.secondary_swaps;

        let mut speech = format!(
            "Aapke total {} swaps ka breakdown yeh hai: {} primary swaps at {} rupees, \
             total {} rupees. ",
            swaps.total_swaps_month, primary.count, primary.rate, primary.cost
        );
        if secondary.count > 0 {
            speech.push_str(&format!(
                "Aur {} secondary swaps at {} rupees, total {} rupees. ",
                secondary.count, secondary.rate, secondary.cost
            ));
        }
        speech.push_str(&format!(
            "Grand total swap cost hai {} rupees.",
            invoice.financials.total_swap_cost
        ));

        let payload = serde_json::to_value(swaps).unwrap_or_default();
        ToolReply::with_payload(speech, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive(args: serde_json::Value) -> ToolDirective {
        ToolDirective::new("get_invoice", args)
    }

    #[test]
    fn normalization_accepts_variants() {
        assert_eq!(InvoiceFlow::normalize_id("105"), "D105");
        assert_eq!(InvoiceFlow::normalize_id("d105"), "D105");
        assert_eq!(InvoiceFlow::normalize_id(" D105 "), "D105");
    }

    #[test]
    fn flow_state_is_debug_renderable() {
        let flow = InvoiceFlow::new(RecordStore::new());
        assert!(format!("{flow:?}").contains("Idle"));
    }

    #[test]
    fn happy_path_confirms_numeric_id() {
        let mut flow = InvoiceFlow::new(RecordStore::new());
        flow.handle(&directive(json!({"action": "initiate"}))).unwrap();
        assert_eq!(flow.phase(), LookupPhase::AwaitingId);

        let reply = flow
            .handle(&directive(json!({"action": "provide_id", "driver_id": "105"})))
            .unwrap();
        assert_eq!(flow.phase(), LookupPhase::Confirming);
        assert_eq!(flow.pending_id(), Some("D105"));
        assert!(reply.speech.contains("D105"));

        let reply = flow
            .handle(&directive(json!({"action": "confirm", "confirmed": true})))
            .unwrap();
        assert_eq!(flow.phase(), LookupPhase::Confirmed);
        assert_eq!(flow.confirmed_id(), Some("D105"));
        assert!(flow.pending_id().is_none());
        assert!(reply.speech.contains("35 swaps"));
        assert!(reply.speech.contains("4570 rupees"));
    }

    #[test]
    fn denial_returns_to_awaiting_with_ids_cleared() {
        let mut flow = InvoiceFlow::new(RecordStore::new());
        flow.handle(&directive(json!({"action": "initiate"}))).unwrap();
        flow.handle(&directive(json!({"action": "provide_id", "driver_id": "D212"})))
            .unwrap();
        flow.handle(&directive(json!({"action": "confirm", "confirmed": false})))
            .unwrap();
        assert_eq!(flow.phase(), LookupPhase::AwaitingId);
        assert!(flow.pending_id().is_none());
        assert!(flow.confirmed_id().is_none());
    }

    #[test]
    fn unknown_id_keeps_awaiting() {
        let mut flow = InvoiceFlow::new(RecordStore::new());
        flow.handle(&directive(json!({"action": "initiate"}))).unwrap();
        let reply = flow
            .handle(&directive(json!({"action": "provide_id", "driver_id": "999"})))
            .unwrap();
        assert_eq!(flow.phase(), LookupPhase::AwaitingId);
        assert!(flow.pending_id().is_none());
        assert!(reply.speech.contains("nahi mili"));
    }

    #[test]
    fn detail_requests_keep_confirmed_phase() {
        let mut flow = InvoiceFlow::new(RecordStore::new());
        flow.handle(&directive(json!({"action": "provide_id", "driver_id": "D307"})))
            .unwrap();
        flow.handle(&directive(json!({"action": "confirm", "confirmed": true})))
            .unwrap();

        let penalty = flow
            .handle(&directive(json!({"action": "get_penalty"})))
            .unwrap();
        assert_eq!(flow.phase(), LookupPhase::Confirmed);
        assert!(penalty.speech.contains("6 chargeable"));

        let swaps = flow
            .handle(&directive(json!({"action": "get_swaps"})))
            .unwrap();
        assert_eq!(flow.phase(), LookupPhase::Confirmed);
        assert!(swaps.speech.contains("3040 rupees"));
    }

    #[test]
    fn detail_before_confirmation_reinitiates() {
        let mut flow = InvoiceFlow::new(RecordStore::new());
        let reply = flow
            .handle(&directive(json!({"action": "get_penalty"})))
            .unwrap();
        assert_eq!(flow.phase(), LookupPhase::AwaitingId);
        assert!(reply.speech.contains("Driver ID"));
    }

    #[test]
    fn missing_driver_id_is_invalid_params() {
        let mut flow = InvoiceFlow::new(RecordStore::new());
        let err = flow.handle(&directive(json!({"action": "provide_id"})));
        assert!(err.is_err());
    }

    #[test]
    fn reset_clears_everything() {
        let mut flow = InvoiceFlow::new(RecordStore::new());
        flow.handle(&directive(json!({"action": "provide_id", "driver_id": "105"})))
            .unwrap();
        flow.handle(&directive(json!({"action": "confirm", "confirmed": true})))
            .unwrap();
        flow.reset();
        assert_eq!(flow.phase(), LookupPhase::Idle);
        assert!(flow.confirmed_id().is_none());
        assert!(flow.pending_id().is_none());
    }
}
