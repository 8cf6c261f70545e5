//! Forced handoff after repeated low-confidence turns

use voice_dialogue_config::prompts::HANDOFF_MESSAGE;

/// Counts consecutive degraded-confidence turns and forces a human
/// handoff at the strike limit
///
/// The guard threshold (0.50 by default) is looser than the filter's
/// accept threshold: a turn between the two is dropped from the
/// conversation but does not strike the guard.
#[derive(Debug, Clone)]
pub struct HandoffGuard {
    threshold: f32,
    strike_limit: u32,
    strike_count: u32,
}

impl HandoffGuard {
    pub fn new(threshold: f32, strike_limit: u32) -> Self {
        Self {
            threshold,
            strike_limit,
            strike_count: 0,
        }
    }

    /// Record one turn's confidence; returns `true` when handoff must
    /// trigger now
    pub fn check_and_update(&mut self, confidence: f32) -> bool {
        if confidence >= self.threshold {
            if self.strike_count > 0 {
                tracing::debug!(confidence, "Handoff strike counter reset");
            }
            self.strike_count = 0;
            return false;
        }
        self.strike_count += 1;
        tracing::info!(
            confidence,
            strikes = self.strike_count,
            limit = self.strike_limit,
            "Low-confidence strike recorded"
        );
        self.strike_count >= self.strike_limit
    }

    /// The fixed handoff announcement; resets the counter so a later
    /// call starts clean
    pub fn escalation_message(&mut self) -> &'static str {
        self.strike_count = 0;
        HANDOFF_MESSAGE
    }

    pub fn reset(&mut self) {
        self.strike_count = 0;
    }

    pub fn strike_count(&self) -> u32 {
        self.strike_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_strikes_trigger() {
        let mut guard = HandoffGuard::new(0.50, 2);
        assert!(!guard.check_and_update(0.3));
        assert!(guard.check_and_update(0.2));
    }

    #[test]
    fn good_turn_resets_counter() {
        let mut guard = HandoffGuard::new(0.50, 2);
        assert!(!guard.check_and_update(0.3));
        assert!(!guard.check_and_update(0.6));
        assert_eq!(guard.strike_count(), 0);
        assert!(!guard.check_and_update(0.3));
    }

    #[test]
    fn at_threshold_counts_as_good() {
        let mut guard = HandoffGuard::new(0.50, 2);
        assert!(!guard.check_and_update(0.50));
        assert_eq!(guard.strike_count(), 0);
    }

    #[test]
    fn message_resets_counter() {
        let mut guard = HandoffGuard::new(0.50, 2);
        guard.check_and_update(0.1);
        guard.check_and_update(0.1);
        let message = guard.escalation_message();
        assert!(message.contains("human agent"));
        assert_eq!(guard.strike_count(), 0);
    }
}
