//! Input-quality gates applied before a transcript enters the conversation

use voice_dialogue_core::{AudioFrame, TranscriptResult};

/// Drops silent or near-silent audio before paying recognition cost
#[derive(Debug, Clone)]
pub struct AudioEnergyGate {
    min_energy: f32,
}

impl AudioEnergyGate {
    pub fn new(min_energy: f32) -> Self {
        Self { min_energy }
    }

    /// Returns `true` when the turn carries enough energy to recognize
    pub fn check(&self, audio: &AudioFrame) -> bool {
        let energy = audio.mean_abs_amplitude();
        if energy < self.min_energy {
            tracing::debug!(energy, threshold = self.min_energy, "Audio turn gated out");
            return false;
        }
        true
    }
}

/// Why a transcript was rejected, or that it was accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterVerdict {
    Accept,
    /// Recognizer produced no text
    Empty,
    /// Confidence below the accept threshold; counts toward handoff
    LowConfidence,
    /// Too short to be meaningful; treated as noise, no handoff strike
    TooShort,
}

/// Rejects transcripts below a minimum confidence or length
///
/// Checks run in order: empty, confidence, length. A transcript exactly
/// at the confidence threshold is accepted.
#[derive(Debug, Clone)]
pub struct ConfidenceFilter {
    min_confidence: f32,
    min_chars: usize,
}

impl ConfidenceFilter {
    pub fn new(min_confidence: f32, min_chars: usize) -> Self {
        Self {
            min_confidence,
            min_chars,
        }
    }

    pub fn check(&self, transcript: &TranscriptResult) -> FilterVerdict {
        let trimmed = transcript.text.trim();
        if trimmed.is_empty() {
            return FilterVerdict::Empty;
        }
        if transcript.confidence < self.min_confidence {
            tracing::info!(
                confidence = transcript.confidence,
                text = %trimmed,
                "Transcript rejected on confidence"
            );
            return FilterVerdict::LowConfidence;
        }
        if trimmed.chars().count() < self.min_chars {
            tracing::debug!(text = %trimmed, "Transcript rejected as too short");
            return FilterVerdict::TooShort;
        }
        FilterVerdict::Accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voice_dialogue_core::SampleRate;

    fn frame_with_amplitude(value: i16) -> AudioFrame {
        let bytes: Vec<u8> = std::iter::repeat(value)
            .take(320)
            .flat_map(|s| s.to_le_bytes())
            .collect();
        AudioFrame::from_pcm16(&bytes, SampleRate::Hz16000, 0)
    }

    #[test]
    fn gate_drops_quiet_audio() {
        let gate = AudioEnergyGate::new(800.0);
        assert!(!gate.check(&frame_with_amplitude(400)));
        assert!(gate.check(&frame_with_amplitude(1200)));
    }

    #[test]
    fn filter_accepts_at_threshold() {
        let filter = ConfidenceFilter::new(0.70, 3);
        let verdict = filter.check(&TranscriptResult::new("hello there", 0.70));
        assert_eq!(verdict, FilterVerdict::Accept);
    }

    #[test]
    fn filter_rejects_below_threshold() {
        let filter = ConfidenceFilter::new(0.70, 3);
        let verdict = filter.check(&TranscriptResult::new("hello there", 0.69));
        assert_eq!(verdict, FilterVerdict::LowConfidence);
    }

    #[test]
    fn filter_rejects_empty_before_confidence() {
        let filter = ConfidenceFilter::new(0.70, 3);
        assert_eq!(
            filter.check(&TranscriptResult::new("   ", 0.2)),
            FilterVerdict::Empty
        );
    }

    #[test]
    fn filter_rejects_short_after_confidence() {
        let filter = ConfidenceFilter::new(0.70, 3);
        assert_eq!(
            filter.check(&TranscriptResult::new("ok", 0.95)),
            FilterVerdict::TooShort
        );
        // low confidence wins over length
        assert_eq!(
            filter.check(&TranscriptResult::new("ok", 0.3)),
            FilterVerdict::LowConfidence
        );
    }
}
