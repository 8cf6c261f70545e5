//! Development engine stubs
//!
//! Let the server run end-to-end with no external model services attached.
//! The echo recognizer derives a transcript from signal energy, the
//! scripted reasoner cycles through canned tagged replies, and the silence
//! synthesizer emits empty audio sized to the text.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use voice_dialogue_core::{
    AudioFrame, AudioStream, ChatMessage, ReasoningEngine, Result, SampleRate, SpeechRecognizer,
    SpeechSynthesizer, TranscriptResult,
};

/// Maps signal energy to a fake transcript and confidence
pub struct EchoRecognizer;

#[async_trait]
impl SpeechRecognizer for EchoRecognizer {
    async fn transcribe(&self, audio: &AudioFrame) -> Result<TranscriptResult> {
        let energy = audio.mean_abs_amplitude();
        let confidence = (energy / 2000.0).clamp(0.0, 0.95);
        let text = format!("spoken input at energy {energy:.0}");
        tracing::debug!(energy, confidence, "Echo recognizer transcript");
        Ok(TranscriptResult::new(text, confidence))
    }

    fn model_name(&self) -> &str {
        "dev-echo"
    }
}

/// Cycles through a fixed set of tagged replies
pub struct ScriptedReasoner {
    replies: Vec<&'static str>,
    cursor: Mutex<usize>,
}

impl ScriptedReasoner {
    pub fn new() -> Self {
        Self {
            replies: vec![
                "[TOOL: null]\n[SENTIMENT: 0.7]\nJi, main sun rahi hoon. Bataiye kaise madad karoon?",
                "[TOOL: {\"name\": \"get_nearest_station\", \"args\": {}}]\n[SENTIMENT: 0.7]\n\
                 Main aapke liye nazdeeki station dhundhti hoon.",
                "[TOOL: {\"name\": \"get_invoice\", \"args\": {\"action\": \"initiate\"}}]\n\
                 [SENTIMENT: 0.7]\nJi zaroor, invoice check karti hoon.",
            ],
            cursor: Mutex::new(0),
        }
    }
}

impl Default for ScriptedReasoner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReasoningEngine for ScriptedReasoner {
    async fn respond(&self, _context: &[ChatMessage]) -> Result<String> {
        let mut cursor = self.cursor.lock();
        let reply = self.replies[*cursor % self.replies.len()];
        *cursor += 1;
        Ok(reply.to_string())
    }

    fn model_name(&self) -> &str {
        "dev-scripted"
    }
}

/// Streams 20 ms silent frames, roughly 60 ms per word
pub struct SilenceSynthesizer;

#[async_trait]
impl SpeechSynthesizer for SilenceSynthesizer {
    async fn synthesize_stream(&self, text: &str) -> Result<AudioStream> {
        let words = text.split_whitespace().count().max(1);
        let frames: Vec<Result<AudioFrame>> = (0..words * 3)
            .map(|_| Ok(AudioFrame::silence(Duration::from_millis(20), SampleRate::Hz16000)))
            .collect();
        Ok(Box::pin(futures::stream::iter(frames)))
    }

    fn model_name(&self) -> &str {
        "dev-silence"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn echo_confidence_tracks_energy() {
        let loud: Vec<u8> = std::iter::repeat(4000i16)
            .take(800)
            .flat_map(|s| s.to_le_bytes())
            .collect();
        let frame = AudioFrame::from_pcm16(&loud, SampleRate::Hz16000, 0);
        let result = EchoRecognizer.transcribe(&frame).await.unwrap();
        assert!(result.confidence > 0.9);

        let silent = AudioFrame::silence(Duration::from_millis(50), SampleRate::Hz16000);
        let result = EchoRecognizer.transcribe(&silent).await.unwrap();
        assert_eq!(result.confidence, 0.0);
    }

    #[tokio::test]
    async fn scripted_reasoner_cycles() {
        let reasoner = ScriptedReasoner::new();
        let first = reasoner.respond(&[]).await.unwrap();
        let second = reasoner.respond(&[]).await.unwrap();
        assert_ne!(first, second);
        assert!(first.contains("[SENTIMENT:"));
    }

    #[tokio::test]
    async fn silence_synthesizer_sizes_to_text() {
        let mut stream = SilenceSynthesizer
            .synthesize_stream("three word reply")
            .await
            .unwrap();
        let mut count = 0;
        while let Some(frame) = stream.next().await {
            assert_eq!(frame.unwrap().mean_abs_amplitude(), 0.0);
            count += 1;
        }
        assert_eq!(count, 9);
    }
}
