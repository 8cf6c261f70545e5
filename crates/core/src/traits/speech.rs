//! Speech recognition and synthesis interfaces

use crate::audio::AudioFrame;
use crate::directive::TranscriptResult;
use crate::error::Result;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Stream of synthesized audio frames
pub type AudioStream = Pin<Box<dyn Stream<Item = Result<AudioFrame>> + Send>>;

/// Speech-to-text interface
///
/// # Example
///
/// ```ignore
/// let stt: Arc<dyn SpeechRecognizer> = Arc::new(WhisperRecognizer::new(config));
/// let transcript = stt.transcribe(&audio_frame).await?;
/// println!("Transcribed: {}", transcript.text);
/// ```
#[async_trait]
pub trait SpeechRecognizer: Send + Sync + 'static {
    /// Transcribe one captured audio turn
    ///
    /// # Returns
    /// Transcript text with recognition confidence in [0, 1]
    async fn transcribe(&self, audio: &AudioFrame) -> Result<TranscriptResult>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}

/// Text-to-speech interface
///
/// Streaming keeps first-chunk latency low: the caller can start playing
/// audio before the full utterance is synthesized.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + 'static {
    /// Synthesize text to a stream of audio frames
    async fn synthesize_stream(&self, text: &str) -> Result<AudioStream>;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SampleRate;
    use futures::StreamExt;

    struct MockRecognizer;

    #[async_trait]
    impl SpeechRecognizer for MockRecognizer {
        async fn transcribe(&self, _audio: &AudioFrame) -> Result<TranscriptResult> {
            Ok(TranscriptResult::new("test transcription", 0.95))
        }

        fn model_name(&self) -> &str {
            "mock-stt"
        }
    }

    struct MockSynthesizer;

    #[async_trait]
    impl SpeechSynthesizer for MockSynthesizer {
        async fn synthesize_stream(&self, text: &str) -> Result<AudioStream> {
            let chunks = text.len().div_ceil(16).max(1);
            let frames: Vec<Result<AudioFrame>> = (0..chunks)
                .map(|i| Ok(AudioFrame::new(vec![0.1; 320], SampleRate::Hz16000, i as u64)))
                .collect();
            Ok(Box::pin(futures::stream::iter(frames)))
        }

        fn model_name(&self) -> &str {
            "mock-tts"
        }
    }

    #[tokio::test]
    async fn mock_recognizer_transcribes() {
        let stt = MockRecognizer;
        let audio = AudioFrame::new(vec![0.1; 320], SampleRate::Hz16000, 0);
        let transcript = stt.transcribe(&audio).await.unwrap();
        assert_eq!(transcript.text, "test transcription");
        assert!(transcript.confidence > 0.9);
    }

    #[tokio::test]
    async fn mock_synthesizer_streams_frames() {
        let tts = MockSynthesizer;
        let mut stream = tts.synthesize_stream("hello out there").await.unwrap();
        let mut count = 0;
        while let Some(frame) = stream.next().await {
            assert!(!frame.unwrap().is_empty());
            count += 1;
        }
        assert!(count >= 1);
    }
}
