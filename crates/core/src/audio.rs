//! Audio frame types and utilities

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Supported audio sample rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SampleRate {
    /// 8kHz - Telephony
    Hz8000,
    /// 16kHz - Standard speech recognition
    #[default]
    Hz16000,
    /// 22.05kHz - TTS output
    Hz22050,
    /// 24kHz - High-quality TTS output
    Hz24000,
    /// 48kHz - Professional audio
    Hz48000,
}

impl SampleRate {
    /// Get sample rate as u32
    pub fn as_u32(&self) -> u32 {
        match self {
            SampleRate::Hz8000 => 8000,
            SampleRate::Hz16000 => 16000,
            SampleRate::Hz22050 => 22050,
            SampleRate::Hz24000 => 24000,
            SampleRate::Hz48000 => 48000,
        }
    }

    /// Get frame size for 20ms chunk
    pub fn frame_size_20ms(&self) -> usize {
        (self.as_u32() as usize * 20) / 1000
    }
}

/// One captured or synthesized audio turn
///
/// Samples are stored as f32 normalized to [-1.0, 1.0]; mono only.
#[derive(Clone)]
pub struct AudioFrame {
    /// Raw audio samples (f32, normalized to [-1.0, 1.0])
    pub samples: Arc<[f32]>,
    /// Sample rate
    pub sample_rate: SampleRate,
    /// Frame sequence number for ordering
    pub sequence: u64,
    /// Duration of this frame
    pub duration: Duration,
}

impl std::fmt::Debug for AudioFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioFrame")
            .field("samples_len", &self.samples.len())
            .field("sample_rate", &self.sample_rate)
            .field("sequence", &self.sequence)
            .field("duration", &self.duration)
            .finish()
    }
}

// PCM16 constants; conversion is asymmetric so that -32768 maps inside [-1, 1].
const PCM16_NORMALIZE: f32 = 32768.0;
const PCM16_SCALE: f32 = 32767.0;

impl AudioFrame {
    /// Create a new audio frame from f32 samples
    pub fn new(samples: Vec<f32>, sample_rate: SampleRate, sequence: u64) -> Self {
        let duration =
            Duration::from_secs_f64(samples.len() as f64 / sample_rate.as_u32() as f64);
        Self {
            samples: samples.into(),
            sample_rate,
            sequence,
            duration,
        }
    }

    /// A silent frame of the given duration, used as a synthesis fallback
    pub fn silence(duration: Duration, sample_rate: SampleRate) -> Self {
        let len = (duration.as_secs_f64() * sample_rate.as_u32() as f64) as usize;
        Self::new(vec![0.0; len], sample_rate, 0)
    }

    /// Convert from PCM16 bytes (little-endian)
    pub fn from_pcm16(bytes: &[u8], sample_rate: SampleRate, sequence: u64) -> Self {
        let samples: Vec<f32> = bytes
            .chunks_exact(2)
            .map(|chunk| {
                let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
                sample as f32 / PCM16_NORMALIZE
            })
            .collect();
        Self::new(samples, sample_rate, sequence)
    }

    /// Convert to PCM16 bytes (little-endian)
    pub fn to_pcm16(&self) -> Vec<u8> {
        self.samples
            .iter()
            .flat_map(|&sample| {
                let clamped = sample.clamp(-1.0, 1.0);
                let pcm16 = (clamped * PCM16_SCALE) as i16;
                pcm16.to_le_bytes()
            })
            .collect()
    }

    /// Mean absolute amplitude on the PCM16 scale
    ///
    /// The energy gate threshold is expressed against 16-bit sample
    /// magnitudes, so this scales the normalized samples back up.
    pub fn mean_abs_amplitude(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.samples.iter().map(|s| s.abs()).sum();
        (sum / self.samples.len() as f32) * PCM16_NORMALIZE
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcm16_round_trip() {
        let bytes: Vec<u8> = [0i16, 1000, -1000, 16000, -16000]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        let frame = AudioFrame::from_pcm16(&bytes, SampleRate::Hz16000, 0);
        assert_eq!(frame.samples.len(), 5);
        let back = frame.to_pcm16();
        assert_eq!(back.len(), bytes.len());
    }

    #[test]
    fn mean_abs_amplitude_scales_to_pcm16() {
        let bytes: Vec<u8> = [1000i16, -1000, 1000, -1000]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        let frame = AudioFrame::from_pcm16(&bytes, SampleRate::Hz16000, 0);
        let amp = frame.mean_abs_amplitude();
        assert!((amp - 1000.0).abs() < 1.0, "got {amp}");
    }

    #[test]
    fn silence_has_zero_amplitude() {
        let frame = AudioFrame::silence(Duration::from_millis(500), SampleRate::Hz16000);
        assert_eq!(frame.samples.len(), 8000);
        assert_eq!(frame.mean_abs_amplitude(), 0.0);
    }
}
