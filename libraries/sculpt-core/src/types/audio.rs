/// Audio-related types
use serde::{Deserialize, Serialize};

/// Sample rate in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleRate(pub u32);

impl SampleRate {
    /// CD quality, 44.1 kHz
    pub const CD_QUALITY: Self = Self(44_100);
    /// DVD quality, 48 kHz
    pub const DVD_QUALITY: Self = Self(48_000);

    /// Create a new sample rate
    #[must_use]
    pub fn new(hz: u32) -> Self {
        Self(hz)
    }

    /// Get the sample rate as Hz
    pub fn as_hz(&self) -> u32 {
        self.0
    }
}

/// Audio format information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Sample rate
    pub sample_rate: SampleRate,

    /// Number of channels (1 = mono, 2 = stereo, etc.)
    pub channels: u16,

    /// Bits per sample
    pub bits_per_sample: u16,
}

impl AudioFormat {
    /// Create a new audio format
    pub fn new(sample_rate: SampleRate, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    /// Stereo 32-bit float at the given rate, the decoder's output format
    pub fn stereo_float(sample_rate: SampleRate) -> Self {
        Self::new(sample_rate, 2, 32)
    }

    /// Calculate the byte rate (bytes per second) for integer PCM formats
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate.as_hz() * u32::from(self.channels) * u32::from(self.bits_per_sample) / 8
    }
}

/// Decoded audio buffer
///
/// Samples are stored as f32 in the range [-1.0, 1.0], interleaved:
/// [L, R, L, R, ...] for stereo. The buffer is immutable once decoded; the
/// playback layer shares it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Audio samples (f32, interleaved)
    pub samples: Vec<f32>,

    /// Audio format information
    pub format: AudioFormat,
}

impl AudioBuffer {
    /// Create a new audio buffer
    pub fn new(samples: Vec<f32>, format: AudioFormat) -> Self {
        Self { samples, format }
    }

    /// Get the number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.format.channels == 0 {
            return 0;
        }
        self.samples.len() / self.format.channels as usize
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.format.sample_rate.as_hz() == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.format.sample_rate.as_hz())
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get the length in samples (all channels)
    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rate_common_values() {
        assert_eq!(SampleRate::CD_QUALITY.as_hz(), 44_100);
        assert_eq!(SampleRate::DVD_QUALITY.as_hz(), 48_000);
    }

    #[test]
    fn audio_format_byte_rate() {
        let format = AudioFormat::new(SampleRate::DVD_QUALITY, 2, 16);
        // 48000 Hz * 2 channels * 16 bits / 8 = 192,000 bytes/sec
        assert_eq!(format.byte_rate(), 192_000);
    }

    #[test]
    fn audio_buffer_frames_calculation() {
        let format = AudioFormat::stereo_float(SampleRate::CD_QUALITY);
        // 8 samples with 2 channels = 4 frames
        let buffer = AudioBuffer::new(vec![0.0; 8], format);
        assert_eq!(buffer.frames(), 4);
    }

    #[test]
    fn audio_buffer_duration() {
        let format = AudioFormat::stereo_float(SampleRate::new(44_100));
        // 88200 samples with 2 channels = 44100 frames = 1 second
        let buffer = AudioBuffer::new(vec![0.0; 88_200], format);
        assert!((buffer.duration_secs() - 1.0).abs() < 0.01);
    }

    #[test]
    fn zero_channel_buffer_is_safe() {
        let format = AudioFormat::new(SampleRate::new(44_100), 0, 32);
        let buffer = AudioBuffer::new(vec![], format);
        assert_eq!(buffer.frames(), 0);
        assert_eq!(buffer.duration_secs(), 0.0);
    }
}
