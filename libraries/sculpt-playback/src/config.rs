//! Engine configuration

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the audio engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Render sample rate in Hz until a file is loaded; the engine adopts
    /// the decoded buffer's rate on load (default: 44100)
    pub sample_rate: u32,

    /// Output channel count; the processing chain is stereo (default: 2)
    pub channels: u16,

    /// Render quantum in frames (default: 128)
    pub quantum_frames: usize,

    /// Parameter smoothing time constant in seconds (default: 0.05,
    /// supported range 0.01 to 0.05)
    pub smoothing_time_constant_secs: f32,

    /// Analysis tap FFT size, power of two (default: 2048)
    pub analysis_fft_size: usize,

    /// Initial monitor volume (0-100, default: 80)
    pub volume: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 2,
            quantum_frames: 128,
            smoothing_time_constant_secs: 0.05,
            analysis_fft_size: 2048,
            volume: 80,
        }
    }
}

impl EngineConfig {
    /// Validate the configuration before engine construction.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(PlaybackError::InvalidConfig(
                "sample rate must be non-zero".into(),
            ));
        }
        if self.channels != 2 {
            return Err(PlaybackError::InvalidConfig(format!(
                "processing chain is stereo; got {} channels",
                self.channels
            )));
        }
        if self.quantum_frames == 0 {
            return Err(PlaybackError::InvalidConfig(
                "render quantum must be non-empty".into(),
            ));
        }
        if !(0.001..=1.0).contains(&self.smoothing_time_constant_secs) {
            return Err(PlaybackError::InvalidConfig(format!(
                "smoothing time constant {} s out of range",
                self.smoothing_time_constant_secs
            )));
        }
        if !self.analysis_fft_size.is_power_of_two() || self.analysis_fft_size < 32 {
            return Err(PlaybackError::InvalidConfig(format!(
                "analysis FFT size must be a power of two >= 32, got {}",
                self.analysis_fft_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.sample_rate = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.channels = 1;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.analysis_fft_size = 1000;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.smoothing_time_constant_secs = 2.0;
        assert!(config.validate().is_err());
    }
}
