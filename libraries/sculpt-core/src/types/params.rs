/// User-facing processing parameters
///
/// These are the values collaborators hand to the engine. Each setter clamps
/// to the documented range so the processing graph never sees an
/// out-of-range target.
use serde::{Deserialize, Serialize};

/// Per-band equalizer gains in dB, each clamped to [-12, 12]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqGains {
    /// Low shelf band (320 Hz)
    pub low: f32,
    /// Low-mid peaking band (1 kHz)
    pub low_mid: f32,
    /// High-mid peaking band (3.2 kHz)
    pub high_mid: f32,
    /// High shelf band (10 kHz)
    pub high: f32,
}

/// Gain range for every EQ band, in dB
pub const EQ_GAIN_RANGE_DB: (f32, f32) = (-12.0, 12.0);

impl EqGains {
    /// All bands at 0 dB
    pub fn flat() -> Self {
        Self {
            low: 0.0,
            low_mid: 0.0,
            high_mid: 0.0,
            high: 0.0,
        }
    }

    /// Clamp every band into the supported gain range
    pub fn clamped(self) -> Self {
        let (lo, hi) = EQ_GAIN_RANGE_DB;
        Self {
            low: self.low.clamp(lo, hi),
            low_mid: self.low_mid.clamp(lo, hi),
            high_mid: self.high_mid.clamp(lo, hi),
            high: self.high.clamp(lo, hi),
        }
    }

    /// Replace the low band gain
    pub fn with_low(mut self, db: f32) -> Self {
        self.low = db;
        self
    }
}

impl Default for EqGains {
    fn default() -> Self {
        Self::flat()
    }
}

/// Compressor parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressorParams {
    /// Threshold in dB, clamped to [-60, 0]
    pub threshold_db: f32,

    /// Ratio, clamped to [1, 20]
    pub ratio: f32,

    /// Attack time in milliseconds, clamped to [0, 200]
    pub attack_ms: f32,

    /// Release time in milliseconds, clamped to [50, 1000]
    pub release_ms: f32,
}

impl CompressorParams {
    /// Clamp every field into its supported range
    pub fn clamped(self) -> Self {
        Self {
            threshold_db: self.threshold_db.clamp(-60.0, 0.0),
            ratio: self.ratio.clamp(1.0, 20.0),
            attack_ms: self.attack_ms.clamp(0.0, 200.0),
            release_ms: self.release_ms.clamp(50.0, 1000.0),
        }
    }
}

impl Default for CompressorParams {
    /// The initial UI state: -20 dB threshold, 4:1, 50 ms attack, 200 ms release
    fn default() -> Self {
        Self {
            threshold_db: -20.0,
            ratio: 4.0,
            attack_ms: 50.0,
            release_ms: 200.0,
        }
    }
}

/// A bypassable processing stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// The 4-band equalizer
    Eq,
    /// The dynamics compressor
    Compressor,
}

/// Export container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    /// 16-bit PCM WAV
    Wav,
    /// MP3 — not implemented; requests fail with an export error rather
    /// than returning WAV bytes under the wrong label
    Mp3,
}
