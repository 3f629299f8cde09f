//! Monitor volume with logarithmic scaling
//!
//! Human-perceptual volume control: 0-100 % maps to -60 dB .. 0 dB. The
//! computed gain lands on the chain's smoothed output tap, so level changes
//! ramp instead of stepping. Monitor volume never affects export.

/// Volume controller with logarithmic scaling
#[derive(Debug, Clone)]
pub struct Volume {
    /// Volume level (0-100)
    level: u8,

    /// Mute state (preserves the level)
    muted: bool,

    /// Cached linear gain multiplier
    linear_gain: f32,
}

impl Volume {
    /// Create a volume controller at `level` (clamped to 0-100)
    pub fn new(level: u8) -> Self {
        let level = level.min(100);
        Self {
            level,
            muted: false,
            linear_gain: Self::linear_gain_for(level),
        }
    }

    /// Set the level (clamped to 0-100)
    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(100);
        self.linear_gain = Self::linear_gain_for(self.level);
    }

    /// Current level (0-100)
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Mute, preserving the level
    pub fn mute(&mut self) {
        self.muted = true;
    }

    /// Unmute, restoring the previous level
    pub fn unmute(&mut self) {
        self.muted = false;
    }

    /// Whether muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Linear gain for the output tap: 0.0 when muted, otherwise the
    /// logarithmic mapping of the level
    pub fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.linear_gain
        }
    }

    /// Map 0-100 % onto -60 dB .. 0 dB and convert to linear gain
    fn linear_gain_for(level: u8) -> f32 {
        if level == 0 {
            return 0.0;
        }
        let db = (f32::from(level) - 100.0) * 0.6;
        10.0f32.powf(db / 20.0)
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(80)
    }
}
