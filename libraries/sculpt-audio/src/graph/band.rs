//! Equalizer filter band
//!
//! A typed wrapper around the `biquad` crate's shelf/peaking filters. The
//! band's frequency and Q are fixed at construction; only the gain moves at
//! runtime, and it moves through a `ParameterTarget` so coefficient updates
//! follow a smoothed value at render-quantum boundaries instead of stepping.

use biquad::{Biquad, Coefficients, DirectForm1, ToHertz, Type};

use crate::error::{AudioError, Result};
use crate::params::ParameterTarget;
use sculpt_core::types::EQ_GAIN_RANGE_DB;

/// Filter response shape of a band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandKind {
    /// Flat boost/cut below the corner frequency
    LowShelf,
    /// Boost/cut centered on the frequency, width set by Q
    Peaking,
    /// Flat boost/cut above the corner frequency
    HighShelf,
}

/// One EQ band: fixed frequency/Q, smoothed runtime gain, per-channel
/// stereo filter state.
#[derive(Debug, Clone)]
pub struct FilterBand {
    kind: BandKind,
    frequency_hz: f32,
    q: f32,
    gain_db: ParameterTarget,
    /// Gain the active coefficients were computed from
    applied_gain_db: f32,
    left: DirectForm1<f32>,
    right: DirectForm1<f32>,
    sample_rate: f32,
}

/// Gain changes smaller than this do not trigger a coefficient recompute
const GAIN_EPSILON_DB: f32 = 1e-3;

impl FilterBand {
    /// Build a band at unity gain.
    ///
    /// Fails when the frequency/Q pair is rejected by the filter primitive
    /// (above Nyquist, non-positive Q); nothing is retained on failure.
    pub fn new(
        kind: BandKind,
        frequency_hz: f32,
        q: f32,
        sample_rate: f32,
        smoothing_time_constant_secs: f32,
    ) -> Result<Self> {
        let coefficients = Self::coefficients(kind, frequency_hz, q, 0.0, sample_rate)?;
        Ok(Self {
            kind,
            frequency_hz,
            q,
            gain_db: ParameterTarget::new(0.0, smoothing_time_constant_secs),
            applied_gain_db: 0.0,
            left: DirectForm1::<f32>::new(coefficients),
            right: DirectForm1::<f32>::new(coefficients),
            sample_rate,
        })
    }

    fn coefficients(
        kind: BandKind,
        frequency_hz: f32,
        q: f32,
        gain_db: f32,
        sample_rate: f32,
    ) -> Result<Coefficients<f32>> {
        let filter = match kind {
            BandKind::LowShelf => Type::LowShelf(gain_db),
            BandKind::Peaking => Type::PeakingEQ(gain_db),
            BandKind::HighShelf => Type::HighShelf(gain_db),
        };
        Coefficients::<f32>::from_params(filter, sample_rate.hz(), frequency_hz.hz(), q)
            .map_err(|e| AudioError::Graph(format!("band coefficients rejected: {e:?}")))
    }

    /// Schedule a smoothed gain change, clamped to the supported range.
    pub fn set_gain_db(&mut self, gain_db: f32, at: f64) {
        let (lo, hi) = EQ_GAIN_RANGE_DB;
        self.gain_db.set_target(gain_db.clamp(lo, hi), at);
    }

    /// Jump the gain immediately (offline export only).
    pub fn snap_gain_db(&mut self, gain_db: f32, at: f64) {
        let (lo, hi) = EQ_GAIN_RANGE_DB;
        self.gain_db.snap(gain_db.clamp(lo, hi), at);
    }

    /// Pull the smoothed gain at a quantum boundary and refresh the filter
    /// coefficients if it moved.
    pub fn refresh(&mut self, at: f64) {
        let gain = self.gain_db.read(at);
        if (gain - self.applied_gain_db).abs() < GAIN_EPSILON_DB {
            return;
        }
        // The frequency/Q pair was validated at construction and gain never
        // invalidates it, so a recompute failure here cannot occur; keep the
        // previous coefficients if it somehow does.
        if let Ok(coefficients) =
            Self::coefficients(self.kind, self.frequency_hz, self.q, gain, self.sample_rate)
        {
            self.left.update_coefficients(coefficients);
            self.right.update_coefficients(coefficients);
            self.applied_gain_db = gain;
        }
    }

    /// Filter an interleaved stereo buffer in place.
    pub fn process(&mut self, buffer: &mut [f32]) {
        for frame in buffer.chunks_exact_mut(2) {
            frame[0] = self.left.run(frame[0]);
            frame[1] = self.right.run(frame[1]);
        }
    }

    /// Clear filter memory (seek/rewind), keeping coefficients.
    pub fn reset(&mut self) {
        self.left.reset_state();
        self.right.reset_state();
    }

    /// Response shape
    pub fn kind(&self) -> BandKind {
        self.kind
    }

    /// Fixed center/corner frequency in Hz
    pub fn frequency_hz(&self) -> f32 {
        self.frequency_hz
    }

    /// Fixed Q factor
    pub fn q(&self) -> f32 {
        self.q
    }

    /// The gain target in dB
    pub fn gain_target_db(&self) -> f32 {
        self.gain_db.target()
    }

    /// The smoothed gain at time `at`
    pub fn gain_db(&self, at: f64) -> f32 {
        self.gain_db.read(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn low_shelf() -> FilterBand {
        FilterBand::new(BandKind::LowShelf, 320.0, 0.71, 48_000.0, 0.05).unwrap()
    }

    #[test]
    fn build_rejects_frequency_above_nyquist() {
        let result = FilterBand::new(BandKind::Peaking, 30_000.0, 1.4, 48_000.0, 0.05);
        assert!(matches!(result, Err(AudioError::Graph(_))));
    }

    #[test]
    fn gain_is_clamped_to_range() {
        let mut band = low_shelf();
        band.set_gain_db(40.0, 0.0);
        assert_eq!(band.gain_target_db(), 12.0);

        band.set_gain_db(-40.0, 1.0);
        assert_eq!(band.gain_target_db(), -12.0);
    }

    #[test]
    fn unity_band_passes_signal_through() {
        let mut band = low_shelf();
        let mut buffer: Vec<f32> = (0..512).map(|i| (i as f32 * 0.01).sin() * 0.5).collect();
        let original = buffer.clone();

        band.refresh(0.0);
        band.process(&mut buffer);

        for (out, input) in buffer.iter().zip(original.iter()) {
            assert!((out - input).abs() < 1e-4, "unity shelf altered the signal");
        }
    }

    #[test]
    fn boosted_low_shelf_amplifies_low_frequencies() {
        let mut band = low_shelf();
        band.snap_gain_db(6.0, 0.0);
        band.refresh(0.0);

        // 50 Hz tone, well below the 320 Hz corner
        let sample_rate = 48_000.0f32;
        let mut buffer = Vec::with_capacity(9600 * 2);
        for i in 0..9600 {
            let s = (2.0 * std::f32::consts::PI * 50.0 * i as f32 / sample_rate).sin() * 0.25;
            buffer.push(s);
            buffer.push(s);
        }

        band.process(&mut buffer);

        // Skip the transient, then expect close to +6 dB (factor ~2)
        let peak = buffer[4800..]
            .iter()
            .fold(0.0f32, |acc, s| acc.max(s.abs()));
        assert!(peak > 0.4, "expected ~2x boost, peak {peak}");
    }

    #[test]
    fn refresh_tracks_smoothed_gain() {
        let mut band = low_shelf();
        band.set_gain_db(12.0, 0.0);

        // Right after the change the applied gain is still near zero
        band.refresh(0.001);
        let early = band.gain_db(0.001);
        assert!(early < 3.0);

        // After 6 time constants it has settled
        band.refresh(0.3);
        assert!((band.gain_db(0.3) - 12.0).abs() < 0.05);
    }
}
