//! Dynamics compressor
//!
//! Two pieces: `DynamicsKernel`, the dynamics primitive (peak detection and
//! gain smoothing), and `CompressorUnit`, the typed wrapper that feeds the
//! kernel smoothed parameter values at render-quantum boundaries.
//!
//! The kernel uses a two-stage design:
//! 1. Peak level detection with instant attack and a slow fixed release, so
//!    the measured level holds across waveform cycles instead of pumping.
//! 2. Gain-reduction smoothing with the user-configured attack/release.

use crate::params::ParameterTarget;
use sculpt_core::CompressorParams;

/// Fixed soft-knee width in dB
pub const KNEE_DB: f32 = 12.0;

/// Peak detector release, independent of the user release setting
const PEAK_RELEASE_MS: f32 = 50.0;

/// Detector floor in dBFS
const NOISE_FLOOR_DB: f32 = -120.0;

/// The dynamics primitive: level detection, the static soft-knee transfer
/// curve, and attack/release gain smoothing over linked stereo.
#[derive(Debug, Clone)]
pub struct DynamicsKernel {
    threshold_db: f32,
    ratio: f32,
    attack_ms: f32,
    release_ms: f32,
    knee_db: f32,

    peak_level_db: f32,
    gain_reduction_db: f32,

    peak_release_coeff: f32,
    attack_coeff: f32,
    release_coeff: f32,

    sample_rate: f32,
}

impl DynamicsKernel {
    /// Create a kernel with the given settings.
    pub fn new(sample_rate: f32, params: CompressorParams) -> Self {
        let params = params.clamped();
        let mut kernel = Self {
            threshold_db: params.threshold_db,
            ratio: params.ratio,
            attack_ms: params.attack_ms,
            release_ms: params.release_ms,
            knee_db: KNEE_DB,
            peak_level_db: NOISE_FLOOR_DB,
            gain_reduction_db: 0.0,
            peak_release_coeff: 0.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            sample_rate,
        };
        kernel.update_coefficients();
        kernel
    }

    /// Replace the settings, recomputing the coefficient cache when the
    /// timing values moved.
    pub fn set_params(&mut self, params: CompressorParams) {
        let params = params.clamped();
        let timing_changed =
            params.attack_ms != self.attack_ms || params.release_ms != self.release_ms;
        self.threshold_db = params.threshold_db;
        self.ratio = params.ratio;
        self.attack_ms = params.attack_ms;
        self.release_ms = params.release_ms;
        if timing_changed || self.peak_release_coeff == 0.0 {
            self.update_coefficients();
        }
    }

    fn update_coefficients(&mut self) {
        let sr = self.sample_rate;

        // coeff = exp(-1 / (time_ms * sample_rate / 1000)); an attack of
        // zero divides to infinity and exp(-inf) == 0, i.e. instant.
        let peak_release_samples = PEAK_RELEASE_MS * sr / 1000.0;
        self.peak_release_coeff = (-1.0 / peak_release_samples).exp();

        let attack_samples = self.attack_ms * sr / 1000.0;
        let release_samples = self.release_ms * sr / 1000.0;
        self.attack_coeff = (-1.0 / attack_samples).exp();
        self.release_coeff = (-1.0 / release_samples).exp();
    }

    /// Output level in dB for an input level in dB, per the soft-knee
    /// transfer curve.
    #[inline]
    fn transfer(&self, input_db: f32) -> f32 {
        let half_knee = self.knee_db / 2.0;
        let knee_start = self.threshold_db - half_knee;
        let knee_end = self.threshold_db + half_knee;

        if input_db <= knee_start {
            input_db
        } else if input_db >= knee_end {
            self.threshold_db + (input_db - self.threshold_db) / self.ratio
        } else {
            // Quadratic interpolation across the knee
            let x = input_db - knee_start;
            let slope_change = (1.0 - 1.0 / self.ratio) / (2.0 * self.knee_db);
            input_db - slope_change * x * x
        }
    }

    /// Static gain reduction in dB for an input level (negative = reduce).
    #[inline]
    pub fn static_gain_reduction_db(&self, input_db: f32) -> f32 {
        self.transfer(input_db) - input_db
    }

    /// Instant-attack, slow-release peak tracking. Decays toward the noise
    /// floor rather than the input, which can be -inf at zero crossings.
    #[inline]
    fn track_peak(&mut self, input_db: f32) {
        if input_db > self.peak_level_db {
            self.peak_level_db = input_db;
        } else {
            self.peak_level_db =
                self.peak_release_coeff * (self.peak_level_db - NOISE_FLOOR_DB) + NOISE_FLOOR_DB;
        }
    }

    /// Process an interleaved stereo buffer in place with linked-stereo
    /// detection (louder channel drives both).
    pub fn process(&mut self, buffer: &mut [f32]) {
        for frame in buffer.chunks_exact_mut(2) {
            let level = frame[0].abs().max(frame[1].abs());
            let input_db = if level > 1e-10 {
                20.0 * level.log10()
            } else {
                -200.0
            };

            self.track_peak(input_db);

            let target_gr = self.static_gain_reduction_db(self.peak_level_db);

            // More negative target = attacking, less negative = releasing
            let coeff = if target_gr < self.gain_reduction_db {
                self.attack_coeff
            } else {
                self.release_coeff
            };
            self.gain_reduction_db = coeff * self.gain_reduction_db + (1.0 - coeff) * target_gr;

            let gain = 10.0f32.powf(self.gain_reduction_db / 20.0);
            frame[0] *= gain;
            frame[1] *= gain;
        }
    }

    /// Current smoothed gain reduction in dB (negative while compressing);
    /// drives the gain-reduction meter.
    pub fn gain_reduction_db(&self) -> f32 {
        self.gain_reduction_db
    }

    /// Clear detector and gain state (seek/rewind).
    pub fn reset(&mut self) {
        self.peak_level_db = NOISE_FLOOR_DB;
        self.gain_reduction_db = 0.0;
    }
}

/// Compressor stage of the processing chain.
///
/// Every parameter is a `ParameterTarget`; the kernel sees the smoothed
/// values once per render quantum, so external changes never step the
/// transfer curve mid-signal.
#[derive(Debug, Clone)]
pub struct CompressorUnit {
    threshold_db: ParameterTarget,
    ratio: ParameterTarget,
    attack_ms: ParameterTarget,
    release_ms: ParameterTarget,
    kernel: DynamicsKernel,
}

impl CompressorUnit {
    /// Create the unit settled at the given parameters.
    pub fn new(
        sample_rate: f32,
        smoothing_time_constant_secs: f32,
        params: CompressorParams,
    ) -> Self {
        let params = params.clamped();
        let tc = smoothing_time_constant_secs;
        Self {
            threshold_db: ParameterTarget::new(params.threshold_db, tc),
            ratio: ParameterTarget::new(params.ratio, tc),
            attack_ms: ParameterTarget::new(params.attack_ms, tc),
            release_ms: ParameterTarget::new(params.release_ms, tc),
            kernel: DynamicsKernel::new(sample_rate, params),
        }
    }

    /// Schedule smoothed parameter changes.
    pub fn set_params(&mut self, params: CompressorParams, at: f64) {
        let params = params.clamped();
        self.threshold_db.set_target(params.threshold_db, at);
        self.ratio.set_target(params.ratio, at);
        self.attack_ms.set_target(params.attack_ms, at);
        self.release_ms.set_target(params.release_ms, at);
    }

    /// Jump all parameters to their targets (offline export only).
    pub fn snap_to_targets(&mut self, at: f64) {
        self.threshold_db.snap(self.threshold_db.target(), at);
        self.ratio.snap(self.ratio.target(), at);
        self.attack_ms.snap(self.attack_ms.target(), at);
        self.release_ms.snap(self.release_ms.target(), at);
    }

    /// Feed the kernel the smoothed values at a quantum boundary.
    pub fn refresh(&mut self, at: f64) {
        self.kernel.set_params(CompressorParams {
            threshold_db: self.threshold_db.read(at),
            ratio: self.ratio.read(at),
            attack_ms: self.attack_ms.read(at),
            release_ms: self.release_ms.read(at),
        });
    }

    /// Compress an interleaved stereo buffer in place.
    pub fn process(&mut self, buffer: &mut [f32]) {
        self.kernel.process(buffer);
    }

    /// Clear kernel state (seek/rewind).
    pub fn reset(&mut self) {
        self.kernel.reset();
    }

    /// The parameter targets as a `CompressorParams`
    pub fn target_params(&self) -> CompressorParams {
        CompressorParams {
            threshold_db: self.threshold_db.target(),
            ratio: self.ratio.target(),
            attack_ms: self.attack_ms.target(),
            release_ms: self.release_ms.target(),
        }
    }

    /// Current gain reduction in dB for metering
    pub fn gain_reduction_db(&self) -> f32 {
        self.kernel.gain_reduction_db()
    }

    /// The dynamics primitive, for transfer-curve readouts
    pub fn kernel(&self) -> &DynamicsKernel {
        &self.kernel
    }
}
