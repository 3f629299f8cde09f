//! The processing graph
//!
//! Fixed topology, built once per engine lifetime:
//!
//! ```text
//! input tap -> [EQ wet: Low -> LowMid -> HighMid -> High]  \
//!           -> [EQ dry shunt]                               > crossfade
//!           -> [Comp wet: CompressorUnit | Comp dry shunt]  > crossfade
//!           -> output tap
//! ```
//!
//! Nothing is ever added or removed after `build`; only gains and filter
//! parameters move, every one of them through a `ParameterTarget`. That
//! removes the click-prone reconnect operations entirely: bypass is a
//! crossfade, not a topology change.
//!
//! Processing is chunked into render quanta. Smoothed parameters are pulled
//! at quantum boundaries; the tap and crossfade gains are additionally
//! ramped linearly across each quantum so even the boundary steps stay
//! inaudible.

mod band;
mod bypass;
mod compressor;

pub use band::{BandKind, FilterBand};
pub use bypass::BypassRouter;
pub use compressor::{CompressorUnit, DynamicsKernel, KNEE_DB};

use crate::context::RenderContext;
use crate::error::{AudioError, Result};
use crate::params::ParameterTarget;
use sculpt_core::{CompressorParams, EqGains, Stage};

/// Fixed band layout: (kind, frequency, Q)
const BAND_LAYOUT: [(BandKind, f32, f32); 4] = [
    (BandKind::LowShelf, 320.0, 0.71),
    (BandKind::Peaking, 1000.0, 1.4),
    (BandKind::Peaking, 3200.0, 1.4),
    (BandKind::HighShelf, 10000.0, 0.71),
];

/// Default render quantum in frames
pub const DEFAULT_QUANTUM_FRAMES: usize = 128;

/// Default smoothing time constant in seconds
pub const DEFAULT_SMOOTHING_SECS: f32 = 0.05;

/// Builder for the fixed processing chain.
///
/// `build` either returns a complete, fully-wired chain or an error; no
/// partially-initialized chain can be observed. Rebuilding for the same
/// engine is idempotent: the caller drops the previous chain wholesale and
/// replaces it.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    quantum_frames: usize,
    smoothing_time_constant_secs: f32,
    eq_gains: EqGains,
    compressor: CompressorParams,
}

impl GraphBuilder {
    /// Start from defaults: 128-frame quanta, 50 ms smoothing, flat EQ,
    /// default compressor.
    pub fn new() -> Self {
        Self {
            quantum_frames: DEFAULT_QUANTUM_FRAMES,
            smoothing_time_constant_secs: DEFAULT_SMOOTHING_SECS,
            eq_gains: EqGains::flat(),
            compressor: CompressorParams::default(),
        }
    }

    /// Override the render quantum size
    pub fn quantum_frames(mut self, frames: usize) -> Self {
        self.quantum_frames = frames;
        self
    }

    /// Override the smoothing time constant
    pub fn smoothing_time_constant(mut self, secs: f32) -> Self {
        self.smoothing_time_constant_secs = secs;
        self
    }

    /// Initial EQ gains
    pub fn eq_gains(mut self, gains: EqGains) -> Self {
        self.eq_gains = gains;
        self
    }

    /// Initial compressor parameters
    pub fn compressor(mut self, params: CompressorParams) -> Self {
        self.compressor = params;
        self
    }

    /// Construct the chain against a running render context.
    pub fn build(&self, context: &RenderContext) -> Result<ProcessingChain> {
        if !context.is_running() {
            return Err(AudioError::Graph(
                "render context is not running; resume it before building".into(),
            ));
        }
        if context.channels() != 2 {
            return Err(AudioError::Graph(format!(
                "processing chain is stereo; context has {} channels",
                context.channels()
            )));
        }
        if self.quantum_frames == 0 {
            return Err(AudioError::Graph("render quantum must be non-empty".into()));
        }

        let sample_rate = context.sample_rate() as f32;
        let tc = self.smoothing_time_constant_secs;
        let gains = self.eq_gains.clamped();

        // Any band failure abandons the whole build; nothing half-connected
        // survives.
        let mut bands = Vec::with_capacity(BAND_LAYOUT.len());
        for (kind, frequency, q) in BAND_LAYOUT {
            bands.push(FilterBand::new(kind, frequency, q, sample_rate, tc)?);
        }
        let mut bands: [FilterBand; 4] = bands
            .try_into()
            .map_err(|_| AudioError::Graph("band construction produced a partial set".into()))?;

        for (band, gain) in bands.iter_mut().zip(gains.as_array()) {
            band.snap_gain_db(gain, 0.0);
        }

        let scratch_len = self.quantum_frames * 2;
        Ok(ProcessingChain {
            sample_rate,
            quantum_frames: self.quantum_frames,
            input_gain: ParameterTarget::new(1.0, tc),
            output_gain: ParameterTarget::new(1.0, tc),
            bands,
            eq_bypass: BypassRouter::new(tc),
            compressor: CompressorUnit::new(sample_rate, tc, self.compressor),
            comp_bypass: BypassRouter::new(tc),
            dry: vec![0.0; scratch_len],
        })
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

trait EqGainsExt {
    fn as_array(&self) -> [f32; 4];
}

impl EqGainsExt for EqGains {
    fn as_array(&self) -> [f32; 4] {
        [self.low, self.low_mid, self.high_mid, self.high]
    }
}

/// The complete, immutable-topology processing chain.
pub struct ProcessingChain {
    sample_rate: f32,
    quantum_frames: usize,
    input_gain: ParameterTarget,
    output_gain: ParameterTarget,
    bands: [FilterBand; 4],
    eq_bypass: BypassRouter,
    compressor: CompressorUnit,
    comp_bypass: BypassRouter,
    /// Dry-path scratch, one quantum of interleaved stereo
    dry: Vec<f32>,
}

impl ProcessingChain {
    /// Process an interleaved stereo buffer in place, starting at chain
    /// time `at` (seconds on the render clock). The buffer is split into
    /// render quanta; parameters take effect at quantum boundaries.
    pub fn process(&mut self, buffer: &mut [f32], at: f64) {
        let quantum_samples = self.quantum_frames * 2;
        let mut offset = 0;
        while offset < buffer.len() {
            let end = (offset + quantum_samples).min(buffer.len());
            // Odd trailing samples (non-stereo remainder) are left untouched
            let end = offset + (end - offset) / 2 * 2;
            if end == offset {
                break;
            }
            let t0 = at + (offset / 2) as f64 / f64::from(self.sample_rate);
            let t1 = at + (end / 2) as f64 / f64::from(self.sample_rate);
            self.process_quantum(&mut buffer[offset..end], t0, t1);
            offset = end;
        }
    }

    fn process_quantum(&mut self, chunk: &mut [f32], t0: f64, t1: f64) {
        let n = chunk.len();

        // Input tap
        ramp_gain(chunk, self.input_gain.read(t0), self.input_gain.read(t1));

        // EQ stage: dry shunt is captured before the wet path filters
        self.dry[..n].copy_from_slice(chunk);
        for band in &mut self.bands {
            band.refresh(t0);
            band.process(chunk);
        }
        let (wet0, dry0) = self.eq_bypass.gains(t0);
        let (wet1, dry1) = self.eq_bypass.gains(t1);
        crossfade(chunk, &self.dry[..n], (wet0, wet1), (dry0, dry1));

        // Compressor stage
        self.dry[..n].copy_from_slice(chunk);
        self.compressor.refresh(t0);
        self.compressor.process(chunk);
        let (wet0, dry0) = self.comp_bypass.gains(t0);
        let (wet1, dry1) = self.comp_bypass.gains(t1);
        crossfade(chunk, &self.dry[..n], (wet0, wet1), (dry0, dry1));

        // Output tap
        ramp_gain(chunk, self.output_gain.read(t0), self.output_gain.read(t1));
    }

    /// Route new EQ gains to the band targets.
    pub fn set_eq_gains(&mut self, gains: EqGains, at: f64) {
        let gains = gains.clamped();
        for (band, gain) in self.bands.iter_mut().zip(gains.as_array()) {
            band.set_gain_db(gain, at);
        }
    }

    /// Route new compressor parameters to the unit targets.
    pub fn set_compressor_params(&mut self, params: CompressorParams, at: f64) {
        self.compressor.set_params(params, at);
    }

    /// Crossfade a stage between wet and dry.
    pub fn set_bypassed(&mut self, stage: Stage, bypassed: bool, at: f64) {
        match stage {
            Stage::Eq => self.eq_bypass.set_bypassed(bypassed, at),
            Stage::Compressor => self.comp_bypass.set_bypassed(bypassed, at),
        }
    }

    /// Smoothed master input gain target
    pub fn set_input_gain(&mut self, gain: f32, at: f64) {
        self.input_gain.set_target(gain.max(0.0), at);
    }

    /// Smoothed master output gain target (monitor volume lands here)
    pub fn set_output_gain(&mut self, gain: f32, at: f64) {
        self.output_gain.set_target(gain.max(0.0), at);
    }

    /// Jump every smoothed parameter to its target. Offline export renders
    /// with settled values so the output is deterministic.
    pub fn snap_to_targets(&mut self, at: f64) {
        self.input_gain.snap(self.input_gain.target(), at);
        self.output_gain.snap(self.output_gain.target(), at);
        for band in &mut self.bands {
            band.snap_gain_db(band.gain_target_db(), at);
        }
        self.compressor.snap_to_targets(at);
        self.eq_bypass.snap_to_targets(at);
        self.comp_bypass.snap_to_targets(at);
    }

    /// Clear all filter/detector state (seek, rewind), keeping parameters.
    pub fn reset(&mut self) {
        for band in &mut self.bands {
            band.reset();
        }
        self.compressor.reset();
    }

    /// The EQ stage's bypass router
    pub fn eq_bypass(&self) -> &BypassRouter {
        &self.eq_bypass
    }

    /// The compressor stage's bypass router
    pub fn compressor_bypass(&self) -> &BypassRouter {
        &self.comp_bypass
    }

    /// The four EQ bands in chain order
    pub fn bands(&self) -> &[FilterBand; 4] {
        &self.bands
    }

    /// The compressor unit
    pub fn compressor(&self) -> &CompressorUnit {
        &self.compressor
    }

    /// Render quantum size in frames
    pub fn quantum_frames(&self) -> usize {
        self.quantum_frames
    }
}

/// Apply a linearly ramped gain across an interleaved stereo chunk.
fn ramp_gain(chunk: &mut [f32], g0: f32, g1: f32) {
    if (g0 - 1.0).abs() < 1e-9 && (g1 - 1.0).abs() < 1e-9 {
        return;
    }
    let frames = chunk.len() / 2;
    if frames == 0 {
        return;
    }
    let step = (g1 - g0) / frames as f32;
    for (i, frame) in chunk.chunks_exact_mut(2).enumerate() {
        let g = g0 + step * i as f32;
        frame[0] *= g;
        frame[1] *= g;
    }
}

/// Blend the wet chunk (in place) with the dry shunt using per-frame
/// linearly ramped crossfade gains.
fn crossfade(wet: &mut [f32], dry: &[f32], wet_gains: (f32, f32), dry_gains: (f32, f32)) {
    let frames = wet.len() / 2;
    if frames == 0 {
        return;
    }
    // Fast path: stage fully engaged, nothing to blend
    if wet_gains == (1.0, 1.0) && dry_gains == (0.0, 0.0) {
        return;
    }
    let wet_step = (wet_gains.1 - wet_gains.0) / frames as f32;
    let dry_step = (dry_gains.1 - dry_gains.0) / frames as f32;
    for (i, (frame, dry_frame)) in wet
        .chunks_exact_mut(2)
        .zip(dry.chunks_exact(2))
        .enumerate()
    {
        let wg = wet_gains.0 + wet_step * i as f32;
        let dg = dry_gains.0 + dry_step * i as f32;
        frame[0] = frame[0] * wg + dry_frame[0] * dg;
        frame[1] = frame[1] * wg + dry_frame[1] * dg;
    }
}
