//! Engine composition root
//!
//! `AudioEngine` owns everything: the render context, the processing chain,
//! the analysis tap, the transport, and the decoded buffer. External
//! collaborators (the UI layer) never touch those parts directly; every
//! mutation goes through the engine's command methods, and `&mut self` makes
//! the single-in-flight rule for decode/export a compile-time fact.
//!
//! Two clocks are in play and deliberately kept apart: graph parameters are
//! stamped with the render clock (`RenderContext::current_time`), so changes
//! land at quantum boundaries; the transport position tracks the caller's
//! monotonic wall clock, which keeps the displayed position honest when the
//! render callback stalls.

use std::sync::Arc;

use sculpt_audio::{
    Analyser, GraphBuilder, ProcessingChain, RenderContext, SymphoniaDecoder, WavEncoder,
};
use sculpt_core::{
    AudioBuffer, CompressorParams, EqGains, ExportFormat, Result, SculptError, Stage,
};

use crate::config::EngineConfig;
use crate::transport::{TransportController, TransportEvent, TransportState};
use crate::volume::Volume;

/// The audio engine.
pub struct AudioEngine {
    config: EngineConfig,
    context: RenderContext,
    chain: ProcessingChain,
    analyser: Analyser,
    transport: TransportController,
    buffer: Option<Arc<AudioBuffer>>,

    // Last requested parameter state, reapplied on rebuild and export
    eq_gains: EqGains,
    compressor_params: CompressorParams,
    eq_bypassed: bool,
    comp_bypassed: bool,
    volume: Volume,
}

impl AudioEngine {
    /// Construct the engine: context, chain, and analysis tap.
    ///
    /// Fails with a context error for an unusable configuration and a graph
    /// error when the chain cannot be built; no partial engine escapes.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate().map_err(SculptError::from)?;

        let mut context =
            RenderContext::new(config.sample_rate, config.channels, config.quantum_frames)
                .map_err(SculptError::from)?;
        context.resume().map_err(SculptError::from)?;

        let eq_gains = EqGains::flat();
        let compressor_params = CompressorParams::default();
        let volume = Volume::new(config.volume);

        let mut chain = GraphBuilder::new()
            .quantum_frames(config.quantum_frames)
            .smoothing_time_constant(config.smoothing_time_constant_secs)
            .eq_gains(eq_gains)
            .compressor(compressor_params)
            .build(&context)
            .map_err(SculptError::from)?;
        chain.set_output_gain(volume.gain(), 0.0);
        chain.snap_to_targets(0.0);

        let analyser = Analyser::new(config.analysis_fft_size, config.sample_rate)
            .map_err(SculptError::from)?;

        Ok(Self {
            config,
            context,
            chain,
            analyser,
            transport: TransportController::new(),
            buffer: None,
            eq_gains,
            compressor_params,
            eq_bypassed: false,
            comp_bypassed: false,
            volume,
        })
    }

    /// Attempt one resume of a suspended context before an operation that
    /// needs it; a closed context fails here.
    fn ensure_running(&mut self) -> Result<()> {
        if !self.context.is_running() {
            tracing::debug!("render context suspended; attempting resume");
            self.context.resume().map_err(SculptError::from)?;
        }
        Ok(())
    }

    fn graph_builder(&self) -> GraphBuilder {
        GraphBuilder::new()
            .quantum_frames(self.config.quantum_frames)
            .smoothing_time_constant(self.config.smoothing_time_constant_secs)
            .eq_gains(self.eq_gains)
            .compressor(self.compressor_params)
    }

    /// Apply the remembered bypass flags and volume to a fresh chain and
    /// settle every parameter.
    fn prime_chain(&self, chain: &mut ProcessingChain) {
        chain.set_bypassed(Stage::Eq, self.eq_bypassed, 0.0);
        chain.set_bypassed(Stage::Compressor, self.comp_bypassed, 0.0);
        chain.set_output_gain(self.volume.gain(), 0.0);
        chain.snap_to_targets(0.0);
    }

    /// Decode an audio container and make it the playback buffer.
    ///
    /// The engine adopts the decoded sample rate: context and chain are
    /// rebuilt against it (the previous set is discarded wholesale, so a
    /// rebuild is idempotent). Returns the duration in seconds. On any
    /// failure the engine keeps its previous buffer, context, and chain.
    pub fn load_file(&mut self, bytes: Vec<u8>) -> Result<f64> {
        self.ensure_running()?;

        let decoded = SymphoniaDecoder::new()
            .decode_bytes(bytes)
            .map_err(SculptError::from)?;
        let buffer = Arc::new(decoded);
        let duration = buffer.duration_secs();

        // Build the replacement world completely before committing any of it
        let mut context = RenderContext::new(
            buffer.format.sample_rate.as_hz(),
            self.config.channels,
            self.config.quantum_frames,
        )
        .map_err(SculptError::from)?;
        context.resume().map_err(SculptError::from)?;

        let mut chain = self
            .graph_builder()
            .build(&context)
            .map_err(SculptError::from)?;
        self.prime_chain(&mut chain);

        let analyser = Analyser::new(
            self.config.analysis_fft_size,
            buffer.format.sample_rate.as_hz(),
        )
        .map_err(SculptError::from)?;

        tracing::debug!(
            duration_secs = duration,
            sample_rate = buffer.format.sample_rate.as_hz(),
            "loaded audio buffer"
        );

        self.context = context;
        self.chain = chain;
        self.analyser = analyser;
        self.transport.set_buffer(Arc::clone(&buffer));
        self.buffer = Some(buffer);

        Ok(duration)
    }

    /// Start playback at `from_secs` with the given loop flag. `now` is the
    /// caller's monotonic wall clock in seconds.
    pub fn play(&mut self, from_secs: f64, looping: bool, now: f64) -> Result<()> {
        self.ensure_running()?;
        tracing::debug!(from_secs, looping, "play");
        self.transport
            .play(from_secs, looping, now)
            .map_err(SculptError::from)
    }

    /// Stop playback and freeze the position. Idempotent.
    pub fn stop(&mut self) {
        tracing::debug!("stop");
        self.transport.stop();
    }

    /// Seek to `t` seconds.
    pub fn seek(&mut self, t: f64, now: f64) -> Result<()> {
        tracing::debug!(t, "seek");
        self.transport.seek(t, now).map_err(SculptError::from)
    }

    /// Position poll tick; call once per display refresh while interested
    /// in the position. Handles end-of-buffer and loop wrap.
    pub fn tick(&mut self, now: f64) -> TransportState {
        self.transport.tick(now)
    }

    /// Route new EQ gains (clamped to ±12 dB) to the band targets.
    pub fn set_eq_gains(&mut self, gains: EqGains) {
        let gains = gains.clamped();
        self.eq_gains = gains;
        self.chain.set_eq_gains(gains, self.context.current_time());
    }

    /// Route new compressor parameters (range-clamped) to the unit targets.
    pub fn set_compressor_params(&mut self, params: CompressorParams) {
        let params = params.clamped();
        self.compressor_params = params;
        self.chain
            .set_compressor_params(params, self.context.current_time());
    }

    /// Crossfade a stage between wet and dry.
    pub fn set_bypassed(&mut self, stage: Stage, bypassed: bool) {
        match stage {
            Stage::Eq => self.eq_bypassed = bypassed,
            Stage::Compressor => self.comp_bypassed = bypassed,
        }
        self.chain
            .set_bypassed(stage, bypassed, self.context.current_time());
    }

    /// Set monitor volume (0-100). Lands on the smoothed output tap.
    pub fn set_volume(&mut self, level: u8) {
        self.volume.set_level(level);
        self.chain
            .set_output_gain(self.volume.gain(), self.context.current_time());
    }

    /// Mute the monitor output, preserving the level.
    pub fn mute(&mut self) {
        self.volume.mute();
        self.chain
            .set_output_gain(self.volume.gain(), self.context.current_time());
    }

    /// Unmute the monitor output.
    pub fn unmute(&mut self) {
        self.volume.unmute();
        self.chain
            .set_output_gain(self.volume.gain(), self.context.current_time());
    }

    /// The analysis tap for spectrum/level readouts.
    pub fn analysis(&self) -> &Analyser {
        &self.analyser
    }

    /// Current compressor gain reduction in dB, for metering.
    pub fn gain_reduction_db(&self) -> f32 {
        self.chain.compressor().gain_reduction_db()
    }

    /// Render-domain entry point: fill `out` (interleaved stereo) with the
    /// next quantum of processed audio. Never blocks and never fails; a
    /// stopped transport renders silence through the chain so smoothing
    /// keeps progressing.
    pub fn render(&mut self, out: &mut [f32]) {
        if !self.context.is_running() {
            out.fill(0.0);
            return;
        }

        let at = self.context.current_time();
        let written = self.transport.render(out);
        out[written..].fill(0.0);

        self.chain.process(out, at);
        self.analyser.push_interleaved(out, self.config.channels);
        self.context.advance((out.len() / 2) as u64);
    }

    /// Export the loaded buffer through an identical offline chain.
    ///
    /// Parameters are snapped to their targets first, so the output
    /// reflects the settled values of the last edits and is deterministic.
    /// Monitor volume is a listening control and is not applied.
    pub fn export_processed(&mut self, format: ExportFormat) -> Result<Vec<u8>> {
        match format {
            ExportFormat::Mp3 => Err(SculptError::export(
                "mp3 export requires an external encoder; use wav",
            )),
            ExportFormat::Wav => {
                let buffer = self
                    .buffer
                    .as_ref()
                    .ok_or_else(|| SculptError::export("no audio loaded"))?;
                let sample_rate = buffer.format.sample_rate.as_hz();

                let context = RenderContext::offline(
                    sample_rate,
                    self.config.channels,
                    self.config.quantum_frames,
                )
                .map_err(SculptError::from)?;

                let mut chain = self
                    .graph_builder()
                    .build(&context)
                    .map_err(SculptError::from)?;
                chain.set_bypassed(Stage::Eq, self.eq_bypassed, 0.0);
                chain.set_bypassed(Stage::Compressor, self.comp_bypassed, 0.0);
                chain.snap_to_targets(0.0);

                let mut samples = buffer.samples.clone();
                chain.process(&mut samples, 0.0);

                tracing::debug!(samples = samples.len(), sample_rate, "exporting wav");
                WavEncoder::encode(&samples, sample_rate, buffer.format.channels)
                    .map_err(SculptError::from)
            }
        }
    }

    /// Drain transport events for UI synchronization.
    pub fn drain_events(&mut self) -> Vec<TransportEvent> {
        self.transport.drain_events()
    }

    /// Current transport state
    pub fn state(&self) -> TransportState {
        self.transport.state()
    }

    /// Current playback position in seconds
    pub fn position_secs(&self) -> f64 {
        self.transport.position_secs()
    }

    /// Duration of the loaded buffer in seconds (0 when none)
    pub fn duration_secs(&self) -> f64 {
        self.transport.duration_secs()
    }

    /// Whether loop-at-end is enabled
    pub fn is_looping(&self) -> bool {
        self.transport.is_looping()
    }

    /// The engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The processing chain (parameter/bypass readouts)
    pub fn chain(&self) -> &ProcessingChain {
        &self.chain
    }

    /// The render context (clock and lifecycle readouts)
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Monitor volume level (0-100)
    pub fn volume(&self) -> u8 {
        self.volume.level()
    }

    /// Tear the engine down; subsequent operations needing the context fail.
    pub fn close(&mut self) {
        self.transport.stop();
        self.context.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sculpt_audio::ContextState;

    fn engine() -> AudioEngine {
        AudioEngine::new(EngineConfig::default()).unwrap()
    }

    /// One second of a quiet 220 Hz stereo tone as WAV bytes
    fn tone_wav(sample_rate: u32) -> Vec<u8> {
        let frames = sample_rate as usize;
        let mut samples = Vec::with_capacity(frames * 2);
        for i in 0..frames {
            let s = (2.0 * std::f32::consts::PI * 220.0 * i as f32 / sample_rate as f32).sin()
                * 0.01;
            samples.push(s);
            samples.push(s);
        }
        WavEncoder::encode(&samples, sample_rate, 2).unwrap()
    }

    #[test]
    fn new_engine_is_stopped_and_running() {
        let engine = engine();
        assert_eq!(engine.state(), TransportState::Stopped);
        assert!(engine.context().is_running());
        assert_eq!(engine.duration_secs(), 0.0);
    }

    #[test]
    fn load_adopts_buffer_sample_rate() {
        let mut engine = engine();
        assert_eq!(engine.context().sample_rate(), 44_100);

        let duration = engine.load_file(tone_wav(48_000)).unwrap();
        assert!((duration - 1.0).abs() < 1e-3);
        assert_eq!(engine.context().sample_rate(), 48_000);
    }

    #[test]
    fn load_failure_keeps_previous_state() {
        let mut engine = engine();
        engine.load_file(tone_wav(48_000)).unwrap();

        let result = engine.load_file(vec![0xFF; 64]);
        assert!(matches!(result, Err(SculptError::Decode(_))));

        // Previous buffer and context survive
        assert!((engine.duration_secs() - 1.0).abs() < 1e-3);
        assert_eq!(engine.context().sample_rate(), 48_000);
    }

    #[test]
    fn play_requires_loaded_buffer() {
        let mut engine = engine();
        assert!(matches!(
            engine.play(0.0, false, 0.0),
            Err(SculptError::Playback(_))
        ));
    }

    #[test]
    fn closed_engine_refuses_context_operations() {
        let mut engine = engine();
        engine.close();
        assert_eq!(engine.context().state(), ContextState::Closed);

        let result = engine.load_file(tone_wav(44_100));
        assert!(matches!(result, Err(SculptError::Context(_))));
    }

    #[test]
    fn render_advances_the_clock() {
        let mut engine = engine();
        let mut out = vec![0.0f32; 256];
        engine.render(&mut out);
        let expected = 128.0 / 44_100.0;
        assert!((engine.context().current_time() - expected).abs() < 1e-9);
    }

    #[test]
    fn render_while_stopped_is_silent() {
        let mut engine = engine();
        let mut out = vec![0.5f32; 256];
        engine.render(&mut out);
        assert!(out.iter().all(|&s| s.abs() < 1e-6));
    }

    #[test]
    fn mute_drives_output_gain_target_to_zero() {
        let mut engine = engine();
        engine.mute();
        // The smoothed tap ramps toward zero; check the target via a long
        // render then a silent probe
        let mut out = vec![0.0f32; 4096];
        engine.render(&mut out);
        engine.unmute();
        assert_eq!(engine.volume(), 80);
    }

    #[test]
    fn export_without_buffer_fails() {
        let mut engine = engine();
        assert!(matches!(
            engine.export_processed(ExportFormat::Wav),
            Err(SculptError::Export(_))
        ));
    }

    #[test]
    fn mp3_export_is_rejected_not_mislabeled() {
        let mut engine = engine();
        engine.load_file(tone_wav(44_100)).unwrap();
        let result = engine.export_processed(ExportFormat::Mp3);
        assert!(matches!(result, Err(SculptError::Export(_))));
    }
}
