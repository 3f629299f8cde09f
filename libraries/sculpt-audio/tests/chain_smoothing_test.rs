//! Chain smoothing tests
//!
//! Verify that runtime parameter changes (EQ gains, compressor settings,
//! bypass toggles) never introduce discontinuities into the rendered audio.
//! Strategy: process a steady sine, mutate parameters mid-stream, then scan
//! the output for sample-to-sample jumps that a listener would hear as a
//! click.

use sculpt_audio::{GraphBuilder, RenderContext};
use sculpt_core::{CompressorParams, EqGains, Stage};
use std::f32::consts::PI;

const SAMPLE_RATE: u32 = 48_000;

/// Generate a stereo interleaved sine
fn generate_sine(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let frames = (SAMPLE_RATE as f32 * duration_secs) as usize;
    let mut buffer = Vec::with_capacity(frames * 2);
    for i in 0..frames {
        let s = (2.0 * PI * frequency * i as f32 / SAMPLE_RATE as f32).sin() * amplitude;
        buffer.push(s);
        buffer.push(s);
    }
    buffer
}

/// Largest absolute sample-to-sample difference per channel
fn max_discontinuity(buffer: &[f32]) -> f32 {
    let mut max_diff = 0.0f32;
    for ch in 0..2 {
        let mut prev: Option<f32> = None;
        for frame in buffer.chunks_exact(2) {
            if let Some(p) = prev {
                max_diff = max_diff.max((frame[ch] - p).abs());
            }
            prev = Some(frame[ch]);
        }
    }
    max_diff
}

fn running_context() -> RenderContext {
    RenderContext::offline(SAMPLE_RATE, 2, 128).unwrap()
}

#[test]
fn eq_gain_change_mid_stream_does_not_click() {
    let context = running_context();
    let mut chain = GraphBuilder::new().build(&context).unwrap();

    // Quiet 220 Hz tone, below the compressor knee
    let mut buffer = generate_sine(220.0, 1.0, 0.01);
    let half = buffer.len() / 2;

    chain.process(&mut buffer[..half], 0.0);
    // +12 dB on the low shelf while the signal is flowing
    chain.set_eq_gains(EqGains::flat().with_low(12.0), 0.5);
    chain.process(&mut buffer[half..], 0.5);

    // Smoothed worst case is the boosted sine's own slope (~1.2e-3 at 4x);
    // a stepped coefficient change would jump an order of magnitude higher
    let max_diff = max_discontinuity(&buffer);
    assert!(max_diff < 2.5e-3, "click detected: max diff {max_diff}");
}

#[test]
fn compressor_change_mid_stream_does_not_click() {
    let context = running_context();
    let mut chain = GraphBuilder::new().build(&context).unwrap();

    let mut buffer = generate_sine(220.0, 1.0, 0.3);
    let half = buffer.len() / 2;

    chain.process(&mut buffer[..half], 0.0);
    chain.set_compressor_params(
        CompressorParams {
            threshold_db: -40.0,
            ratio: 12.0,
            attack_ms: 5.0,
            release_ms: 100.0,
        },
        0.5,
    );
    chain.process(&mut buffer[half..], 0.5);

    // 0.3 amplitude sine slope is ~8.6e-3 per sample; allow headroom for
    // the gain envelope but fail on a genuine step
    let max_diff = max_discontinuity(&buffer);
    assert!(max_diff < 2.0e-2, "click detected: max diff {max_diff}");
}

#[test]
fn bypass_toggle_mid_stream_does_not_click() {
    let context = running_context();
    let mut chain = GraphBuilder::new()
        .eq_gains(EqGains {
            low: 12.0,
            low_mid: 6.0,
            high_mid: -6.0,
            high: 3.0,
        })
        .build(&context)
        .unwrap();
    chain.snap_to_targets(0.0);

    let mut buffer = generate_sine(220.0, 1.0, 0.01);
    let half = buffer.len() / 2;

    chain.process(&mut buffer[..half], 0.0);
    chain.set_bypassed(Stage::Eq, true, 0.5);
    chain.process(&mut buffer[half..], 0.5);

    let max_diff = max_discontinuity(&buffer);
    assert!(max_diff < 5.0e-3, "click detected: max diff {max_diff}");
}

#[test]
fn bypass_round_trip_restores_processing() {
    let context = running_context();
    let mut chain = GraphBuilder::new()
        .eq_gains(EqGains::flat().with_low(12.0))
        .build(&context)
        .unwrap();
    chain.snap_to_targets(0.0);

    chain.set_bypassed(Stage::Eq, true, 0.0);
    chain.set_bypassed(Stage::Eq, false, 0.1);

    // Well after both ramps: wet path fully restored
    let (wet, dry) = chain.eq_bypass().gains(1.0);
    assert!((wet - 1.0).abs() < 1e-3);
    assert!(dry < 1e-3);

    // And the gains never left the unit range on the way
    for step in 0..200 {
        let t = step as f64 * 0.005;
        let (w, d) = chain.eq_bypass().gains(t);
        assert!((0.0..=1.0).contains(&w), "wet out of range at t={t}");
        assert!((0.0..=1.0).contains(&d), "dry out of range at t={t}");
    }
}
