//! Analysis tap
//!
//! A fixed-size window over the most recent post-chain audio, exposed to the
//! (external) visualization layer as a magnitude spectrum and a peak level.
//! The tap is passive: the engine pushes rendered output into it and readers
//! never affect the signal path.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::error::{AudioError, Result};

/// Spectrum/level readout over a ring of recent samples.
pub struct Analyser {
    fft_size: usize,
    sample_rate: u32,
    /// Mono mixdown of the most recent `fft_size` samples
    ring: Vec<f32>,
    write_pos: usize,
    fft: Arc<dyn Fft<f32>>,
    /// Precomputed Hann window
    window: Vec<f32>,
}

impl Analyser {
    /// Create an analyser with a power-of-two FFT size (min 32).
    pub fn new(fft_size: usize, sample_rate: u32) -> Result<Self> {
        if fft_size < 32 || !fft_size.is_power_of_two() {
            return Err(AudioError::InvalidBuffer(format!(
                "analysis FFT size must be a power of two >= 32, got {fft_size}"
            )));
        }

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        let window = (0..fft_size)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * i as f32 / fft_size as f32;
                0.5 * (1.0 - phase.cos())
            })
            .collect();

        Ok(Self {
            fft_size,
            sample_rate,
            ring: vec![0.0; fft_size],
            write_pos: 0,
            fft,
            window,
        })
    }

    /// Push rendered interleaved output into the ring as a mono mixdown.
    pub fn push_interleaved(&mut self, samples: &[f32], channels: u16) {
        let channels = channels.max(1) as usize;
        for frame in samples.chunks_exact(channels) {
            let mono = frame.iter().sum::<f32>() / channels as f32;
            self.ring[self.write_pos] = mono;
            self.write_pos = (self.write_pos + 1) % self.fft_size;
        }
    }

    /// Windowed magnitude spectrum of the current ring, `fft_size / 2` bins.
    ///
    /// Magnitudes are normalized so a full-scale sine reads ~1.0 in its bin.
    pub fn magnitude_spectrum(&self) -> Vec<f32> {
        let mut buffer: Vec<Complex<f32>> = (0..self.fft_size)
            .map(|i| {
                let sample = self.ring[(self.write_pos + i) % self.fft_size];
                Complex::new(sample * self.window[i], 0.0)
            })
            .collect();

        self.fft.process(&mut buffer);

        // 2/N for the one-sided spectrum, 2x more for the Hann window's
        // coherent gain of 0.5
        let scale = 4.0 / self.fft_size as f32;
        buffer[..self.fft_size / 2]
            .iter()
            .map(|c| c.norm() * scale)
            .collect()
    }

    /// Peak level of the ring in dBFS.
    pub fn peak_level_db(&self) -> f32 {
        let peak = self.ring.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        20.0 * peak.max(1e-10).log10()
    }

    /// Center frequency of spectrum bin `bin` in Hz.
    pub fn bin_frequency_hz(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate as f32 / self.fft_size as f32
    }

    /// FFT size in samples
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }
}
