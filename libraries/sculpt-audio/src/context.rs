//! Render context lifecycle and clock
//!
//! Models the realtime rendering domain's shared state: sample rate, channel
//! layout, render-quantum size, and a sample-accurate clock that advances as
//! quanta are rendered. The context starts `Suspended` (real audio stacks
//! require a resume gesture before rendering); callers attempt one `resume`
//! before any operation that needs a running context, and treat a `Closed`
//! context as fatal.

use crate::error::{AudioError, Result};

/// Render context lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Created but not yet rendering; recoverable via `resume`
    Suspended,
    /// Actively rendering
    Running,
    /// Torn down; never recoverable
    Closed,
}

/// Rendering-domain parameters and clock.
///
/// The control domain never blocks on this; it only reads the clock and
/// issues state transitions. `advance` is called by the render entry point
/// once per processed quantum.
#[derive(Debug)]
pub struct RenderContext {
    state: ContextState,
    sample_rate: u32,
    channels: u16,
    quantum_frames: usize,
    frames_rendered: u64,
}

impl RenderContext {
    /// Create a suspended context.
    ///
    /// Fails when the requested layout cannot be rendered at all (zero rate,
    /// zero channels, or an empty quantum).
    pub fn new(sample_rate: u32, channels: u16, quantum_frames: usize) -> Result<Self> {
        if sample_rate == 0 {
            return Err(AudioError::Context("sample rate must be non-zero".into()));
        }
        if channels == 0 {
            return Err(AudioError::Context("channel count must be non-zero".into()));
        }
        if quantum_frames == 0 {
            return Err(AudioError::Context("render quantum must be non-empty".into()));
        }
        Ok(Self {
            state: ContextState::Suspended,
            sample_rate,
            channels,
            quantum_frames,
            frames_rendered: 0,
        })
    }

    /// Create a context for offline (export) rendering, already running.
    pub fn offline(sample_rate: u32, channels: u16, quantum_frames: usize) -> Result<Self> {
        let mut ctx = Self::new(sample_rate, channels, quantum_frames)?;
        ctx.state = ContextState::Running;
        Ok(ctx)
    }

    /// Transition to `Running`. Recoverable from `Suspended`, a no-op when
    /// already running, an error once `Closed`.
    pub fn resume(&mut self) -> Result<()> {
        match self.state {
            ContextState::Closed => Err(AudioError::Context(
                "render context is closed and cannot resume".into(),
            )),
            _ => {
                self.state = ContextState::Running;
                Ok(())
            }
        }
    }

    /// Suspend rendering. No-op unless currently running.
    pub fn suspend(&mut self) {
        if self.state == ContextState::Running {
            self.state = ContextState::Suspended;
        }
    }

    /// Tear the context down permanently.
    pub fn close(&mut self) {
        self.state = ContextState::Closed;
    }

    /// Current lifecycle state
    pub fn state(&self) -> ContextState {
        self.state
    }

    /// Whether the context is rendering
    pub fn is_running(&self) -> bool {
        self.state == ContextState::Running
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Output channel count
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Render quantum size in frames
    pub fn quantum_frames(&self) -> usize {
        self.quantum_frames
    }

    /// Sample-accurate clock: seconds of audio rendered so far.
    ///
    /// Parameter changes are stamped with this time so they land at quantum
    /// boundaries, never mid-block.
    pub fn current_time(&self) -> f64 {
        self.frames_rendered as f64 / f64::from(self.sample_rate)
    }

    /// Advance the clock after rendering `frames` frames.
    pub fn advance(&mut self, frames: u64) {
        self.frames_rendered += frames;
    }
}
