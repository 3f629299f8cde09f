//! One-shot playback source
//!
//! Models the start-once playback node the transport schedules: it binds an
//! immutable decoded buffer, starts exactly once at an offset, optionally
//! loops at the buffer boundary, and stops permanently. There is no resume;
//! pause and seek are implemented above this layer by discarding the source
//! and creating a new one.

use crate::error::{PlaybackError, Result};
use sculpt_core::AudioBuffer;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceState {
    Created,
    Started,
    Stopped,
}

/// A one-shot source over a shared decoded buffer.
#[derive(Debug)]
pub struct BufferSource {
    buffer: Arc<AudioBuffer>,
    cursor_frames: usize,
    looping: bool,
    state: SourceState,
}

impl BufferSource {
    /// Bind a source to a decoded buffer.
    pub fn new(buffer: Arc<AudioBuffer>) -> Self {
        Self {
            buffer,
            cursor_frames: 0,
            looping: false,
            state: SourceState::Created,
        }
    }

    /// Set the loop flag. Like the underlying primitive this may be toggled
    /// at any time, including while playing.
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Whether the source loops at the buffer boundary
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Start reading at `offset_secs`. A source starts exactly once; a
    /// second start is an error, as is a non-finite offset.
    pub fn start(&mut self, offset_secs: f64) -> Result<()> {
        if self.state != SourceState::Created {
            return Err(PlaybackError::SourceAlreadyStarted);
        }
        if !offset_secs.is_finite() || offset_secs < 0.0 {
            return Err(PlaybackError::InvalidPosition(offset_secs));
        }

        let sample_rate = f64::from(self.buffer.format.sample_rate.as_hz());
        let frames = self.buffer.frames();
        self.cursor_frames = ((offset_secs * sample_rate) as usize).min(frames);
        self.state = SourceState::Started;
        Ok(())
    }

    /// Stop permanently. Safe to call in any state, any number of times;
    /// stopping a never-started source is a no-op.
    pub fn stop(&mut self) {
        self.state = SourceState::Stopped;
    }

    /// Fill `out` with interleaved samples from the cursor, wrapping at the
    /// buffer boundary when looping. Returns the number of samples written;
    /// 0 once exhausted or stopped.
    pub fn read(&mut self, out: &mut [f32]) -> usize {
        if self.state != SourceState::Started {
            return 0;
        }

        let channels = self.buffer.format.channels.max(1) as usize;
        let total_frames = self.buffer.frames();
        let mut written = 0;

        while written < out.len() {
            if self.cursor_frames >= total_frames {
                if self.looping && total_frames > 0 {
                    self.cursor_frames = 0;
                } else {
                    break;
                }
            }

            let want_frames = (out.len() - written) / channels;
            let available = total_frames - self.cursor_frames;
            let take = want_frames.min(available);
            if take == 0 {
                break;
            }

            let start = self.cursor_frames * channels;
            let end = start + take * channels;
            out[written..written + take * channels]
                .copy_from_slice(&self.buffer.samples[start..end]);
            written += take * channels;
            self.cursor_frames += take;
        }

        written
    }

    /// Whether the source can still produce samples
    pub fn is_active(&self) -> bool {
        self.state == SourceState::Started
            && (self.looping || self.cursor_frames < self.buffer.frames())
    }

    /// Whether the source has been started at some point
    pub fn was_started(&self) -> bool {
        self.state != SourceState::Created
    }

    /// Current read position in frames
    pub fn position_frames(&self) -> usize {
        self.cursor_frames
    }
}
