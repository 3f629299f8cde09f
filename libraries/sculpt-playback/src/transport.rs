//! Transport state machine
//!
//! Emulates pause/seek/loop on top of start-once playback sources. There are
//! only two states: `Stopped` and `Playing`. A paused transport *is*
//! stopped — the underlying source cannot resume, so pausing tears the
//! source down and remembers the position, and resuming schedules a fresh
//! source at that offset.
//!
//! Position is derived from a wall-clock delta (`now - start_reference`)
//! every poll tick, never accumulated per tick, so it cannot drift when the
//! UI frame rate stutters. The poll itself is cooperative: armed on entering
//! `Playing`, cancelled on every exit, and cancelling twice is a no-op.

use crate::error::{PlaybackError, Result};
use crate::source::BufferSource;
use sculpt_core::AudioBuffer;
use std::sync::Arc;

/// Transport states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    /// No active source; position is frozen
    Stopped,
    /// One active source; position follows the wall clock
    Playing,
}

/// Events emitted by the transport, drained by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// State changed
    StateChanged(TransportState),
    /// Periodic position update while playing
    PositionUpdate {
        /// Current position in seconds
        position_secs: f64,
        /// Buffer duration in seconds
        duration_secs: f64,
    },
    /// Playback wrapped to the start (looping)
    Looped,
    /// Playback reached the end of the buffer (not looping)
    ReachedEnd,
}

/// The active playback node plus its wall-clock anchor.
#[derive(Debug)]
struct PlaybackSession {
    source: BufferSource,
    /// Wall-clock time corresponding to position zero
    start_reference: f64,
}

/// Owns playback position, the loop flag, and the one-shot source
/// lifecycle.
#[derive(Debug)]
pub struct TransportController {
    state: TransportState,
    buffer: Option<Arc<AudioBuffer>>,
    session: Option<PlaybackSession>,
    position_secs: f64,
    looping: bool,
    poll_armed: bool,
    pending_events: Vec<TransportEvent>,
}

impl TransportController {
    /// Create a stopped transport with no buffer.
    pub fn new() -> Self {
        Self {
            state: TransportState::Stopped,
            buffer: None,
            session: None,
            position_secs: 0.0,
            looping: false,
            poll_armed: false,
            pending_events: Vec::new(),
        }
    }

    /// Bind a decoded buffer. Stops any current playback and rewinds.
    pub fn set_buffer(&mut self, buffer: Arc<AudioBuffer>) {
        self.stop();
        self.buffer = Some(buffer);
        self.position_secs = 0.0;
    }

    /// Duration of the bound buffer in seconds (0 when none)
    pub fn duration_secs(&self) -> f64 {
        self.buffer.as_ref().map_or(0.0, |b| b.duration_secs())
    }

    /// Current state
    pub fn state(&self) -> TransportState {
        self.state
    }

    /// Current position in seconds
    pub fn position_secs(&self) -> f64 {
        self.position_secs
    }

    /// Whether loop-at-end is enabled
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Whether the position poll is armed (tests/diagnostics)
    pub fn poll_armed(&self) -> bool {
        self.poll_armed
    }

    /// Number of live sources; the invariant is 0 or 1
    pub fn active_sources(&self) -> usize {
        usize::from(self.session.is_some())
    }

    /// Drain pending events
    pub fn drain_events(&mut self) -> Vec<TransportEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Start playback at `from_secs`.
    ///
    /// Any previous source is torn down first; on failure the transport is
    /// left `Stopped` with no session.
    pub fn play(&mut self, from_secs: f64, looping: bool, now: f64) -> Result<()> {
        if !from_secs.is_finite() {
            return Err(PlaybackError::InvalidPosition(from_secs));
        }
        let buffer = self.buffer.clone().ok_or(PlaybackError::NoBufferLoaded)?;

        self.teardown_session();
        self.looping = looping;

        let from = from_secs.clamp(0.0, buffer.duration_secs());
        match self.start_session(&buffer, from, now) {
            Ok(()) => {
                self.set_state(TransportState::Playing);
                self.poll_armed = true;
                Ok(())
            }
            Err(e) => {
                self.enter_stopped();
                Err(e)
            }
        }
    }

    /// Stop playback, freezing the position at the last computed value.
    /// Always safe to call; a no-op when already stopped.
    pub fn stop(&mut self) {
        self.teardown_session();
        if self.state != TransportState::Stopped {
            self.enter_stopped();
        } else {
            self.cancel_poll();
        }
    }

    /// Move to `t`. While playing this replaces the source immediately;
    /// while stopped it only moves the remembered position.
    pub fn seek(&mut self, t: f64, now: f64) -> Result<()> {
        if !t.is_finite() {
            return Err(PlaybackError::InvalidPosition(t));
        }
        let t = t.clamp(0.0, self.duration_secs());

        if self.state == TransportState::Playing {
            let buffer = self.buffer.clone().ok_or(PlaybackError::NoBufferLoaded)?;
            self.teardown_session();
            if let Err(e) = self.start_session(&buffer, t, now) {
                self.enter_stopped();
                return Err(e);
            }
        } else {
            self.position_secs = t;
        }
        Ok(())
    }

    /// Position poll tick. Recomputes the position from the wall clock and
    /// handles end-of-buffer (loop wrap or stop). A no-op unless the poll
    /// is armed.
    pub fn tick(&mut self, now: f64) -> TransportState {
        if !self.poll_armed || self.state != TransportState::Playing {
            return self.state;
        }
        let Some(session) = self.session.as_ref() else {
            return self.state;
        };

        let duration = self.duration_secs();
        let position = (now - session.start_reference).max(0.0);

        if position >= duration {
            if self.looping && duration > 0.0 {
                // Equivalent to seek(0): new source, fresh reference
                let buffer = self.buffer.clone();
                self.teardown_session();
                match buffer
                    .ok_or(PlaybackError::NoBufferLoaded)
                    .and_then(|b| self.start_session(&b, 0.0, now))
                {
                    Ok(()) => self.pending_events.push(TransportEvent::Looped),
                    Err(_) => self.enter_stopped(),
                }
            } else {
                self.position_secs = duration;
                self.teardown_session();
                self.enter_stopped();
                self.pending_events.push(TransportEvent::ReachedEnd);
            }
        } else {
            self.position_secs = position;
            self.pending_events.push(TransportEvent::PositionUpdate {
                position_secs: position,
                duration_secs: duration,
            });
        }

        self.state
    }

    /// Cancel the position poll. Re-entrant safe: cancelling an already
    /// cancelled poll is a no-op.
    pub fn cancel_poll(&mut self) {
        self.poll_armed = false;
    }

    /// Render-domain entry: fill `out` from the active source. Returns the
    /// number of samples written (0 when stopped; the caller zero-fills).
    pub fn render(&mut self, out: &mut [f32]) -> usize {
        if self.state != TransportState::Playing {
            return 0;
        }
        match self.session.as_mut() {
            Some(session) => session.source.read(out),
            None => 0,
        }
    }

    fn start_session(&mut self, buffer: &Arc<AudioBuffer>, from: f64, now: f64) -> Result<()> {
        let mut source = BufferSource::new(Arc::clone(buffer));
        source.set_looping(self.looping);
        source.start(from)?;
        self.session = Some(PlaybackSession {
            source,
            start_reference: now - from,
        });
        self.position_secs = from;
        Ok(())
    }

    fn teardown_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.source.stop();
        }
    }

    fn enter_stopped(&mut self) {
        self.cancel_poll();
        self.set_state(TransportState::Stopped);
    }

    fn set_state(&mut self, state: TransportState) {
        if self.state != state {
            self.state = state;
            self.pending_events
                .push(TransportEvent::StateChanged(state));
        }
    }
}

impl Default for TransportController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sculpt_core::{AudioFormat, SampleRate};

    fn one_second_buffer() -> Arc<AudioBuffer> {
        Arc::new(AudioBuffer::new(
            vec![0.1; 96_000],
            AudioFormat::stereo_float(SampleRate::new(48_000)),
        ))
    }

    fn playing_transport() -> TransportController {
        let mut transport = TransportController::new();
        transport.set_buffer(one_second_buffer());
        transport.play(0.0, false, 10.0).unwrap();
        transport
    }

    #[test]
    fn play_without_buffer_fails_stopped() {
        let mut transport = TransportController::new();
        assert!(matches!(
            transport.play(0.0, false, 0.0),
            Err(PlaybackError::NoBufferLoaded)
        ));
        assert_eq!(transport.state(), TransportState::Stopped);
        assert_eq!(transport.active_sources(), 0);
    }

    #[test]
    fn play_arms_poll_and_tracks_wall_clock() {
        let mut transport = playing_transport();
        assert!(transport.poll_armed());

        transport.tick(10.25);
        assert!((transport.position_secs() - 0.25).abs() < 1e-9);

        // Irregular tick spacing does not accumulate error
        transport.tick(10.26);
        transport.tick(10.7);
        assert!((transport.position_secs() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn reaching_duration_stops_and_clamps() {
        let mut transport = playing_transport();
        transport.tick(11.5);

        assert_eq!(transport.state(), TransportState::Stopped);
        assert_eq!(transport.position_secs(), 1.0);
        assert_eq!(transport.active_sources(), 0);
        assert!(!transport.poll_armed());

        let events = transport.drain_events();
        assert!(events.contains(&TransportEvent::ReachedEnd));
    }

    #[test]
    fn looping_restarts_at_zero() {
        let mut transport = TransportController::new();
        transport.set_buffer(one_second_buffer());
        transport.play(0.0, true, 10.0).unwrap();

        transport.tick(11.2);

        assert_eq!(transport.state(), TransportState::Playing);
        assert_eq!(transport.position_secs(), 0.0);
        assert_eq!(transport.active_sources(), 1);

        let events = transport.drain_events();
        assert!(events.contains(&TransportEvent::Looped));

        // The new session tracks from the wrap time
        transport.tick(11.5);
        assert!((transport.position_secs() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn seek_while_playing_keeps_exactly_one_source() {
        let mut transport = playing_transport();
        transport.seek(0.5, 10.1).unwrap();

        assert_eq!(transport.active_sources(), 1);
        assert_eq!(transport.state(), TransportState::Playing);
        assert!((transport.position_secs() - 0.5).abs() < 1e-9);

        transport.tick(10.2);
        assert!((transport.position_secs() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn seek_while_stopped_moves_position_only() {
        let mut transport = TransportController::new();
        transport.set_buffer(one_second_buffer());

        transport.seek(0.75, 0.0).unwrap();
        assert_eq!(transport.state(), TransportState::Stopped);
        assert!((transport.position_secs() - 0.75).abs() < 1e-9);
        assert_eq!(transport.active_sources(), 0);
    }

    #[test]
    fn seek_clamps_to_duration() {
        let mut transport = TransportController::new();
        transport.set_buffer(one_second_buffer());
        transport.seek(5.0, 0.0).unwrap();
        assert_eq!(transport.position_secs(), 1.0);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut transport = playing_transport();
        transport.tick(10.3);

        transport.stop();
        let position = transport.position_secs();
        transport.stop();
        transport.stop();

        assert_eq!(transport.state(), TransportState::Stopped);
        assert_eq!(transport.position_secs(), position);
        assert_eq!(transport.active_sources(), 0);
    }

    #[test]
    fn stop_freezes_last_computed_position() {
        let mut transport = playing_transport();
        transport.tick(10.4);
        transport.stop();
        // Frozen at the tick value, not recomputed at stop time
        assert!((transport.position_secs() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn cancel_poll_twice_is_noop() {
        let mut transport = playing_transport();
        transport.cancel_poll();
        transport.cancel_poll();
        assert!(!transport.poll_armed());

        // Ticks are inert while the poll is cancelled
        transport.tick(20.0);
        assert_eq!(transport.position_secs(), 0.0);
    }

    #[test]
    fn play_replaces_existing_session() {
        let mut transport = playing_transport();
        transport.play(0.25, false, 11.0).unwrap();

        assert_eq!(transport.active_sources(), 1);
        assert!((transport.position_secs() - 0.25).abs() < 1e-9);

        transport.tick(11.1);
        assert!((transport.position_secs() - 0.35).abs() < 1e-9);
    }

    #[test]
    fn render_pulls_samples_only_while_playing() {
        let mut transport = playing_transport();
        let mut out = vec![0.0f32; 256];
        assert_eq!(transport.render(&mut out), 256);
        assert!(out.iter().all(|&s| (s - 0.1).abs() < 1e-6));

        transport.stop();
        assert_eq!(transport.render(&mut out), 0);
    }

    #[test]
    fn state_change_events_are_emitted() {
        let mut transport = TransportController::new();
        transport.set_buffer(one_second_buffer());
        transport.play(0.0, false, 0.0).unwrap();
        transport.stop();

        let events = transport.drain_events();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, TransportEvent::StateChanged(_)))
                .count(),
            2
        );
    }

    #[test]
    fn empty_buffer_play_reaches_end_immediately() {
        let mut transport = TransportController::new();
        transport.set_buffer(Arc::new(AudioBuffer::new(
            vec![],
            AudioFormat::stereo_float(SampleRate::new(48_000)),
        )));
        // Looping an empty buffer must not spin; it stops
        transport.play(0.0, true, 0.0).unwrap();
        transport.tick(0.016);
        assert_eq!(transport.state(), TransportState::Stopped);
    }
}
