//! Sculpt Playback
//!
//! Transport and engine composition for Sculpt.
//!
//! This crate provides:
//! - `TransportController`: the Stopped/Playing state machine that emulates
//!   pause/seek/loop over one-shot playback sources
//! - `BufferSource`: the start-once playback node
//! - `AudioEngine`: the composition root wiring decoding, the processing
//!   chain, the analysis tap, transport, and export
//! - `EngineConfig` and logarithmic monitor `Volume`
//!
//! # Example
//!
//! ```rust,no_run
//! use sculpt_playback::{AudioEngine, EngineConfig};
//! use sculpt_core::{EqGains, ExportFormat};
//!
//! # fn example(file_bytes: Vec<u8>) -> sculpt_core::Result<()> {
//! let mut engine = AudioEngine::new(EngineConfig::default())?;
//!
//! let duration = engine.load_file(file_bytes)?;
//! engine.set_eq_gains(EqGains::flat().with_low(6.0));
//! engine.play(0.0, false, 0.0)?;
//!
//! // Host render callback:
//! let mut out = vec![0.0f32; 256];
//! engine.render(&mut out);
//!
//! // Display-refresh poll:
//! engine.tick(0.016);
//!
//! let wav_bytes = engine.export_processed(ExportFormat::Wav)?;
//! # let _ = (duration, wav_bytes);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod source;
mod transport;
mod volume;

pub use config::EngineConfig;
pub use engine::AudioEngine;
pub use error::{PlaybackError, Result};
pub use source::BufferSource;
pub use transport::{TransportController, TransportEvent, TransportState};
pub use volume::Volume;
