//! Sculpt Core
//!
//! Platform-agnostic core types and error handling for the Sculpt
//! audio-effects engine.
//!
//! This crate provides the foundational building blocks shared by the
//! processing and playback crates:
//! - **Audio types**: `AudioBuffer`, `AudioFormat`, `SampleRate`
//! - **Parameter types**: `EqGains`, `CompressorParams`, `Stage`,
//!   `ExportFormat`
//! - **Error handling**: the unified `SculptError` taxonomy
//!
//! # Example
//!
//! ```rust
//! use sculpt_core::{AudioBuffer, AudioFormat, EqGains, SampleRate};
//!
//! let format = AudioFormat::new(SampleRate::new(48_000), 2, 32);
//! let buffer = AudioBuffer::new(vec![0.0; 96_000], format);
//! assert!((buffer.duration_secs() - 1.0).abs() < 1e-9);
//!
//! let gains = EqGains::flat().with_low(6.0);
//! assert_eq!(gains.low, 6.0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod types;

pub use error::{Result, SculptError};
pub use types::{
    AudioBuffer, AudioFormat, CompressorParams, EqGains, ExportFormat, SampleRate, Stage,
};
