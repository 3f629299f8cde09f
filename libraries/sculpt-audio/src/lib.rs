//! Sculpt Audio
//!
//! Audio decoding, the signal-processing graph, and PCM export for Sculpt.
//!
//! This crate provides:
//! - Audio decoding via Symphonia (MP3, FLAC, OGG, WAV, AAC, M4A)
//! - The fixed processing graph: 4-band EQ into a dynamics compressor, with
//!   smoothed parameters and wet/dry bypass crossfades
//! - A render-context abstraction with a sample-accurate clock
//! - An analysis tap (spectrum / peak level) for visualization layers
//! - Bit-exact 16-bit PCM WAV encoding
//!
//! # Example: building and driving the graph
//!
//! ```rust
//! use sculpt_audio::{GraphBuilder, RenderContext};
//! use sculpt_core::EqGains;
//!
//! # fn example() -> Result<(), sculpt_audio::AudioError> {
//! let mut context = RenderContext::new(48_000, 2, 128)?;
//! context.resume()?;
//!
//! let mut chain = GraphBuilder::new().build(&context)?;
//! chain.set_eq_gains(EqGains::flat().with_low(6.0), context.current_time());
//!
//! let mut buffer = vec![0.0f32; 256];
//! chain.process(&mut buffer, context.current_time());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analysis;
pub mod context;
mod decoder;
mod error;
pub mod graph;
pub mod params;
mod wav;

pub use analysis::Analyser;
pub use context::{ContextState, RenderContext};
pub use decoder::SymphoniaDecoder;
pub use error::{AudioError, Result};
pub use graph::{BandKind, BypassRouter, CompressorUnit, FilterBand, GraphBuilder, ProcessingChain};
pub use params::ParameterTarget;
pub use wav::WavEncoder;
