//! Core types shared across the Sculpt crates

mod audio;
mod params;

pub use audio::{AudioBuffer, AudioFormat, SampleRate};
pub use params::{CompressorParams, EqGains, ExportFormat, Stage, EQ_GAIN_RANGE_DB};
