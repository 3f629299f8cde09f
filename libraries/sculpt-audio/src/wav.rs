//! WAV export
//!
//! Serializes processed float audio to the canonical 16-bit PCM container:
//! a 44-byte RIFF/WAVE header followed by little-endian interleaved
//! samples. This is the one wire-exact artifact of the system, so the
//! float-to-PCM quantization is spelled out here rather than delegated:
//! clamp to [-1, 1], scale negatives by 32768 and non-negatives by 32767,
//! truncate. No dithering; identical input yields identical bytes.

use crate::error::{AudioError, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;

/// Encoder for 16-bit PCM WAV bytes.
pub struct WavEncoder;

impl WavEncoder {
    /// Encode interleaved float samples into a complete WAV byte vector.
    ///
    /// An empty sample slice still produces a valid header with a
    /// zero-length data chunk.
    pub fn encode(samples: &[f32], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
        if channels == 0 {
            return Err(AudioError::InvalidBuffer(
                "cannot encode zero channels".into(),
            ));
        }
        if sample_rate == 0 {
            return Err(AudioError::InvalidBuffer(
                "cannot encode a zero sample rate".into(),
            ));
        }

        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        let mut writer = WavWriter::new(&mut cursor, spec)
            .map_err(|e| AudioError::Export(format!("failed to start WAV stream: {e}")))?;

        for &sample in samples {
            writer
                .write_sample(Self::quantize(sample))
                .map_err(|e| AudioError::Export(format!("failed to write sample: {e}")))?;
        }

        writer
            .finalize()
            .map_err(|e| AudioError::Export(format!("failed to finalize WAV stream: {e}")))?;

        Ok(cursor.into_inner())
    }

    /// Quantize one float sample to 16-bit PCM.
    #[inline]
    pub fn quantize(sample: f32) -> i16 {
        let s = sample.clamp(-1.0, 1.0);
        if s < 0.0 {
            (s * 32768.0) as i16
        } else {
            (s * 32767.0) as i16
        }
    }
}
