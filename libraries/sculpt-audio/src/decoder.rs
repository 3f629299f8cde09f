/// Audio decoder implementation using Symphonia
use crate::error::{AudioError, Result};
use sculpt_core::{AudioBuffer, AudioFormat, SampleRate};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Audio decoder using Symphonia
///
/// Decodes a complete in-memory container (MP3, FLAC, OGG/Vorbis, WAV, AAC,
/// M4A) into an interleaved stereo f32 buffer. The container is identified
/// by content sniffing; no filename or MIME hint is required.
///
/// Output is always stereo: mono input is duplicated onto both channels and
/// anything above two channels is folded down with ITU-R BS.775-1 style
/// -3 dB coefficients.
#[derive(Debug, Default)]
pub struct SymphoniaDecoder;

/// -3 dB fold-down coefficient for channels beyond the front pair
const FOLD_DOWN: f32 = 0.707;

impl SymphoniaDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self
    }

    /// Decode a complete audio container from raw bytes.
    pub fn decode_bytes(&self, data: Vec<u8>) -> Result<AudioBuffer> {
        if data.is_empty() {
            return Err(AudioError::Decode("empty input".into()));
        }

        let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

        let probed = symphonia::default::get_probe()
            .format(
                &Hint::new(),
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioError::UnsupportedFormat(format!("failed to probe input: {e}")))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| AudioError::Decode("no audio tracks found".into()))?;

        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(44_100);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::Symphonia(format!("failed to create decoder: {e}")))?;

        let mut samples: Vec<f32> = Vec::new();
        let mut sample_buf: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                // End of stream
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(AudioError::Decode(format!("packet read failed: {e}"))),
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    let channels = spec.channels.count();
                    let needed = decoded.capacity() * channels;

                    // (Re)allocate the conversion buffer when the packet
                    // outgrows it; most codecs keep a fixed frame size
                    let needs_alloc = match &sample_buf {
                        Some(buf) => buf.capacity() < needed,
                        None => true,
                    };
                    if needs_alloc {
                        sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
                    }
                    if let Some(buf) = sample_buf.as_mut() {
                        buf.copy_interleaved_ref(decoded);
                        fold_to_stereo(buf.samples(), channels, &mut samples);
                    }
                }
                // A malformed frame is recoverable; skip it
                Err(SymphoniaError::DecodeError(_)) => continue,
                Err(e) => return Err(AudioError::Decode(format!("decode failed: {e}"))),
            }
        }

        if samples.is_empty() {
            return Err(AudioError::Decode("no audio frames decoded".into()));
        }

        Ok(AudioBuffer::new(
            samples,
            AudioFormat::stereo_float(SampleRate::new(sample_rate)),
        ))
    }
}

/// Append an interleaved block as stereo: mono duplicated, stereo copied,
/// additional channels folded into both sides at -3 dB.
fn fold_to_stereo(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    match channels {
        0 => {}
        1 => {
            out.reserve(interleaved.len() * 2);
            for &s in interleaved {
                out.push(s);
                out.push(s);
            }
        }
        2 => out.extend_from_slice(interleaved),
        _ => {
            out.reserve(interleaved.len() / channels * 2);
            for frame in interleaved.chunks_exact(channels) {
                let mut left = frame[0];
                let mut right = frame[1];
                for &extra in &frame[2..] {
                    left += extra * FOLD_DOWN;
                    right += extra * FOLD_DOWN;
                }
                out.push(left.clamp(-1.0, 1.0));
                out.push(right.clamp(-1.0, 1.0));
            }
        }
    }
}
