//! WAV decoding

use std::io::Cursor;

use hound::{SampleFormat, WavReader};

use super::AudioBuffer;
use crate::error::{GenError, Result};

fn decode_error(e: hound::Error) -> GenError {
    GenError::DecodeError(e.to_string())
}

/// Decode a RIFF/WAVE file held in memory into planar float channels.
///
/// Integer PCM of any supported depth is scaled into `-1..1`; float data
/// passes through unchanged.
pub fn load_wav_bytes(bytes: &[u8]) -> Result<AudioBuffer> {
    let reader = WavReader::new(Cursor::new(bytes)).map_err(decode_error)?;
    let spec = reader.spec();
    let channel_count = spec.channels as usize;
    if channel_count == 0 {
        return Err(GenError::DecodeError("WAV declares zero channels".into()));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(decode_error)?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(decode_error)?
        }
    };

    let frames = interleaved.len() / channel_count;
    let mut channels = vec![Vec::with_capacity(frames); channel_count];
    for frame in interleaved.chunks_exact(channel_count) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }
    Ok(AudioBuffer {
        sample_rate: spec.sample_rate,
        channels,
    })
}
