//! WAV and metadata export

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use serde::{Deserialize, Serialize};

use super::AudioBuffer;
use crate::error::Result;

/// Convert a float sample to 16-bit PCM.
///
/// Negative values scale by 0x8000 and positive by 0x7FFF, so both -1.0 and
/// 1.0 reach the ends of the range. Fractions truncate toward zero.
pub fn to_pcm_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

/// Encode as 16-bit interleaved PCM
pub fn encode_wav<W: Write + Seek>(buffer: &AudioBuffer, w: W) -> Result<()> {
    let spec = WavSpec {
        channels: buffer.channel_count() as u16,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::new(w, spec).map_err(std::io::Error::other)?;
    for i in 0..buffer.len() {
        for channel in &buffer.channels {
            writer
                .write_sample(to_pcm_i16(channel[i]))
                .map_err(std::io::Error::other)?;
        }
    }
    writer.finalize().map_err(std::io::Error::other)?;
    Ok(())
}

pub fn write_wav(buffer: &AudioBuffer, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    encode_wav(buffer, BufWriter::new(file))
}

/// JSON sidecar describing a rendered sound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub duration: f32,
    pub sample_rate: u32,
    pub channels: usize,
    #[serde(default)]
    pub parameters: serde_json::Value,
    pub generator: String,
    pub version: String,
}

impl SoundMetadata {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, buffer: &AudioBuffer) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            duration: buffer.duration(),
            sample_rate: buffer.sample_rate,
            channels: buffer.channel_count(),
            parameters: serde_json::Value::Null,
            generator: "spacegen".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = parameters;
        self
    }
}

pub fn write_metadata(metadata: &SoundMetadata, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut w, metadata).map_err(std::io::Error::other)?;
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm_asymmetric_scaling() {
        assert_eq!(to_pcm_i16(0.0), 0);
        assert_eq!(to_pcm_i16(1.0), i16::MAX);
        assert_eq!(to_pcm_i16(-1.0), i16::MIN);
        assert_eq!(to_pcm_i16(0.5), 16383);
        assert_eq!(to_pcm_i16(-0.5), -16384);
        assert_eq!(to_pcm_i16(3.0), i16::MAX);
        assert_eq!(to_pcm_i16(-3.0), i16::MIN);
    }

    #[test]
    fn test_write_wav_roundtrip_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let buffer = AudioBuffer {
            sample_rate: 44100,
            channels: vec![vec![0.0, 0.5, -0.5], vec![1.0, -1.0, 0.0]],
        };
        write_wav(&buffer, &path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.bits_per_sample, 16);
        let samples: Vec<i16> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 32767, 16383, -32768, -16384, 0]);
    }

    #[test]
    fn test_metadata_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.json");
        let buffer = AudioBuffer::mono(44100, vec![0.0; 22050]);
        let meta = SoundMetadata::new("laser_basic", "sfx", &buffer)
            .with_parameters(serde_json::json!({"frequency": 440}));
        write_metadata(&meta, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["type"], "sfx");
        assert_eq!(value["duration"], 0.5);
        assert_eq!(value["parameters"]["frequency"], 440);
        assert_eq!(value["generator"], "spacegen");
    }
}
