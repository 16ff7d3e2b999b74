//! Offline sound effect synthesis and sample processing
//!
//! Everything renders in virtual time straight into an [`AudioBuffer`]; no
//! audio device is involved, so the same parameters always give the same
//! samples.
//!
//! # Example
//! ```no_run
//! use spacegen::audio::*;
//!
//! let synth = Synth::new(SAMPLE_RATE);
//! let zap = synth.pulse_wave(&PulseParams {
//!     pitch_sweep: Some(PitchSweep::new(800.0, 200.0)),
//!     ..Default::default()
//! });
//!
//! let boom = generate_sfx("explosion_large").unwrap();
//! write_wav(&boom, std::path::Path::new("boom.wav")).unwrap();
//! # let _ = zap;
//! ```

mod decode;
mod envelope;
mod export;
mod filters;
mod fm;
mod oscillators;
mod presets;
mod sample;
mod synth;

/// Offline render sample rate
pub const SAMPLE_RATE: u32 = 44100;

pub use decode::load_wav_bytes;
pub use envelope::{Envelope, Percussive};
pub use export::{SoundMetadata, encode_wav, to_pcm_i16, write_metadata, write_wav};
pub use filters::{Biquad, CutoffSweep, FilterType, apply_filter};
pub use fm::FmParams;
pub use oscillators::{pink_noise, pulse, white_noise};
pub use presets::{
    SFX_CATEGORIES, SfxPreset, generate_sfx, generate_sfx_variation, sfx_preset, sfx_presets,
};
pub use sample::{
    BitcrushParams, DistortionParams, FilterParams, GranularParams, PitchShiftParams, SampleInfo,
    SampleProcessor, SliceParams, distortion_curve,
};
pub use synth::{
    AdditiveParams, Material, NoiseType, PhysicalParams, PitchSweep, PulseParams, SubtractiveParams,
    Synth, SynthMethod, SynthParams,
};

/// Sample count for a duration, rounded to the nearest sample
pub fn sample_count(duration: f32, sample_rate: u32) -> usize {
    (duration.max(0.0) as f64 * sample_rate as f64).round() as usize
}

/// Planar float audio, one `Vec` per channel, samples nominally in `-1..=1`
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel data; every channel has the same length
    pub channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Silent buffer of `channels` x `len` samples
    pub fn silent(sample_rate: u32, channels: usize, len: usize) -> Self {
        Self {
            sample_rate,
            channels: vec![vec![0.0; len]; channels.max(1)],
        }
    }

    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            channels: vec![samples],
        }
    }

    /// Frames per channel
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        self.len() as f32 / self.sample_rate as f32
    }

    /// First channel
    pub fn samples(&self) -> &[f32] {
        self.channels.first().map_or(&[], Vec::as_slice)
    }

    /// Cut every channel to at most `duration` seconds
    pub fn truncate(&mut self, duration: f32) {
        let len = sample_count(duration, self.sample_rate);
        for channel in &mut self.channels {
            channel.truncate(len);
        }
    }

    /// Largest absolute sample over all channels
    pub fn peak(&self) -> f32 {
        self.channels
            .iter()
            .flatten()
            .fold(0.0f32, |peak, s| peak.max(s.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SAMPLE_RATE: u32 = 44100;

    #[test]
    fn test_audio_buffer_mono() {
        let buf = AudioBuffer::mono(TEST_SAMPLE_RATE, vec![0.0, 0.5, -1.0]);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.channel_count(), 1);
        assert_eq!(buf.samples(), &[0.0, 0.5, -1.0]);
        assert_eq!(buf.peak(), 1.0);
    }

    #[test]
    fn test_audio_buffer_duration() {
        let buf = AudioBuffer::silent(TEST_SAMPLE_RATE, 2, TEST_SAMPLE_RATE as usize);
        assert!((buf.duration() - 1.0).abs() < 0.001);
        assert_eq!(buf.channel_count(), 2);
    }

    #[test]
    fn test_truncate() {
        let mut buf = AudioBuffer::silent(TEST_SAMPLE_RATE, 2, 44100);
        buf.truncate(0.5);
        assert!(buf.channels.iter().all(|c| c.len() == 22050));
        buf.truncate(2.0);
        assert_eq!(buf.len(), 22050);
    }

    #[test]
    fn test_sample_count_rounds() {
        assert_eq!(sample_count(0.3, TEST_SAMPLE_RATE), 13230);
        assert_eq!(sample_count(0.00001, TEST_SAMPLE_RATE), 0);
        assert_eq!(sample_count(-1.0, TEST_SAMPLE_RATE), 0);
    }
}
