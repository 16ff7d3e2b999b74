//! Effects applied to externally loaded samples
//!
//! Every operation looks its source up by name in the processor's registry
//! and renders a fresh [`AudioBuffer`]; the registry is only written by
//! [`SampleProcessor::load`] and [`SampleProcessor::reverse`]. A missing
//! name fails with [`GenError::SampleNotFound`] before any output is made.

use std::f32::consts::{FRAC_PI_2, PI};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::envelope::Envelope;
use super::filters::{CutoffSweep, FilterType, apply_filter};
use super::synth::MAX_DURATION;
use super::{AudioBuffer, decode, sample_count};
use crate::error::{GenError, Result, check_max};
use crate::seed::RandomSource;

/// Points in the waveshaper lookup table
pub const DISTORTION_CURVE_LEN: usize = 44100;

const GRAIN_PEAK: f32 = 0.3;
/// Fraction of a grain spent fading in
const GRAIN_ATTACK: f32 = 0.3;
/// Width of the random read window, as a fraction of the sample
const READ_SPREAD: f64 = 0.1;
/// Most grains started per second of output
pub const MAX_GRAIN_DENSITY: f32 = 1000.0;

/// Summary of a registered sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleInfo {
    pub name: String,
    pub duration: f32,
    pub channels: usize,
    pub sample_rate: u32,
}

/// Cloud of short grains read from one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GranularParams {
    pub sample_name: String,
    /// Grain length in seconds
    pub grain_size: f32,
    /// Grains started per second
    pub grain_density: f32,
    /// Output length in seconds
    pub duration: f32,
    /// Random detune, +/- semitones
    pub pitch_variation: f32,
    /// Random stereo spread, 0 (center) to 1 (hard left/right)
    pub pan_variation: f32,
    /// Read position as a fraction of the sample
    pub start_position: f32,
    pub playback_rate: f32,
}

impl Default for GranularParams {
    fn default() -> Self {
        Self {
            sample_name: String::new(),
            grain_size: 0.05,
            grain_density: 30.0,
            duration: 2.0,
            pitch_variation: 0.2,
            pan_variation: 0.5,
            start_position: 0.0,
            playback_rate: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchShiftParams {
    pub sample_name: String,
    pub semitones: f32,
    /// Output length; the whole resampled source when `None`
    pub duration: Option<f32>,
    /// Offset into the source, in seconds
    pub start_time: f32,
    pub envelope: Option<Envelope>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceParams {
    pub sample_name: String,
    pub slice_count: usize,
    pub slice_index: usize,
    /// Play every slice in shuffled order instead of just `slice_index`
    pub random_order: bool,
    /// Silence after each slice in random-order mode, in seconds
    pub gap: f32,
}

impl Default for SliceParams {
    fn default() -> Self {
        Self {
            sample_name: String::new(),
            slice_count: 8,
            slice_index: 0,
            random_order: false,
            gap: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    pub sample_name: String,
    pub filter_type: FilterType,
    pub cutoff_freq: f32,
    pub resonance: f32,
    /// Exponential cutoff sweep `(start, end)` across the output
    pub cutoff_sweep: Option<(f32, f32)>,
    pub duration: Option<f32>,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            sample_name: String::new(),
            filter_type: FilterType::Lowpass,
            cutoff_freq: 1000.0,
            resonance: 1.0,
            cutoff_sweep: None,
            duration: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistortionParams {
    pub sample_name: String,
    /// Drive, 0 to 100
    pub amount: f32,
    pub duration: Option<f32>,
}

impl Default for DistortionParams {
    fn default() -> Self {
        Self {
            sample_name: String::new(),
            amount: 50.0,
            duration: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BitcrushParams {
    pub sample_name: String,
    /// Quantizer resolution, 1 to 16 bits
    pub bit_depth: u32,
    /// Hold each quantized value for this many samples
    pub sample_rate_reduction: usize,
    pub duration: Option<f32>,
}

impl Default for BitcrushParams {
    fn default() -> Self {
        Self {
            sample_name: String::new(),
            bit_depth: 4,
            sample_rate_reduction: 4,
            duration: None,
        }
    }
}

/// Waveshaper transfer curve for a drive `amount`.
///
/// `curve[i] = (3 + k) * x * 20deg / (pi + k * |x|)` with `x` spread
/// evenly over `[-1, 1)`.
pub fn distortion_curve(amount: f32) -> Vec<f32> {
    let deg = PI / 180.0;
    let k = amount;
    (0..DISTORTION_CURVE_LEN)
        .map(|i| {
            let x = (i * 2) as f32 / DISTORTION_CURVE_LEN as f32 - 1.0;
            ((3.0 + k) * x * 20.0 * deg) / (PI + k * x.abs())
        })
        .collect()
}

/// Map an input sample through a transfer curve, interpolating between points
fn shape(curve: &[f32], x: f32) -> f32 {
    let last = curve.len() - 1;
    let pos = (x.clamp(-1.0, 1.0) + 1.0) * 0.5 * last as f32;
    let i = pos.floor() as usize;
    if i >= last {
        return curve[last];
    }
    let frac = pos - i as f32;
    curve[i] + (curve[i + 1] - curve[i]) * frac
}

/// Read `channel` at a fractional index; silence past either end
fn read_linear(channel: &[f32], pos: f64) -> f32 {
    if pos < 0.0 {
        return 0.0;
    }
    let i = pos.floor() as usize;
    let Some(&a) = channel.get(i) else {
        return 0.0;
    };
    let b = channel.get(i + 1).copied().unwrap_or(0.0);
    a + (b - a) * (pos - i as f64) as f32
}

/// Triangle window rising to [`GRAIN_PEAK`] at [`GRAIN_ATTACK`]
fn grain_envelope(progress: f32) -> f32 {
    if progress < GRAIN_ATTACK {
        GRAIN_PEAK * progress / GRAIN_ATTACK
    } else {
        GRAIN_PEAK * (1.0 - progress) / (1.0 - GRAIN_ATTACK)
    }
}

/// Equal-power gains for a pan position in `[-1, 1]`
fn pan_gains(pan: f32) -> (f32, f32) {
    let x = (pan.clamp(-1.0, 1.0) + 1.0) * 0.5;
    ((x * FRAC_PI_2).cos(), (x * FRAC_PI_2).sin())
}

fn downmix(buffer: &AudioBuffer) -> Vec<f32> {
    let scale = 1.0 / buffer.channel_count().max(1) as f32;
    (0..buffer.len())
        .map(|i| buffer.channels.iter().map(|c| c[i]).sum::<f32>() * scale)
        .collect()
}

fn truncate_to(mut buffer: AudioBuffer, duration: Option<f32>) -> AudioBuffer {
    if let Some(duration) = duration {
        buffer.truncate(duration);
    }
    buffer
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GenError::InvalidParameter(format!("{} must be positive, got {}", name, value)))
    }
}

/// Registry of decoded samples plus the effects that read from it
#[derive(Debug, Default)]
pub struct SampleProcessor {
    samples: HashMap<String, AudioBuffer>,
}

impl SampleProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a buffer, replacing any sample of the same name
    pub fn load(&mut self, name: impl Into<String>, buffer: AudioBuffer) -> SampleInfo {
        let name = name.into();
        let info = Self::info(&name, &buffer);
        debug!(
            "Loaded sample '{}' ({:.3}s, {} ch)",
            name, info.duration, info.channels
        );
        self.samples.insert(name, buffer);
        info
    }

    /// Decode WAV bytes and register the result
    pub fn load_bytes(&mut self, name: impl Into<String>, bytes: &[u8]) -> Result<SampleInfo> {
        let buffer = decode::load_wav_bytes(bytes)?;
        Ok(self.load(name, buffer))
    }

    pub fn get(&self, name: &str) -> Result<&AudioBuffer> {
        self.samples
            .get(name)
            .ok_or_else(|| GenError::SampleNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.samples.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<AudioBuffer> {
        self.samples.remove(name)
    }

    /// Every registered sample, sorted by name
    pub fn sample_info(&self) -> Vec<SampleInfo> {
        let mut infos: Vec<_> = self
            .samples
            .iter()
            .map(|(name, buffer)| Self::info(name, buffer))
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    fn info(name: &str, buffer: &AudioBuffer) -> SampleInfo {
        SampleInfo {
            name: name.to_string(),
            duration: buffer.duration(),
            channels: buffer.channel_count(),
            sample_rate: buffer.sample_rate,
        }
    }

    /// Scatter `duration * grain_density` grains over a stereo output.
    ///
    /// Per grain, draws from `rng` in order: detune, pan, read offset.
    pub fn granular(
        &self,
        params: &GranularParams,
        rng: &mut impl RandomSource,
    ) -> Result<AudioBuffer> {
        let source = self.get(&params.sample_name)?;
        positive("grain_size", params.grain_size)?;
        positive("grain_density", params.grain_density)?;
        positive("duration", params.duration)?;
        positive("playback_rate", params.playback_rate)?;
        check_max("grain_density", params.grain_density, MAX_GRAIN_DENSITY)?;
        check_max("duration", params.duration, MAX_DURATION)?;

        let sr = source.sample_rate;
        let mono = downmix(source);
        let source_duration = source.duration() as f64;
        let grain_len = sample_count(params.grain_size, sr).max(1);
        let grain_count = (params.grain_density * params.duration).floor() as usize;
        let mut out = AudioBuffer::silent(sr, 2, sample_count(params.duration, sr));
        let out_len = out.len();

        for g in 0..grain_count {
            let detune = rng.next_signed() * params.pitch_variation as f64;
            let rate = params.playback_rate as f64 * 2f64.powf(detune / 12.0);
            let (left, right) = pan_gains((rng.next_signed() * params.pan_variation as f64) as f32);
            let read = params.start_position as f64 + rng.next_unit() * READ_SPREAD;
            let offset = (read * source_duration)
                .min(source_duration - params.grain_size as f64)
                .max(0.0);

            let origin = sample_count(g as f32 / params.grain_density, sr);
            let read_start = offset * sr as f64;
            for i in 0..grain_len.min(out_len.saturating_sub(origin)) {
                let gain = grain_envelope(i as f32 / grain_len as f32);
                let s = read_linear(&mono, read_start + i as f64 * rate) * gain;
                out.channels[0][origin + i] += s * left;
                out.channels[1][origin + i] += s * right;
            }
        }
        debug!("Granular: {} grains from '{}'", grain_count, params.sample_name);
        Ok(out)
    }

    /// Resample by `2^(semitones/12)` with linear interpolation, never
    /// longer than [`MAX_DURATION`]
    pub fn pitch_shift(&self, params: &PitchShiftParams) -> Result<AudioBuffer> {
        let source = self.get(&params.sample_name)?;
        let sr = source.sample_rate;
        let rate = 2f64.powf(params.semitones as f64 / 12.0);
        let start = params.start_time.max(0.0) as f64 * sr as f64;
        let natural = ((source.len() as f64 - start).max(0.0) / rate).round() as usize;
        let len = match params.duration {
            Some(duration) => sample_count(duration, sr).min(natural),
            None => natural,
        }
        .min(sample_count(MAX_DURATION, sr));

        let mut channels: Vec<Vec<f32>> = source
            .channels
            .iter()
            .map(|c| (0..len).map(|i| read_linear(c, start + i as f64 * rate)).collect())
            .collect();
        if let Some(envelope) = &params.envelope {
            for channel in &mut channels {
                envelope.apply(channel, sr);
            }
        }
        Ok(AudioBuffer {
            sample_rate: sr,
            channels,
        })
    }

    /// Mirror every channel and register the result as `<name>_reversed`
    pub fn reverse(&mut self, name: &str) -> Result<AudioBuffer> {
        let source = self.get(name)?;
        let reversed = AudioBuffer {
            sample_rate: source.sample_rate,
            channels: source
                .channels
                .iter()
                .map(|c| c.iter().rev().copied().collect())
                .collect(),
        };
        let reversed_name = format!("{}_reversed", name);
        info!("Stored reversed sample '{}'", reversed_name);
        self.samples.insert(reversed_name, reversed.clone());
        Ok(reversed)
    }

    /// One slice, or every slice shuffled with a gap after each
    pub fn slice(&self, params: &SliceParams, rng: &mut impl RandomSource) -> Result<AudioBuffer> {
        let source = self.get(&params.sample_name)?;
        if params.slice_count == 0 {
            return Err(GenError::InvalidParameter("slice_count must be positive".into()));
        }
        if params.slice_count > source.len() {
            return Err(GenError::InvalidParameter(format!(
                "slice_count {} exceeds the {} samples of '{}'",
                params.slice_count,
                source.len(),
                params.sample_name
            )));
        }
        let slice_len = source.len() / params.slice_count;
        let segment =
            |idx: usize, channel: &[f32]| channel[idx * slice_len..(idx + 1) * slice_len].to_vec();

        if !params.random_order {
            if params.slice_index >= params.slice_count {
                return Err(GenError::InvalidParameter(format!(
                    "slice_index {} out of range for {} slices",
                    params.slice_index, params.slice_count
                )));
            }
            return Ok(AudioBuffer {
                sample_rate: source.sample_rate,
                channels: source
                    .channels
                    .iter()
                    .map(|c| segment(params.slice_index, c.as_slice()))
                    .collect(),
            });
        }

        check_max("total gap", params.gap * params.slice_count as f32, MAX_DURATION)?;
        let mut order: Vec<usize> = (0..params.slice_count).collect();
        rng.shuffle_slice(&mut order);
        let gap = vec![0.0; sample_count(params.gap, source.sample_rate)];
        let channels = source
            .channels
            .iter()
            .map(|c| {
                order
                    .iter()
                    .flat_map(|&idx| {
                        segment(idx, c.as_slice())
                            .into_iter()
                            .chain(gap.iter().copied())
                    })
                    .collect()
            })
            .collect();
        Ok(AudioBuffer {
            sample_rate: source.sample_rate,
            channels,
        })
    }

    /// Resonant filter with an optional exponential cutoff sweep
    pub fn filter(&self, params: &FilterParams) -> Result<AudioBuffer> {
        let source = self.get(&params.sample_name)?;
        if source.sample_rate == 0 {
            return Err(GenError::InvalidParameter(format!(
                "sample '{}' has no sample rate",
                params.sample_name
            )));
        }
        positive("cutoff_freq", params.cutoff_freq)?;
        let mut out = truncate_to(source.clone(), params.duration);
        let sweep = match params.cutoff_sweep {
            Some((start, end)) => CutoffSweep::new(start, end, out.duration()),
            None => CutoffSweep::constant(params.cutoff_freq),
        };
        for channel in &mut out.channels {
            apply_filter(channel, params.filter_type, sweep, params.resonance, out.sample_rate);
        }
        Ok(out)
    }

    /// Waveshaper distortion through [`distortion_curve`]
    pub fn distortion(&self, params: &DistortionParams) -> Result<AudioBuffer> {
        let source = self.get(&params.sample_name)?;
        let curve = distortion_curve(params.amount.max(0.0));
        let mut out = truncate_to(source.clone(), params.duration);
        for sample in out.channels.iter_mut().flatten() {
            *sample = shape(&curve, *sample);
        }
        Ok(out)
    }

    /// Quantize to `0.5^bit_depth` steps, holding each value for
    /// `sample_rate_reduction` samples
    pub fn bitcrush(&self, params: &BitcrushParams) -> Result<AudioBuffer> {
        let source = self.get(&params.sample_name)?;
        if !(1..=16).contains(&params.bit_depth) {
            return Err(GenError::InvalidParameter(format!(
                "bit_depth must be 1-16, got {}",
                params.bit_depth
            )));
        }
        let step = 0.5f32.powi(params.bit_depth as i32);
        let hold = params.sample_rate_reduction.max(1);
        let mut out = truncate_to(source.clone(), params.duration);
        for channel in &mut out.channels {
            let mut held = 0.0;
            for (i, sample) in channel.iter_mut().enumerate() {
                if i % hold == 0 {
                    held = (*sample / step).round() * step;
                }
                *sample = held;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::SeededRng;

    const TEST_SAMPLE_RATE: u32 = 8000;

    fn processor_with(name: &str, samples: Vec<f32>) -> SampleProcessor {
        let mut processor = SampleProcessor::new();
        processor.load(name, AudioBuffer::mono(TEST_SAMPLE_RATE, samples));
        processor
    }

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|i| i as f32 / len as f32).collect()
    }

    #[test]
    fn test_reverse_exact() {
        let mut processor = processor_with("blip", vec![0.1, 0.2, 0.3, 0.4]);
        let reversed = processor.reverse("blip").unwrap();
        assert_eq!(reversed.samples(), &[0.4, 0.3, 0.2, 0.1]);
        assert_eq!(processor.get("blip_reversed").unwrap(), &reversed);
        assert_eq!(processor.get("blip").unwrap().samples(), &[0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_missing_sample() {
        let mut processor = SampleProcessor::new();
        assert!(matches!(processor.reverse("nope"), Err(GenError::SampleNotFound(_))));
        let params = GranularParams {
            sample_name: "nope".into(),
            ..Default::default()
        };
        assert!(matches!(
            processor.granular(&params, &mut SeededRng::new(1)),
            Err(GenError::SampleNotFound(_))
        ));
        assert!(processor.sample_info().is_empty());
    }

    #[test]
    fn test_sample_info_sorted() {
        let mut processor = processor_with("b", vec![0.0; 8000]);
        processor.load("a", AudioBuffer::silent(TEST_SAMPLE_RATE, 2, 4000));
        let info = processor.sample_info();
        assert_eq!(info[0].name, "a");
        assert_eq!(info[0].channels, 2);
        assert!((info[0].duration - 0.5).abs() < 1e-6);
        assert_eq!(info[1].name, "b");
    }

    #[test]
    fn test_pitch_shift_octave_halves_length() {
        let processor = processor_with("tone", ramp(1000));
        let params = PitchShiftParams {
            sample_name: "tone".into(),
            semitones: 12.0,
            ..Default::default()
        };
        let out = processor.pitch_shift(&params).unwrap();
        assert_eq!(out.len(), 500);
        assert!((out.samples()[10] - 0.02).abs() < 1e-6);

        let clipped = PitchShiftParams {
            duration: Some(0.01),
            ..params
        };
        assert_eq!(processor.pitch_shift(&clipped).unwrap().len(), 80);
    }

    #[test]
    fn test_pitch_shift_envelope() {
        let processor = processor_with("dc", vec![1.0; 800]);
        let params = PitchShiftParams {
            sample_name: "dc".into(),
            envelope: Some(Envelope::new(0.01, 0.0, 1.0, 0.01)),
            ..Default::default()
        };
        let out = processor.pitch_shift(&params).unwrap();
        assert_eq!(out.samples()[0], 0.0);
        assert!((out.samples()[400] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_single_slice() {
        let processor = processor_with("r", ramp(80));
        let params = SliceParams {
            sample_name: "r".into(),
            slice_index: 2,
            ..Default::default()
        };
        let out = processor.slice(&params, &mut SeededRng::new(0)).unwrap();
        assert_eq!(out.len(), 10);
        assert_eq!(out.samples()[0], 20.0 / 80.0);

        let bad = SliceParams { slice_index: 8, ..params };
        assert!(matches!(
            processor.slice(&bad, &mut SeededRng::new(0)),
            Err(GenError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_random_slices_cover_source() {
        let processor = processor_with("r", ramp(80));
        let params = SliceParams {
            sample_name: "r".into(),
            random_order: true,
            gap: 0.001,
            ..Default::default()
        };
        let out = processor.slice(&params, &mut SeededRng::new(3)).unwrap();
        assert_eq!(out.len(), 8 * (10 + 8));
        let mut firsts: Vec<f32> = out.samples().chunks(18).map(|c| c[0]).collect();
        firsts.sort_by(f32::total_cmp);
        let expected: Vec<f32> = (0..8).map(|i| (i * 10) as f32 / 80.0).collect();
        assert_eq!(firsts, expected);
    }

    #[test]
    fn test_granular_is_stereo_and_seeded() {
        let tone: Vec<f32> = (0..8000).map(|i| (i as f32 * 0.05).sin()).collect();
        let processor = processor_with("tone", tone);
        let params = GranularParams {
            sample_name: "tone".into(),
            duration: 0.5,
            ..Default::default()
        };
        let a = processor.granular(&params, &mut SeededRng::new(9)).unwrap();
        let b = processor.granular(&params, &mut SeededRng::new(9)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.channel_count(), 2);
        assert_eq!(a.len(), 4000);
        assert!(a.peak() > 0.0);
    }

    #[test]
    fn test_granular_limits() {
        let processor = processor_with("tone", vec![0.5; 800]);
        let base = GranularParams {
            sample_name: "tone".into(),
            ..Default::default()
        };
        let too_long = GranularParams {
            duration: 1e9,
            ..base.clone()
        };
        let too_dense = GranularParams {
            grain_density: f32::MAX,
            ..base.clone()
        };
        for params in [too_long, too_dense] {
            assert!(matches!(
                processor.granular(&params, &mut SeededRng::new(1)),
                Err(GenError::InvalidParameter(_))
            ));
        }
        let longest = GranularParams {
            duration: MAX_DURATION,
            grain_density: 1.0,
            ..base
        };
        let out = processor.granular(&longest, &mut SeededRng::new(1)).unwrap();
        assert_eq!(out.len(), sample_count(MAX_DURATION, TEST_SAMPLE_RATE));
    }

    #[test]
    fn test_slice_limits() {
        let processor = processor_with("r", ramp(80));
        let params = SliceParams {
            sample_name: "r".into(),
            slice_count: 81,
            ..Default::default()
        };
        assert!(matches!(
            processor.slice(&params, &mut SeededRng::new(0)),
            Err(GenError::InvalidParameter(_))
        ));
        let long_gaps = SliceParams {
            slice_count: 80,
            random_order: true,
            gap: 1.0,
            ..params
        };
        assert!(matches!(
            processor.slice(&long_gaps, &mut SeededRng::new(0)),
            Err(GenError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_pitch_shift_length_capped() {
        let processor = processor_with("r", ramp(80));
        let params = PitchShiftParams {
            sample_name: "r".into(),
            semitones: -240.0,
            ..Default::default()
        };
        let out = processor.pitch_shift(&params).unwrap();
        assert_eq!(out.len(), sample_count(MAX_DURATION, TEST_SAMPLE_RATE));
    }

    #[test]
    fn test_distortion_curve() {
        let curve = distortion_curve(50.0);
        assert_eq!(curve.len(), DISTORTION_CURVE_LEN);
        assert!(curve[0] < 0.0);
        assert_eq!(curve[DISTORTION_CURVE_LEN / 2], 0.0);
        assert!(curve.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(shape(&curve, -1.0), curve[0]);
        assert_eq!(shape(&curve, 2.0), curve[DISTORTION_CURVE_LEN - 1]);
    }

    #[test]
    fn test_bitcrush_quantizes_and_holds() {
        let processor = processor_with("r", vec![0.1, 0.9, 0.9, 0.9, 0.3, 0.0]);
        let params = BitcrushParams {
            sample_name: "r".into(),
            bit_depth: 1,
            sample_rate_reduction: 4,
            duration: None,
        };
        let out = processor.bitcrush(&params).unwrap();
        assert_eq!(out.samples(), &[0.0, 0.0, 0.0, 0.0, 0.5, 0.5]);
    }

    #[test]
    fn test_filter_duration_truncates() {
        let processor = processor_with("noise", vec![0.5; 8000]);
        let params = FilterParams {
            sample_name: "noise".into(),
            cutoff_sweep: Some((4000.0, 200.0)),
            duration: Some(0.25),
            ..Default::default()
        };
        let out = processor.filter(&params).unwrap();
        assert_eq!(out.len(), 2000);
        assert!(out.samples().iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_filter_low_sample_rates() {
        let mut processor = SampleProcessor::new();
        processor.load("x", AudioBuffer::mono(32, vec![0.5; 64]));
        processor.load("unrated", AudioBuffer::mono(0, vec![0.5; 64]));
        let params = FilterParams {
            sample_name: "x".into(),
            ..Default::default()
        };
        let out = processor.filter(&params).unwrap();
        assert_eq!(out.len(), 64);
        assert!(out.samples().iter().all(|s| s.is_finite()));

        let params = FilterParams {
            sample_name: "unrated".into(),
            ..Default::default()
        };
        assert!(matches!(processor.filter(&params), Err(GenError::InvalidParameter(_))));
    }
}
