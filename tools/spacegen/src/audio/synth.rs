//! Offline synthesis engine
//!
//! Five methods, each a pure function of its parameter struct:
//!
//! - additive: summed sine harmonics under an ADSR envelope
//! - subtractive: seeded white or pink noise through a swept resonant filter
//! - FM: see [`FmParams`]
//! - pulse wave: band-limited pulse with an optional exponential pitch sweep
//! - physical: modal impact model (noise burst plus three decaying modes)
//!
//! Every method ends at a shared master gain stage.

use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::envelope::{Envelope, Percussive, exp_decay};
use super::filters::{CutoffSweep, FilterType, apply_filter};
use super::fm::FmParams;
use super::oscillators::{pink_noise, pulse, white_noise};
use super::{AudioBuffer, SAMPLE_RATE, sample_count};
use crate::error::{GenError, Result};
use crate::seed::SeededRng;

/// Master gain applied to offline renders
pub const MASTER_GAIN: f32 = 0.8;

/// Longest sound any method will render, in seconds
pub const MAX_DURATION: f32 = 60.0;

/// Harmonic weight used when fewer amplitudes than harmonics are given
const MISSING_HARMONIC_AMP: f32 = 0.1;

/// Impulse length of the physical model's strike
const IMPACT_NOISE: f32 = 0.01;

/// Time for the strike to fall to the decay floor
const IMPACT_DECAY: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthMethod {
    Additive,
    Subtractive,
    Fm,
    PulseWave,
    Physical,
}

impl SynthMethod {
    pub const ALL: [SynthMethod; 5] = [
        SynthMethod::Additive,
        SynthMethod::Subtractive,
        SynthMethod::Fm,
        SynthMethod::PulseWave,
        SynthMethod::Physical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SynthMethod::Additive => "additive",
            SynthMethod::Subtractive => "subtractive",
            SynthMethod::Fm => "fm",
            SynthMethod::PulseWave => "pulse_wave",
            SynthMethod::Physical => "physical",
        }
    }
}

impl FromStr for SynthMethod {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pulseWave" | "pulse" => Ok(SynthMethod::PulseWave),
            "physical_model" | "physicalModel" => Ok(SynthMethod::Physical),
            _ => SynthMethod::ALL
                .into_iter()
                .find(|m| m.as_str() == s)
                .ok_or_else(|| GenError::unknown("synthesis method", s)),
        }
    }
}

impl fmt::Display for SynthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseType {
    #[default]
    White,
    Pink,
}

impl FromStr for NoiseType {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "white" => Ok(NoiseType::White),
            "pink" => Ok(NoiseType::Pink),
            _ => Err(GenError::unknown("noise type", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    #[default]
    Metal,
    Wood,
    Glass,
}

impl Material {
    /// Resonant modes as `(frequency Hz, decay s, amplitude)`
    pub fn modes(self) -> [(f32, f32, f32); 3] {
        match self {
            Material::Metal => [(200.0, 0.5, 0.4), (450.0, 0.3, 0.3), (890.0, 0.2, 0.2)],
            Material::Wood => [(120.0, 0.4, 0.5), (280.0, 0.3, 0.3), (520.0, 0.2, 0.2)],
            Material::Glass => [(800.0, 0.6, 0.4), (1600.0, 0.4, 0.3), (2400.0, 0.2, 0.2)],
        }
    }
}

impl FromStr for Material {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "metal" => Ok(Material::Metal),
            "wood" => Ok(Material::Wood),
            "glass" => Ok(Material::Glass),
            _ => Err(GenError::unknown("material", s)),
        }
    }
}

/// Exponential glide between two frequencies across the whole sound
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchSweep {
    pub start_freq: f32,
    pub end_freq: f32,
}

impl PitchSweep {
    pub fn new(start_freq: f32, end_freq: f32) -> Self {
        Self {
            start_freq,
            end_freq,
        }
    }

    fn at(&self, progress: f32) -> f32 {
        self.start_freq * (self.end_freq / self.start_freq).powf(progress)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditiveParams {
    pub frequency: f32,
    pub duration: f32,
    /// Multiples of `frequency`
    pub harmonics: Vec<f32>,
    pub harmonic_amplitudes: Vec<f32>,
    pub envelope: Envelope,
}

impl Default for AdditiveParams {
    fn default() -> Self {
        Self {
            frequency: 440.0,
            duration: 0.5,
            harmonics: vec![1.0, 2.0, 3.0],
            harmonic_amplitudes: vec![0.6, 0.3, 0.1],
            envelope: Envelope::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtractiveParams {
    pub duration: f32,
    pub noise_type: NoiseType,
    pub filter_type: FilterType,
    pub filter_cutoff_start: f32,
    pub filter_cutoff_end: f32,
    pub filter_resonance: f32,
    /// Linear attack; the exponential decay runs to the end of the sound
    pub attack: f32,
    /// Noise stream seed
    pub seed: u32,
}

impl Default for SubtractiveParams {
    fn default() -> Self {
        Self {
            duration: 1.0,
            noise_type: NoiseType::White,
            filter_type: FilterType::Lowpass,
            filter_cutoff_start: 8000.0,
            filter_cutoff_end: 200.0,
            filter_resonance: 10.0,
            attack: 0.01,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseParams {
    pub frequency: f32,
    pub duration: f32,
    /// Duty cycle; 0.5 is a square
    pub pulse_width: f32,
    pub pitch_sweep: Option<PitchSweep>,
    pub envelope: Envelope,
}

impl Default for PulseParams {
    fn default() -> Self {
        Self {
            frequency: 440.0,
            duration: 0.3,
            pulse_width: 0.5,
            pitch_sweep: None,
            envelope: Envelope::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalParams {
    /// Strike strength; scales both mode pitch and amplitude
    pub force: f32,
    pub material: Material,
    /// Nominal duration; the render lasts as long as the slowest mode
    pub duration: f32,
    pub seed: u32,
}

impl Default for PhysicalParams {
    fn default() -> Self {
        Self {
            force: 1.0,
            material: Material::Metal,
            duration: 0.5,
            seed: 0,
        }
    }
}

/// A synthesis method together with its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "snake_case")]
pub enum SynthParams {
    Additive(AdditiveParams),
    Subtractive(SubtractiveParams),
    Fm(FmParams),
    #[serde(alias = "pulseWave")]
    PulseWave(PulseParams),
    #[serde(alias = "physical_model")]
    Physical(PhysicalParams),
}

impl SynthParams {
    pub fn method(&self) -> SynthMethod {
        match self {
            SynthParams::Additive(_) => SynthMethod::Additive,
            SynthParams::Subtractive(_) => SynthMethod::Subtractive,
            SynthParams::Fm(_) => SynthMethod::Fm,
            SynthParams::PulseWave(_) => SynthMethod::PulseWave,
            SynthParams::Physical(_) => SynthMethod::Physical,
        }
    }

    /// Default parameters for a method
    pub fn defaults(method: SynthMethod) -> Self {
        match method {
            SynthMethod::Additive => SynthParams::Additive(AdditiveParams::default()),
            SynthMethod::Subtractive => SynthParams::Subtractive(SubtractiveParams::default()),
            SynthMethod::Fm => SynthParams::Fm(FmParams::default()),
            SynthMethod::PulseWave => SynthParams::PulseWave(PulseParams::default()),
            SynthMethod::Physical => SynthParams::Physical(PhysicalParams::default()),
        }
    }

    /// Nominal duration in seconds
    pub fn duration(&self) -> f32 {
        match self {
            SynthParams::Additive(p) => p.duration,
            SynthParams::Subtractive(p) => p.duration,
            SynthParams::Fm(p) => p.duration,
            SynthParams::PulseWave(p) => p.duration,
            SynthParams::Physical(p) => p.duration,
        }
    }

    fn validate(&self) -> Result<()> {
        let duration = self.duration();
        if !(duration > 0.0 && duration <= MAX_DURATION) {
            return Err(GenError::InvalidParameter(format!(
                "duration must be in (0, {}] seconds, got {}",
                MAX_DURATION, duration
            )));
        }
        let positive = |name: &str, v: f32| {
            if v > 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(GenError::InvalidParameter(format!("{} must be positive, got {}", name, v)))
            }
        };
        match self {
            SynthParams::Additive(p) => positive("frequency", p.frequency),
            SynthParams::Subtractive(p) => {
                positive("filter_cutoff_start", p.filter_cutoff_start)?;
                positive("filter_cutoff_end", p.filter_cutoff_end)
            }
            SynthParams::Fm(p) => {
                positive("carrier_freq", p.carrier_freq)?;
                positive("modulator_freq", p.modulator_freq)
            }
            SynthParams::PulseWave(p) => match p.pitch_sweep {
                Some(sweep) => {
                    positive("start_freq", sweep.start_freq)?;
                    positive("end_freq", sweep.end_freq)
                }
                None => positive("frequency", p.frequency),
            },
            SynthParams::Physical(p) => positive("force", p.force),
        }
    }
}

/// Offline renderer with a master gain stage
#[derive(Debug, Clone, Copy)]
pub struct Synth {
    sample_rate: u32,
    master_gain: f32,
}

impl Default for Synth {
    fn default() -> Self {
        Self::new(SAMPLE_RATE)
    }
}

impl Synth {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            master_gain: MASTER_GAIN,
        }
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.master_gain = gain.clamp(0.0, 1.0);
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Validate and render any method
    pub fn synthesize(&self, params: &SynthParams) -> Result<AudioBuffer> {
        params.validate()?;
        let buffer = match params {
            SynthParams::Additive(p) => self.additive(p),
            SynthParams::Subtractive(p) => self.subtractive(p),
            SynthParams::Fm(p) => self.fm(p),
            SynthParams::PulseWave(p) => self.pulse_wave(p),
            SynthParams::Physical(p) => self.physical(p),
        };
        debug!(
            "Synthesized {} ({} samples, peak {:.3})",
            params.method(),
            buffer.len(),
            buffer.peak()
        );
        Ok(buffer)
    }

    fn output(&self, mut samples: Vec<f32>) -> AudioBuffer {
        for sample in &mut samples {
            *sample *= self.master_gain;
        }
        AudioBuffer::mono(self.sample_rate, samples)
    }

    pub fn additive(&self, params: &AdditiveParams) -> AudioBuffer {
        let sr = self.sample_rate as f32;
        let partials: Vec<(f32, f32)> = params
            .harmonics
            .iter()
            .enumerate()
            .map(|(i, &h)| {
                let amp = params
                    .harmonic_amplitudes
                    .get(i)
                    .copied()
                    .unwrap_or(MISSING_HARMONIC_AMP);
                (TAU * params.frequency * h / sr, amp)
            })
            .collect();

        let samples = (0..sample_count(params.duration, self.sample_rate))
            .map(|i| {
                let t = i as f32 / sr;
                let sum: f32 = partials
                    .iter()
                    .map(|&(omega, amp)| amp * (omega * i as f32).sin())
                    .sum();
                sum * params.envelope.level(t, params.duration)
            })
            .collect();
        self.output(samples)
    }

    pub fn subtractive(&self, params: &SubtractiveParams) -> AudioBuffer {
        let len = sample_count(params.duration, self.sample_rate);
        let mut rng = SeededRng::new(params.seed);
        let mut samples = match params.noise_type {
            NoiseType::White => white_noise(len, &mut rng),
            NoiseType::Pink => pink_noise(len, &mut rng),
        };

        let sweep = CutoffSweep::new(
            params.filter_cutoff_start,
            params.filter_cutoff_end.max(20.0),
            params.duration * 0.7,
        );
        apply_filter(
            &mut samples,
            params.filter_type,
            sweep,
            params.filter_resonance,
            self.sample_rate,
        );

        let envelope = Percussive::new(params.attack, 1.0);
        let sr = self.sample_rate as f32;
        for (i, sample) in samples.iter_mut().enumerate() {
            *sample *= envelope.level(i as f32 / sr, params.duration);
        }
        self.output(samples)
    }

    pub fn fm(&self, params: &FmParams) -> AudioBuffer {
        self.output(params.render(self.sample_rate))
    }

    pub fn pulse_wave(&self, params: &PulseParams) -> AudioBuffer {
        let sr = self.sample_rate as f32;
        let mut phase = 0.0f32;
        let samples = (0..sample_count(params.duration, self.sample_rate))
            .map(|i| {
                let t = i as f32 / sr;
                let freq = match params.pitch_sweep {
                    Some(sweep) => sweep.at(t / params.duration),
                    None => params.frequency,
                };
                let out =
                    pulse(phase, params.pulse_width) * params.envelope.level(t, params.duration);
                phase = (phase + TAU * freq / sr) % TAU;
                out
            })
            .collect();
        self.output(samples)
    }

    /// Modal impact. The buffer lasts exactly as long as the slowest mode.
    pub fn physical(&self, params: &PhysicalParams) -> AudioBuffer {
        let sr = self.sample_rate as f32;
        let modes = params.material.modes();
        let length = modes.iter().fold(0.0f32, |m, &(_, decay, _)| m.max(decay));
        let mut samples = vec![0.0f32; sample_count(length, self.sample_rate)];

        let mut rng = SeededRng::new(params.seed);
        let strike = white_noise(sample_count(IMPACT_NOISE, self.sample_rate), &mut rng);
        for (i, (out, noise)) in samples.iter_mut().zip(&strike).enumerate() {
            *out += noise * exp_decay(params.force, i as f32 / sr, IMPACT_DECAY);
        }

        for (freq, decay, amp) in modes {
            let omega = TAU * freq * params.force / sr;
            let end = sample_count(decay, self.sample_rate).min(samples.len());
            for (i, out) in samples[..end].iter_mut().enumerate() {
                let t = i as f32 / sr;
                *out += (omega * i as f32).sin() * exp_decay(amp * params.force, t, decay);
            }
        }
        self.output(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SAMPLE_RATE: u32 = 44100;

    fn synth() -> Synth {
        Synth::new(TEST_SAMPLE_RATE)
    }

    #[test]
    fn test_envelope_duration_bound() {
        let s = synth();
        for duration in [0.05f32, 0.3, 0.8, 1.234] {
            let expected = (duration as f64 * TEST_SAMPLE_RATE as f64).round() as usize;
            let additive = s.additive(&AdditiveParams {
                duration,
                ..Default::default()
            });
            let pulse = s.pulse_wave(&PulseParams {
                duration,
                ..Default::default()
            });
            let subtractive = s.subtractive(&SubtractiveParams {
                duration,
                ..Default::default()
            });
            for buffer in [additive, pulse, subtractive] {
                assert!(buffer.len().abs_diff(expected) <= 1, "{} vs {}", buffer.len(), expected);
            }
        }
    }

    #[test]
    fn test_additive_starts_and_ends_silent() {
        let buffer = synth().additive(&AdditiveParams::default());
        let samples = buffer.samples();
        assert_eq!(samples[0], 0.0);
        assert!(samples[samples.len() - 1].abs() < 0.01);
        assert!(buffer.peak() <= MASTER_GAIN + 1e-4);
    }

    #[test]
    fn test_subtractive_deterministic_per_seed() {
        let params = SubtractiveParams {
            noise_type: NoiseType::Pink,
            duration: 0.2,
            ..Default::default()
        };
        let a = synth().subtractive(&params);
        assert_eq!(a, synth().subtractive(&params));
        let b = synth().subtractive(&SubtractiveParams { seed: 1, ..params });
        assert_ne!(a, b);
    }

    #[test]
    fn test_physical_length_is_longest_mode() {
        let glass = synth().physical(&PhysicalParams {
            material: Material::Glass,
            duration: 0.1,
            ..Default::default()
        });
        assert_eq!(glass.len(), (0.6 * TEST_SAMPLE_RATE as f32).round() as usize);
        let wood = synth().physical(&PhysicalParams {
            material: Material::Wood,
            ..Default::default()
        });
        assert_eq!(wood.len(), (0.4 * TEST_SAMPLE_RATE as f32).round() as usize);
    }

    #[test]
    fn test_pulse_sweep_changes_output() {
        let plain = synth().pulse_wave(&PulseParams::default());
        let swept = synth().pulse_wave(&PulseParams {
            pitch_sweep: Some(PitchSweep::new(800.0, 200.0)),
            ..Default::default()
        });
        assert_eq!(plain.len(), swept.len());
        assert_ne!(plain, swept);
    }

    #[test]
    fn test_master_gain() {
        let quiet = synth().with_gain(0.4).fm(&FmParams::default());
        let loud = synth().fm(&FmParams::default());
        for (q, l) in quiet.samples().iter().zip(loud.samples()) {
            assert!((q * 2.0 - l).abs() < 1e-6);
        }
    }

    #[test]
    fn test_synthesize_validates() {
        let s = synth();
        let bad = SynthParams::Additive(AdditiveParams {
            duration: 0.0,
            ..Default::default()
        });
        assert!(matches!(s.synthesize(&bad), Err(GenError::InvalidParameter(_))));
        let huge = SynthParams::Fm(FmParams::new(100.0, 10.0, 1.0, 3600.0));
        assert!(s.synthesize(&huge).is_err());
        let ok = SynthParams::defaults(SynthMethod::Physical);
        assert!(!s.synthesize(&ok).unwrap().is_empty());
    }

    #[test]
    fn test_params_json_shape() {
        let json = r#"{"method": "pulseWave", "params": {"frequency": 200, "pulse_width": 0.25}}"#;
        let params: SynthParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.method(), SynthMethod::PulseWave);
        let SynthParams::PulseWave(pulse) = params else {
            unreachable!()
        };
        assert_eq!(pulse.frequency, 200.0);
        assert_eq!(pulse.duration, 0.3);
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("physicalModel".parse::<SynthMethod>().unwrap(), SynthMethod::Physical);
        assert_eq!("pulse_wave".parse::<SynthMethod>().unwrap(), SynthMethod::PulseWave);
        assert!("granular".parse::<SynthMethod>().is_err());
        assert!("steel".parse::<Material>().is_err());
    }
}
