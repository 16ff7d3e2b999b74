//! Resonant biquad filters with exponential cutoff sweeps
//!
//! Coefficients follow the usual audio-cookbook forms. Low- and high-pass
//! take their resonance in dB; band-pass takes a linear Q.

use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result};

/// Cutoff automation is re-evaluated once per block of this many samples
const SWEEP_BLOCK: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    #[default]
    Lowpass,
    Highpass,
    Bandpass,
}

impl FilterType {
    pub const ALL: [FilterType; 3] = [
        FilterType::Lowpass,
        FilterType::Highpass,
        FilterType::Bandpass,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::Lowpass => "lowpass",
            FilterType::Highpass => "highpass",
            FilterType::Bandpass => "bandpass",
        }
    }
}

impl FromStr for FilterType {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self> {
        FilterType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| GenError::unknown("filter type", s))
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direct-form I biquad
#[derive(Debug, Clone)]
pub struct Biquad {
    filter_type: FilterType,
    q: f32,
    sample_rate: u32,
    b: [f32; 3],
    a: [f32; 2],
    x: [f32; 2],
    y: [f32; 2],
}

impl Biquad {
    pub fn new(filter_type: FilterType, cutoff: f32, q: f32, sample_rate: u32) -> Self {
        let mut filter = Self {
            filter_type,
            q,
            sample_rate,
            b: [1.0, 0.0, 0.0],
            a: [0.0, 0.0],
            x: [0.0; 2],
            y: [0.0; 2],
        };
        filter.set_cutoff(cutoff);
        filter
    }

    /// Recompute coefficients, keeping the delay line
    pub fn set_cutoff(&mut self, cutoff: f32) {
        // At very low rates the Nyquist bound wins over the 20 Hz floor
        let nyquist = self.sample_rate as f32 * 0.49;
        let cutoff = cutoff.max(20.0).min(nyquist);
        let omega = TAU * cutoff / self.sample_rate as f32;
        let (sin, cos) = omega.sin_cos();

        let (b0, b1, b2, alpha) = match self.filter_type {
            FilterType::Lowpass => {
                let alpha = sin / (2.0 * 10f32.powf(self.q / 20.0));
                ((1.0 - cos) / 2.0, 1.0 - cos, (1.0 - cos) / 2.0, alpha)
            }
            FilterType::Highpass => {
                let alpha = sin / (2.0 * 10f32.powf(self.q / 20.0));
                ((1.0 + cos) / 2.0, -(1.0 + cos), (1.0 + cos) / 2.0, alpha)
            }
            FilterType::Bandpass => {
                let alpha = sin / (2.0 * self.q.max(1e-4));
                (alpha, 0.0, -alpha, alpha)
            }
        };
        let a0 = 1.0 + alpha;
        self.b = [b0 / a0, b1 / a0, b2 / a0];
        self.a = [-2.0 * cos / a0, (1.0 - alpha) / a0];
    }

    pub fn process(&mut self, x0: f32) -> f32 {
        let y0 = self.b[0] * x0 + self.b[1] * self.x[0] + self.b[2] * self.x[1]
            - self.a[0] * self.y[0]
            - self.a[1] * self.y[1];
        self.x = [x0, self.x[0]];
        self.y = [y0, self.y[0]];
        y0
    }
}

/// Exponential cutoff glide from `start` to `end` Hz over `time` seconds,
/// holding `end` afterwards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutoffSweep {
    pub start: f32,
    pub end: f32,
    pub time: f32,
}

impl CutoffSweep {
    pub fn new(start: f32, end: f32, time: f32) -> Self {
        Self { start, end, time }
    }

    /// Fixed cutoff
    pub fn constant(cutoff: f32) -> Self {
        Self::new(cutoff, cutoff, 0.0)
    }

    pub fn cutoff_at(&self, t: f32) -> f32 {
        if self.time <= 0.0 || t >= self.time {
            return self.end;
        }
        let start = self.start.max(1e-3);
        let end = self.end.max(1e-3);
        start * (end / start).powf(t / self.time)
    }
}

/// Filter samples in place, following `sweep`
pub fn apply_filter(
    samples: &mut [f32],
    filter_type: FilterType,
    sweep: CutoffSweep,
    q: f32,
    sample_rate: u32,
) {
    let mut filter = Biquad::new(filter_type, sweep.start, q, sample_rate);
    for (block, chunk) in samples.chunks_mut(SWEEP_BLOCK).enumerate() {
        let t = (block * SWEEP_BLOCK) as f32 / sample_rate as f32;
        filter.set_cutoff(sweep.cutoff_at(t));
        for sample in chunk {
            *sample = filter.process(*sample);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SAMPLE_RATE: u32 = 44100;

    fn two_tone() -> Vec<f32> {
        (0..4410)
            .map(|i| {
                let t = i as f32 / TEST_SAMPLE_RATE as f32;
                (TAU * 100.0 * t).sin() + (TAU * 8000.0 * t).sin()
            })
            .collect()
    }

    fn energy(samples: &[f32]) -> f32 {
        samples.iter().map(|s| s * s).sum()
    }

    #[test]
    fn test_low_pass_removes_highs() {
        let mut samples = two_tone();
        let before = energy(&samples);
        apply_filter(
            &mut samples,
            FilterType::Lowpass,
            CutoffSweep::constant(500.0),
            0.0,
            TEST_SAMPLE_RATE,
        );
        let after = energy(&samples);
        assert!(after < before * 0.7);
        assert!(after > before * 0.3);
    }

    #[test]
    fn test_high_pass_removes_lows() {
        let mut samples = two_tone();
        let before = energy(&samples);
        apply_filter(
            &mut samples,
            FilterType::Highpass,
            CutoffSweep::constant(3000.0),
            0.0,
            TEST_SAMPLE_RATE,
        );
        assert!(energy(&samples) < before * 0.7);
    }

    #[test]
    fn test_band_pass_attenuates_both_sides() {
        let mut samples = two_tone();
        let before = energy(&samples);
        apply_filter(
            &mut samples,
            FilterType::Bandpass,
            CutoffSweep::constant(1000.0),
            2.0,
            TEST_SAMPLE_RATE,
        );
        assert!(energy(&samples) < before * 0.2);
    }

    #[test]
    fn test_sweep_curve() {
        let sweep = CutoffSweep::new(8000.0, 200.0, 0.7);
        assert_eq!(sweep.cutoff_at(0.0), 8000.0);
        assert!((sweep.cutoff_at(0.35) - 1264.9).abs() < 1.0);
        assert_eq!(sweep.cutoff_at(0.7), 200.0);
        assert_eq!(sweep.cutoff_at(5.0), 200.0);
    }

    #[test]
    fn test_filter_type_parse() {
        assert_eq!("bandpass".parse::<FilterType>().unwrap(), FilterType::Bandpass);
        assert!(matches!(
            "notch".parse::<FilterType>(),
            Err(GenError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn test_sub_audio_sample_rate() {
        let mut samples = vec![0.5; 64];
        apply_filter(
            &mut samples,
            FilterType::Lowpass,
            CutoffSweep::constant(1000.0),
            0.0,
            32,
        );
        assert!(samples.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_empty_input() {
        let mut samples: Vec<f32> = vec![];
        apply_filter(
            &mut samples,
            FilterType::Lowpass,
            CutoffSweep::constant(1000.0),
            1.0,
            TEST_SAMPLE_RATE,
        );
        assert!(samples.is_empty());
    }
}
