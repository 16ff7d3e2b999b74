//! Two-operator FM voice
//!
//! A sine modulator drives the carrier's instantaneous frequency:
//!
//! `f(t) = carrier + index * modulator * sin(2pi * modulator * t)`
//!
//! Low indices give soft bell tones; higher ones add sidebands and a harsher,
//! metallic edge.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use super::envelope::Percussive;
use super::sample_count;

/// Peak gain of the FM envelope
const FM_PEAK: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FmParams {
    pub carrier_freq: f32,
    pub modulator_freq: f32,
    /// Frequency deviation in multiples of the modulator frequency
    pub modulation_index: f32,
    pub duration: f32,
    /// Linear attack time; the decay runs to the end of the sound
    pub attack: f32,
}

impl Default for FmParams {
    fn default() -> Self {
        Self {
            carrier_freq: 1000.0,
            modulator_freq: 300.0,
            modulation_index: 2.0,
            duration: 0.1,
            attack: 0.005,
        }
    }
}

impl FmParams {
    pub fn new(
        carrier_freq: f32,
        modulator_freq: f32,
        modulation_index: f32,
        duration: f32,
    ) -> Self {
        Self {
            carrier_freq,
            modulator_freq,
            modulation_index,
            duration,
            ..Default::default()
        }
    }

    pub fn with_attack(mut self, attack: f32) -> Self {
        self.attack = attack;
        self
    }

    /// Render the voice before the master gain stage
    pub(crate) fn render(&self, sample_rate: u32) -> Vec<f32> {
        let sr = sample_rate as f32;
        let envelope = Percussive::new(self.attack, FM_PEAK);
        let deviation = self.modulation_index * self.modulator_freq;
        let mod_omega = TAU * self.modulator_freq / sr;

        let mut phase = 0.0f32;
        (0..sample_count(self.duration, sample_rate))
            .map(|i| {
                let out = phase.sin() * envelope.level(i as f32 / sr, self.duration);
                let freq = self.carrier_freq + deviation * (mod_omega * i as f32).sin();
                phase = (phase + TAU * freq / sr) % TAU;
                out
            })
            .collect()
    }
}
