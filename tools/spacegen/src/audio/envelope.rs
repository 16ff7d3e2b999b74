//! Amplitude envelopes
//!
//! Both shapes follow automation-curve semantics: linear ramps between
//! breakpoints, exponential ramps as `v1 * (v2 / v1)^progress`.

use serde::{Deserialize, Serialize};

/// Floor that exponential decays head towards
pub(crate) const DECAY_FLOOR: f32 = 0.01;

/// Attack-Decay-Sustain-Release envelope
///
/// - 0 -> 1 over `attack`
/// - 1 -> `sustain` over `decay`
/// - hold until `duration - release`
/// - -> 0 at `duration`
///
/// All times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    pub attack: f32,
    pub decay: f32,
    /// Sustain level (0.0 to 1.0)
    pub sustain: f32,
    pub release: f32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.5,
            release: 0.1,
        }
    }
}

impl Envelope {
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack: attack.max(0.0),
            decay: decay.max(0.0),
            sustain: sustain.clamp(0.0, 1.0),
            release: release.max(0.0),
        }
    }

    /// Level of the attack/decay/sustain part at time `t`
    fn held_level(&self, t: f32) -> f32 {
        if t < self.attack {
            t / self.attack
        } else if t < self.attack + self.decay {
            let progress = (t - self.attack) / self.decay;
            1.0 - progress * (1.0 - self.sustain)
        } else {
            self.sustain
        }
    }

    /// Gain at time `t` of a sound lasting `duration`
    pub fn level(&self, t: f32, duration: f32) -> f32 {
        if t >= duration {
            return 0.0;
        }
        let release_start = (duration - self.release).max(0.0);
        if t < release_start {
            return self.held_level(t);
        }
        let start = self.held_level(release_start);
        if self.release <= 0.0 {
            return start;
        }
        let progress = (t - release_start) / (duration - release_start);
        start * (1.0 - progress)
    }

    /// Multiply samples by the envelope, taking the slice length as the duration
    pub fn apply(&self, samples: &mut [f32], sample_rate: u32) {
        let duration = samples.len() as f32 / sample_rate as f32;
        for (i, sample) in samples.iter_mut().enumerate() {
            *sample *= self.level(i as f32 / sample_rate as f32, duration);
        }
    }
}

/// Linear attack to `peak`, then an exponential fall to 0.01 at the end of the sound
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Percussive {
    pub attack: f32,
    pub peak: f32,
}

impl Default for Percussive {
    fn default() -> Self {
        Self {
            attack: 0.01,
            peak: 1.0,
        }
    }
}

impl Percussive {
    pub fn new(attack: f32, peak: f32) -> Self {
        Self {
            attack: attack.max(0.0),
            peak,
        }
    }

    pub fn level(&self, t: f32, duration: f32) -> f32 {
        if self.peak <= 0.0 {
            return 0.0;
        }
        if t < self.attack {
            return self.peak * t / self.attack;
        }
        let span = duration - self.attack;
        if span <= 0.0 {
            return self.peak;
        }
        let progress = ((t - self.attack) / span).min(1.0);
        self.peak * (DECAY_FLOOR / self.peak).powf(progress)
    }
}

/// Exponential fall from `start` to 0.01 over `time`
pub(crate) fn exp_decay(start: f32, t: f32, time: f32) -> f32 {
    if start <= 0.0 {
        return 0.0;
    }
    if time <= 0.0 {
        return DECAY_FLOOR;
    }
    start * (DECAY_FLOOR / start).powf((t / time).min(1.0))
}
