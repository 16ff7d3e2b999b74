//! Named sound effect presets

use std::sync::LazyLock;

use serde::Serialize;

use super::AudioBuffer;
use super::envelope::Envelope;
use super::filters::FilterType;
use super::fm::FmParams;
use super::synth::{
    AdditiveParams, Material, NoiseType, PhysicalParams, PitchSweep, PulseParams, SubtractiveParams,
    Synth, SynthParams,
};
use crate::error::{GenError, Result};
use crate::seed::RandomSource;

pub const SFX_CATEGORIES: [&str; 6] = ["weapons", "impacts", "ui", "engines", "misc", "retro"];

/// A synthesis recipe with a display name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SfxPreset {
    pub key: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub params: SynthParams,
}

fn preset(
    key: &'static str,
    name: &'static str,
    category: &'static str,
    params: SynthParams,
) -> SfxPreset {
    SfxPreset {
        key,
        name,
        category,
        params,
    }
}

fn additive(
    frequency: f32,
    duration: f32,
    partials: &[(f32, f32)],
    envelope: Envelope,
) -> SynthParams {
    SynthParams::Additive(AdditiveParams {
        frequency,
        duration,
        harmonics: partials.iter().map(|p| p.0).collect(),
        harmonic_amplitudes: partials.iter().map(|p| p.1).collect(),
        envelope,
    })
}

fn noise(
    duration: f32,
    noise_type: NoiseType,
    filter_type: FilterType,
    cutoff: (f32, f32),
    resonance: f32,
    attack: f32,
) -> SynthParams {
    SynthParams::Subtractive(SubtractiveParams {
        duration,
        noise_type,
        filter_type,
        filter_cutoff_start: cutoff.0,
        filter_cutoff_end: cutoff.1,
        filter_resonance: resonance,
        attack,
        seed: 0,
    })
}

fn fm(carrier: f32, modulator: f32, index: f32, duration: f32, attack: f32) -> SynthParams {
    SynthParams::Fm(FmParams::new(carrier, modulator, index, duration).with_attack(attack))
}

fn pulse(
    frequency: f32,
    duration: f32,
    width: f32,
    sweep: Option<(f32, f32)>,
    envelope: Envelope,
) -> SynthParams {
    SynthParams::PulseWave(PulseParams {
        frequency,
        duration,
        pulse_width: width,
        pitch_sweep: sweep.map(|(start, end)| PitchSweep::new(start, end)),
        envelope,
    })
}

fn impact(force: f32, material: Material, duration: f32) -> SynthParams {
    SynthParams::Physical(PhysicalParams {
        force,
        material,
        duration,
        seed: 0,
    })
}

fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Envelope {
    Envelope::new(attack, decay, sustain, release)
}

#[rustfmt::skip]
static PRESETS: LazyLock<Vec<SfxPreset>> = LazyLock::new(|| {
    use FilterType::*;
    use Material::*;
    use NoiseType::*;

    vec![
        // Weapons
        preset("laser_basic", "Laser (Basic)", "weapons",
            pulse(440.0, 0.3, 0.5, Some((800.0, 200.0)), adsr(0.001, 0.05, 0.3, 0.1))),
        preset("laser_charged", "Laser (Charged)", "weapons",
            additive(220.0, 0.8, &[(1.0, 0.5), (2.0, 0.3), (3.0, 0.2), (4.0, 0.1)], adsr(0.2, 0.1, 0.6, 0.1))),
        preset("missile_launch", "Missile Launch", "weapons",
            noise(0.5, Pink, Lowpass, (4000.0, 800.0), 5.0, 0.01)),
        preset("cannon_fire", "Cannon Fire", "weapons", impact(1.2, Metal, 0.3)),
        preset("plasma_shot", "Plasma Shot", "weapons", fm(600.0, 150.0, 3.0, 0.4, 0.01)),
        preset("torpedo_launch", "Torpedo Launch", "weapons",
            noise(0.8, Pink, Lowpass, (3000.0, 400.0), 6.0, 0.02)),
        // Impacts
        preset("explosion_small", "Explosion (Small)", "impacts",
            noise(0.8, White, Lowpass, (8000.0, 200.0), 8.0, 0.01)),
        preset("explosion_large", "Explosion (Large)", "impacts",
            noise(1.5, White, Lowpass, (10000.0, 50.0), 15.0, 0.02)),
        preset("hull_hit", "Hull Impact", "impacts", impact(0.8, Metal, 0.4)),
        preset("shield_hit", "Shield Hit", "impacts", fm(1200.0, 400.0, 2.5, 0.3, 0.005)),
        preset("asteroid_impact", "Asteroid Impact", "impacts", impact(1.5, Wood, 0.4)),
        // UI
        preset("ui_click", "UI Click", "ui", fm(1000.0, 300.0, 2.0, 0.05, 0.005)),
        preset("ui_hover", "UI Hover", "ui", pulse(800.0, 0.08, 0.3, None, adsr(0.01, 0.02, 0.3, 0.04))),
        preset("ui_confirm", "UI Confirm", "ui",
            additive(523.0, 0.2, &[(1.0, 0.7), (2.0, 0.3)], adsr(0.01, 0.05, 0.5, 0.1))),
        preset("ui_cancel", "UI Cancel", "ui", pulse(200.0, 0.15, 0.5, None, adsr(0.01, 0.05, 0.3, 0.08))),
        preset("ui_error", "UI Error", "ui",
            pulse(150.0, 0.3, 0.5, Some((200.0, 100.0)), adsr(0.01, 0.1, 0.4, 0.1))),
        preset("scanner_ping", "Scanner Ping", "ui", fm(1500.0, 750.0, 1.0, 0.6, 0.005)),
        // Engines
        preset("engine_idle", "Engine Idle", "engines",
            noise(2.0, Pink, Bandpass, (150.0, 180.0), 20.0, 0.3)),
        preset("engine_thrust", "Engine Thrust", "engines",
            noise(1.5, White, Lowpass, (2000.0, 5000.0), 5.0, 0.1)),
        preset("warp_jump", "Warp Jump", "engines",
            pulse(100.0, 2.0, 0.5, Some((100.0, 2000.0)), adsr(0.5, 0.5, 0.6, 0.5))),
        // Ambient and misc
        preset("cargo_pickup", "Cargo Pickup", "misc",
            additive(659.0, 0.25, &[(1.0, 0.6), (2.0, 0.3), (3.0, 0.1)], adsr(0.02, 0.08, 0.4, 0.1))),
        preset("cargo_eject", "Cargo Eject", "misc",
            pulse(400.0, 0.3, 0.5, Some((400.0, 200.0)), adsr(0.01, 0.1, 0.3, 0.1))),
        preset("mining_laser", "Mining Laser", "misc",
            additive(
                320.0,
                1.5,
                &[(1.0, 0.5), (2.0, 0.25), (3.0, 0.15), (4.0, 0.08), (5.0, 0.02)],
                adsr(0.05, 0.2, 0.7, 0.3),
            )),
        preset("ore_depleted", "Ore Depleted", "misc", fm(300.0, 100.0, 1.5, 0.5, 0.05)),
        preset("autopilot_engage", "Autopilot Engage", "misc",
            additive(440.0, 0.4, &[(1.0, 0.6), (2.0, 0.4)], adsr(0.05, 0.1, 0.5, 0.15))),
        preset("alarm_critical", "Alarm (Critical)", "misc",
            pulse(800.0, 0.5, 0.5, None, adsr(0.01, 0.1, 0.6, 0.1))),
        // 8-bit retro
        preset("retro_jump", "8-bit Jump", "retro",
            pulse(400.0, 0.3, 0.25, Some((400.0, 800.0)), adsr(0.01, 0.1, 0.3, 0.1))),
        preset("retro_coin", "8-bit Coin", "retro", pulse(988.0, 0.2, 0.125, None, adsr(0.01, 0.05, 0.4, 0.1))),
        preset("retro_powerup", "8-bit Powerup", "retro",
            pulse(523.0, 0.4, 0.25, Some((523.0, 1047.0)), adsr(0.02, 0.1, 0.5, 0.15))),
        preset("retro_explosion", "8-bit Explosion", "retro",
            noise(0.6, White, Lowpass, (3000.0, 100.0), 2.0, 0.005)),
    ]
});

/// Every preset, grouped by category
pub fn sfx_presets() -> &'static [SfxPreset] {
    &PRESETS
}

pub fn sfx_preset(key: &str) -> Result<&'static SfxPreset> {
    PRESETS
        .iter()
        .find(|p| p.key == key)
        .ok_or_else(|| GenError::unknown("sfx preset", key))
}

/// Render a preset at the offline sample rate
pub fn generate_sfx(key: &str) -> Result<AudioBuffer> {
    Synth::default().synthesize(&sfx_preset(key)?.params)
}

/// Render a preset with random detuning.
///
/// Frequency and pitch-sweep endpoints move by up to `amount` (as a
/// fraction), duration by up to half that. Draws from `rng` in that order,
/// skipping fields the method does not have.
pub fn generate_sfx_variation(
    key: &str,
    amount: f32,
    rng: &mut impl RandomSource,
) -> Result<AudioBuffer> {
    let mut params = sfx_preset(key)?.params.clone();
    let mut jitter = |scale: f32| 1.0 + rng.next_signed() as f32 * amount * scale;

    match &mut params {
        SynthParams::Additive(p) => {
            p.frequency *= jitter(1.0);
            p.duration *= jitter(0.5);
        }
        SynthParams::PulseWave(p) => {
            p.frequency *= jitter(1.0);
            p.duration *= jitter(0.5);
            if let Some(sweep) = &mut p.pitch_sweep {
                sweep.start_freq *= jitter(1.0);
                sweep.end_freq *= jitter(1.0);
            }
        }
        SynthParams::Subtractive(p) => p.duration *= jitter(0.5),
        SynthParams::Fm(p) => p.duration *= jitter(0.5),
        SynthParams::Physical(p) => p.duration *= jitter(0.5),
    }
    Synth::default().synthesize(&params)
}
