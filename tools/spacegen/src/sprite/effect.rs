//! Animated visual effects
//!
//! Every effect renders `frame_count` frames at progress `frame / frame_count`.
//! Effects that scatter particles draw from one RNG stream shared by all
//! frames in order, so a sequence is reproducible as a whole.
//!
//! Palette roles: `primary` is the main body color (fire, shield energy),
//! `secondary` the supporting tone (shield edge, smoke, rings), `accent` the
//! hot highlight (sparks, shockwave) and `dark` scorch and shadow.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::draw::shade;
use super::{FrameSequence, SpriteBuffer, check_frame_count, frame_progress};
use crate::error::{GenError, Result, check_max, check_size};
use crate::palette::{Palette, Rgb};
use crate::params::GenerationParameters;
use crate::seed::SeededRng;

/// Progress at which the explosion fireball reaches its full radius
const EXPLOSION_PEAK: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    #[default]
    Explosion,
    /// Hexagon ripple spreading from an off-centre hit
    #[serde(alias = "shield_hit")]
    Shield,
    ShieldAmbient,
    Impact,
    HullDamage,
    #[serde(alias = "warp_jump")]
    Warp,
    Teleport,
    EmpBurst,
}

impl EffectType {
    pub const ALL: [EffectType; 8] = [
        EffectType::Explosion,
        EffectType::Shield,
        EffectType::ShieldAmbient,
        EffectType::Impact,
        EffectType::HullDamage,
        EffectType::Warp,
        EffectType::Teleport,
        EffectType::EmpBurst,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EffectType::Explosion => "explosion",
            EffectType::Shield => "shield",
            EffectType::ShieldAmbient => "shield_ambient",
            EffectType::Impact => "impact",
            EffectType::HullDamage => "hull_damage",
            EffectType::Warp => "warp",
            EffectType::Teleport => "teleport",
            EffectType::EmpBurst => "emp_burst",
        }
    }
}

impl FromStr for EffectType {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "shield_hit" => Ok(EffectType::Shield),
            "warp_jump" => Ok(EffectType::Warp),
            _ => EffectType::ALL
                .into_iter()
                .find(|t| t.as_str() == s)
                .ok_or_else(|| GenError::unknown("effect type", s)),
        }
    }
}

impl fmt::Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effect generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub effect_type: EffectType,
    pub size: u32,
    /// Particle density; 5 is the reference level
    pub intensity: f64,
    pub frame_count: u32,
    /// Radius scale of the explosion overlays and the impact flash
    pub expansion: f64,
    pub ring_count: u32,
    /// Expanding rings over the explosion
    pub add_rings: bool,
    /// Fast shockwave ring over the explosion
    pub add_shockwave: bool,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            effect_type: EffectType::Explosion,
            size: 64,
            intensity: 5.0,
            frame_count: 16,
            expansion: 0.5,
            ring_count: 2,
            add_rings: false,
            add_shockwave: false,
        }
    }
}

impl EffectConfig {
    pub fn new(effect_type: EffectType) -> Self {
        Self {
            effect_type,
            ..Default::default()
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_frames(mut self, frame_count: u32) -> Self {
        self.frame_count = frame_count;
        self
    }

    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn from_params(params: &GenerationParameters) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            effect_type: params.parse_or("effect_type", d.effect_type)?,
            size: params.u32_or("size", d.size)?,
            intensity: params.f64_or("intensity", d.intensity)?,
            frame_count: params.u32_or("frame_count", d.frame_count)?,
            expansion: params.f64_or("expansion", d.expansion)?,
            ring_count: params.u32_or("ring_count", d.ring_count)?,
            add_rings: params.bool_or("add_rings", d.add_rings)?,
            add_shockwave: params.bool_or("add_shockwave", d.add_shockwave)?,
        })
    }
}

/// Two-phase explosion envelope.
///
/// Grows linearly to `max_radius` at progress 0.6, then contracts linearly to
/// 70% of it at progress 1.0.
pub fn explosion_radius(progress: f64, max_radius: f64) -> f64 {
    if progress < EXPLOSION_PEAK {
        progress / EXPLOSION_PEAK * max_radius
    } else {
        max_radius * (1.0 - (progress - EXPLOSION_PEAK) / (1.0 - EXPLOSION_PEAK) * 0.3)
    }
}

/// Generate an effect animation
pub fn generate_effect(
    config: &EffectConfig,
    palette: &Palette,
    seed: u32,
) -> Result<FrameSequence> {
    let size = check_size(config.size)?;
    let frame_count = check_frame_count(config.frame_count)?;
    check_max("intensity", config.intensity, 10.0)?;
    check_max("expansion", config.expansion, 1.0)?;
    check_max("ring_count", config.ring_count, 5)?;
    let mut rng = SeededRng::new(seed);

    let frames = (0..frame_count)
        .map(|frame| {
            let mut ctx = Frame {
                buffer: SpriteBuffer::square(size),
                size: size as f64,
                center: (size / 2) as i64,
                frame,
                progress: frame_progress(frame, frame_count),
                config,
                palette,
            };
            match config.effect_type {
                EffectType::Explosion => ctx.explosion(&mut rng),
                EffectType::Shield => ctx.shield_hit(),
                EffectType::ShieldAmbient => ctx.shield_ambient(),
                EffectType::Impact => ctx.impact(),
                EffectType::HullDamage => ctx.hull_damage(&mut rng),
                EffectType::Warp => ctx.warp(),
                EffectType::Teleport => ctx.teleport(),
                EffectType::EmpBurst => ctx.emp_burst(),
            }
            ctx.buffer
        })
        .collect();
    Ok(frames)
}

struct Frame<'a> {
    buffer: SpriteBuffer,
    size: f64,
    center: i64,
    frame: u32,
    progress: f64,
    config: &'a EffectConfig,
    palette: &'a Palette,
}

impl Frame<'_> {
    fn polar(&self, angle: f64, dist: f64) -> (i64, i64) {
        let c = self.center as f64;
        (
            (c + angle.cos() * dist).floor() as i64,
            (c + angle.sin() * dist).floor() as i64,
        )
    }

    fn in_bounds(&self, x: i64, y: i64) -> bool {
        self.buffer.index_of(x, y).is_some()
    }

    fn explosion(&mut self, rng: &mut SeededRng) {
        let p = self.progress;
        let radius = explosion_radius(p, self.size * 0.45);
        let pal = *self.palette;

        let count = (self.config.intensity * 20.0).floor().max(0.0) as u32;
        for i in 0..count {
            let angle = i as f64 / count as f64 * PI * 2.0 + rng.next() * 0.5;
            let dist = radius * (0.5 + rng.next() * 0.5);
            let (px, py) = self.polar(angle, dist);
            if !self.in_bounds(px, py) {
                continue;
            }
            let color = if p < 0.3 {
                Rgb::WHITE
            } else if dist < radius * 0.3 {
                pal.accent
            } else if dist < radius * 0.7 || p <= 0.7 {
                pal.primary
            } else {
                pal.dark
            }
            .opaque();
            self.buffer.put(px, py, color);
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let (nx, ny) = (px + dx, py + dy);
                    if self.buffer.get(nx, ny).is_some_and(|px| px[3] == 0) {
                        self.buffer.put(nx, ny, color);
                    }
                }
            }
        }

        if p < 0.5 {
            let core = (radius * 0.3).floor() as i64;
            self.buffer
                .fill_disc(self.center, self.center, core, Rgb::WHITE.opaque());
        }

        let c = self.center as f64;
        let overlay_radius = self.size * 0.4 * self.config.expansion;
        if self.config.add_rings {
            for ring in 0..self.config.ring_count {
                let phase = (p + ring as f64 * 0.3) % 1.0;
                self.buffer.glow_ring(
                    c,
                    c,
                    overlay_radius * phase * 1.5,
                    3.0,
                    pal.secondary,
                    (1.0 - phase) * 0.6,
                    255.0,
                );
            }
        }
        if self.config.add_shockwave {
            self.buffer.glow_ring(
                c,
                c,
                overlay_radius * p * 2.0,
                2.0,
                pal.accent,
                (1.0 - p) * 0.8,
                200.0,
            );
        }
    }

    fn shield_hit(&mut self) {
        const CELL: i64 = 4;
        let p = self.progress;
        let size = self.buffer.width as i64;
        let impact_x = (self.size * 0.6).floor() as i64;
        let impact_y = (self.size * 0.4).floor() as i64;
        let ripple = p * self.size * 0.7;
        let color = if p < 0.3 { Rgb::WHITE } else { self.palette.primary }.opaque();

        for y in (0..size).step_by(CELL as usize) {
            for x in (0..size).step_by(CELL as usize) {
                let dist = (((x - impact_x).pow(2) + (y - impact_y).pow(2)) as f64).sqrt();
                if (dist - ripple).abs() >= 3.0 {
                    continue;
                }
                for hy in 0..CELL {
                    for hx in 0..CELL {
                        if hx == 0 || hx == CELL - 1 || hy == 0 || hy == CELL - 1 {
                            self.buffer.put(x + hx, y + hy, color);
                        }
                    }
                }
            }
        }

        if p < 0.2 {
            let flash = (8.0 * (1.0 - p / 0.2)).floor() as i64;
            self.buffer
                .fill_disc(impact_x, impact_y, flash, Rgb::WHITE.opaque());
        }
    }

    fn shield_ambient(&mut self) {
        let size = self.buffer.width as i64;
        let pulse = (self.progress * PI * 2.0).sin();
        let radius = self.size * 0.45 + pulse * 2.0;
        let edge = if pulse > 0.0 {
            self.palette.primary
        } else {
            self.palette.secondary
        }
        .opaque();
        let dark = self.palette.dark.opaque();
        let center = self.center;
        let dist = move |x: i64, y: i64| -> f64 {
            (((x - center).pow(2) + (y - center).pow(2)) as f64).sqrt()
        };

        for y in 0..size {
            for x in 0..size {
                let d = dist(x, y);
                if (d - radius).abs() < 2.0 {
                    self.buffer.put(x, y, edge);
                } else if d < radius && d > radius - 3.0 {
                    self.buffer.put(x, y, dark);
                }
            }
        }

        if self.frame % 4 == 0 {
            for y in (0..size).step_by(6) {
                for x in (0..size).step_by(6) {
                    if dist(x, y) < radius {
                        self.buffer.put(x, y, dark);
                    }
                }
            }
        }
    }

    fn impact(&mut self) {
        let c = self.center as f64;
        let flash = (self.progress * PI).sin();
        let radius = self.size * 0.2 * self.config.expansion;
        let strength = flash * self.config.intensity / 5.0;
        let size = self.buffer.width;
        for y in 0..size {
            for x in 0..size {
                let dist = ((x as f64 - c).powi(2) + (y as f64 - c).powi(2)).sqrt();
                if dist < radius {
                    let i = (1.0 - dist / radius) * strength;
                    self.buffer
                        .set_pixel(x, y, shade(self.palette.accent, i, i * 255.0));
                }
            }
        }
    }

    fn hull_damage(&mut self, rng: &mut SeededRng) {
        let p = self.progress;
        let pal = *self.palette;
        let scorch = (self.size * 0.2).floor() as i64;
        self.buffer
            .fill_disc(self.center, self.center, scorch, pal.dark.opaque());

        if p < 0.5 {
            let sparks = (self.config.intensity * 5.0).floor().max(0.0) as u32;
            for _ in 0..sparks {
                let angle = rng.next() * PI * 2.0;
                let dist = rng.next() * self.size * 0.4 * (p / 0.5);
                let (px, py) = self.polar(angle, dist);
                if self.in_bounds(px, py) {
                    let color = if rng.next() > 0.5 { pal.accent } else { pal.primary };
                    self.buffer.put(px, py, color.opaque());
                }
            }
        }

        if p > 0.3 {
            let c = self.center as f64;
            let dist = (p - 0.3) * self.size * 0.3;
            for _ in 0..10 {
                let angle = -PI / 2.0 + (rng.next() - 0.5) * 0.5;
                let spread = rng.next() + 0.5;
                let px = (c + angle.cos() * dist * spread).floor() as i64;
                let py = (c + angle.sin() * dist).floor() as i64;
                self.buffer.put(px, py, pal.secondary.opaque());
            }
        }
    }

    fn warp(&mut self) {
        let p = self.progress;
        let c = self.center as f64;
        let half = self.size / 2.0;
        for line in 0..8 {
            let base = line as f64 / 8.0 * PI * 2.0;
            let mut r = 0.0;
            while r < half {
                let angle = base + r * 0.1 + p * PI * 2.0;
                let x = c + angle.cos() * r;
                let y = c + angle.sin() * r;
                let i = (1.0 - r / half) * 0.6;
                self.buffer.blend_max(
                    x.floor() as i64,
                    y.floor() as i64,
                    shade(self.palette.primary, i, i * 255.0),
                );
                r += 1.0;
            }
        }

        if p > 0.8 {
            let flash = (self.size * 0.3 * (p - 0.8) / 0.2).floor() as i64;
            self.buffer
                .fill_disc(self.center, self.center, flash, Rgb::WHITE.opaque());
        }
    }

    fn teleport(&mut self) {
        const PARTICLES: u32 = 50;
        let p = self.progress;
        let dist = self.size * 0.5 * (1.0 - p);
        let color = if p < 0.5 { self.palette.primary } else { Rgb::WHITE }.opaque();
        for i in 0..PARTICLES {
            let angle = i as f64 / PARTICLES as f64 * PI * 2.0;
            let (px, py) = self.polar(angle, dist);
            self.buffer.put(px, py, color);
        }

        if p > 0.5 {
            let buildup = ((p - 0.5) * 2.0 * self.size * 0.3).floor() as i64;
            self.buffer
                .fill_disc(self.center, self.center, buildup, Rgb::WHITE.opaque());
        }
    }

    fn emp_burst(&mut self) {
        const ARCS: u32 = 12;
        let p = self.progress;
        let pal = *self.palette;
        let radius = p * self.size * 0.5;

        for i in 0..ARCS {
            let angle = i as f64 / ARCS as f64 * PI * 2.0 + p * PI;
            let length = radius + (p * PI * 8.0).sin() * 5.0;
            let (px, py) = self.polar(angle, length);
            if !self.in_bounds(px, py) {
                continue;
            }
            let tip = if i % 2 == 0 { pal.accent } else { Rgb::WHITE };
            self.buffer.put(px, py, tip.opaque());

            let mut j = 0.0;
            let mut step = 0u32;
            while j < length {
                if step % 3 == 0 {
                    let (tx, ty) = self.polar(angle, j);
                    self.buffer.put(tx, ty, pal.primary.opaque());
                }
                j += 1.0;
                step += 1;
            }
        }

        if p < 0.2 {
            let flash = (10.0 * (1.0 - p / 0.2)).floor() as i64;
            self.buffer
                .fill_disc(self.center, self.center, flash, Rgb::WHITE.opaque());
        }
    }
}
