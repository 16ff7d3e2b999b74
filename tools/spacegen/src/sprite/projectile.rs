//! Projectile sprites
//!
//! Every type is shaded per pixel in a local frame rotated by `rotation`
//! degrees, so all of them point along +x before rotation. Animated
//! sequences pulse the glow once per loop; torpedo exhaust jitters from the
//! RNG stream.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::draw::{rgba, shade};
use super::{FrameSequence, SpriteBuffer, check_frame_count, frame_progress};
use crate::error::{GenError, Result, check_size};
use crate::noise::{noise_2d, seed_offset};
use crate::palette::{Palette, Rgb};
use crate::params::GenerationParameters;
use crate::seed::SeededRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileType {
    #[default]
    Bullet,
    Missile,
    Rocket,
    Plasma,
    LaserBolt,
    Torpedo,
}

impl ProjectileType {
    pub const ALL: [ProjectileType; 6] = [
        ProjectileType::Bullet,
        ProjectileType::Missile,
        ProjectileType::Rocket,
        ProjectileType::Plasma,
        ProjectileType::LaserBolt,
        ProjectileType::Torpedo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectileType::Bullet => "bullet",
            ProjectileType::Missile => "missile",
            ProjectileType::Rocket => "rocket",
            ProjectileType::Plasma => "plasma",
            ProjectileType::LaserBolt => "laser_bolt",
            ProjectileType::Torpedo => "torpedo",
        }
    }
}

impl FromStr for ProjectileType {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self> {
        ProjectileType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| GenError::unknown("projectile type", s))
    }
}

impl fmt::Display for ProjectileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Projectile generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub projectile_type: ProjectileType,
    pub size: u32,
    /// Exhaust trail length in pixels (missile, rocket)
    pub trail_length: f64,
    pub glow_intensity: f64,
    /// Core radius scale (bullet, plasma)
    pub core_size: f64,
    /// Degrees, clockwise on screen
    pub rotation: f64,
    pub animated: bool,
    pub frame_count: u32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            projectile_type: ProjectileType::Bullet,
            size: 32,
            trail_length: 5.0,
            glow_intensity: 1.0,
            core_size: 0.5,
            rotation: 0.0,
            animated: true,
            frame_count: 8,
        }
    }
}

impl ProjectileConfig {
    pub fn new(projectile_type: ProjectileType) -> Self {
        Self {
            projectile_type,
            ..Default::default()
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_frames(mut self, frame_count: u32) -> Self {
        self.frame_count = frame_count;
        self
    }

    pub fn from_params(params: &GenerationParameters) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            projectile_type: params.parse_or("projectile_type", d.projectile_type)?,
            size: params.u32_or("size", d.size)?,
            trail_length: params.f64_or("trail_length", d.trail_length)?,
            glow_intensity: params.f64_or("glow_intensity", d.glow_intensity)?,
            core_size: params.f64_or("core_size", d.core_size)?,
            rotation: params.f64_or("rotation", d.rotation)?,
            animated: params.bool_or("animated", d.animated)?,
            frame_count: params.u32_or("frame_count", d.frame_count)?,
        })
    }
}

/// Generate a projectile; one frame unless `animated`
pub fn generate_projectile(
    config: &ProjectileConfig,
    palette: &Palette,
    seed: u32,
) -> Result<FrameSequence> {
    let size = check_size(config.size)?;
    let frame_count = if config.animated {
        check_frame_count(config.frame_count)?
    } else {
        1
    };
    let mut rng = SeededRng::new(seed);
    let offset = seed_offset(seed);

    let frames = (0..frame_count)
        .map(|frame| {
            let progress = frame_progress(frame, frame_count);
            let pulse = if config.animated {
                1.0 + (progress * PI * 2.0).sin() * 0.2
            } else {
                1.0
            };
            let mut buffer = SpriteBuffer::square(size);
            let shader = Shader {
                config,
                palette,
                size: size as f64,
                glow: config.glow_intensity * pulse,
                offset,
            };
            let (sin_r, cos_r) = (-config.rotation * PI / 180.0).sin_cos();
            let center = size as f64 / 2.0;
            for y in 0..size {
                for x in 0..size {
                    let dx = x as f64 - center;
                    let dy = y as f64 - center;
                    let lx = dx * cos_r - dy * sin_r;
                    let ly = dx * sin_r + dy * cos_r;
                    if let Some(color) = shader.shade(lx, ly, x as f64, y as f64) {
                        buffer.set_pixel(x, y, color);
                    }
                }
            }
            if config.projectile_type == ProjectileType::Torpedo && config.animated {
                torpedo_exhaust(&mut buffer, config, progress, &mut rng);
            }
            buffer
        })
        .collect();
    Ok(frames)
}

struct Shader<'a> {
    config: &'a ProjectileConfig,
    palette: &'a Palette,
    size: f64,
    glow: f64,
    offset: f64,
}

impl Shader<'_> {
    /// Color of a pixel at local coordinates (lx, ly); `x`, `y` are canvas
    /// coordinates used for noise lookups
    fn shade(&self, lx: f64, ly: f64, x: f64, y: f64) -> Option<[u8; 4]> {
        let p = self.palette;
        let dist = (lx * lx + ly * ly).sqrt();
        match self.config.projectile_type {
            ProjectileType::Bullet => {
                let core = self.size * 0.15 * self.config.core_size;
                if dist < core {
                    Some(shade(p.primary, 1.0 - dist / core, 255.0))
                } else if dist < core * 1.5 * self.glow {
                    let g = 1.0 - (dist - core) / (core * 0.5 * self.glow);
                    Some(shade(p.accent, g, g * 200.0))
                } else {
                    None
                }
            }
            ProjectileType::Plasma => {
                let core = self.size * 0.25 * self.config.core_size;
                let n = noise_2d(x * 0.2 + self.offset, y * 0.2 + self.offset);
                if dist < core * (1.0 + n * 0.2) {
                    let i = 1.0 - dist / core;
                    let [pr, pg, pb] = p.primary.to_f64();
                    let [ar, ag, ab] = p.accent.to_f64();
                    Some(rgba(
                        [(pr + ar) / 2.0 * i, (pg + ag) / 2.0 * i, (pb + ab) / 2.0 * i],
                        255.0,
                    ))
                } else if dist < core * 2.0 * self.glow {
                    let g = (1.0 - (dist - core) / core) * (1.0 + n * 0.3);
                    (g > 0.0).then(|| shade(p.accent, g, g * 150.0))
                } else {
                    None
                }
            }
            ProjectileType::Missile | ProjectileType::Rocket => {
                let length = self.size * 0.6;
                let width = self.size * 0.2;
                // Rockets burn a longer, hotter plume
                let trail = match self.config.projectile_type {
                    ProjectileType::Rocket => self.config.trail_length * 1.5,
                    _ => self.config.trail_length,
                };
                let mut color = None;
                if ly.abs() < width / 2.0 && lx.abs() < length / 2.0 {
                    let body = (lx + length / 2.0) / length;
                    color = Some(shade(p.primary, 1.0 - body * 0.3, 255.0));
                }
                if lx < -length / 2.0 && ly.abs() < width {
                    let d = (lx + length / 2.0).abs();
                    if d < trail {
                        let t = 1.0 - d / trail;
                        color = Some(shade(p.accent, t * self.glow.min(1.0), t * 200.0));
                    }
                }
                color
            }
            ProjectileType::LaserBolt => {
                let length = self.size * 0.5;
                let core_width = 2.0;
                if lx.abs() >= length / 2.0 {
                    return None;
                }
                let reach = core_width * 3.0 * self.glow;
                let mut color = None;
                if ly.abs() < core_width {
                    color = Some(p.accent.opaque());
                }
                if ly.abs() < reach {
                    let g = 1.0 - ly.abs() / reach;
                    color = Some(shade(p.primary, g, g * 180.0));
                }
                color
            }
            ProjectileType::Torpedo => {
                let length = (self.size * 0.7).floor();
                let half_width = ((self.size * 0.4).floor() / 2.0).floor();
                let nose = length / 2.0;
                if (-nose..nose).contains(&lx) && ly.abs() <= half_width + 0.5 {
                    Some(p.primary.opaque())
                } else if (nose..nose + 4.0).contains(&lx) && ly.abs() <= 1.5 {
                    let warhead = if lx < nose + 2.0 { p.accent } else { p.secondary };
                    Some(warhead.opaque())
                } else {
                    None
                }
            }
        }
    }
}

fn torpedo_exhaust(
    buffer: &mut SpriteBuffer,
    config: &ProjectileConfig,
    progress: f64,
    rng: &mut SeededRng,
) {
    const HOT: Rgb = Rgb::from_u32(0xFFFF00);
    const WARM: Rgb = Rgb::from_u32(0xFF6600);

    let size = buffer.width as f64;
    let center = size / 2.0;
    let tail = -(size * 0.7).floor() / 2.0;
    let thrust = 4 + ((progress * PI * 2.0).sin() * 2.0).floor() as i64;
    let (sin_r, cos_r) = (config.rotation * PI / 180.0).sin_cos();

    for i in 0..thrust {
        for dy in -2i64..=2 {
            let jitter = (rng.next() - 0.5) * 2.0;
            let lx = tail - i as f64;
            let ly = dy as f64 + jitter;
            let x = center + lx * cos_r - ly * sin_r;
            let y = center + lx * sin_r + ly * cos_r;
            let color = if i < 2 { HOT } else { WARM };
            buffer.put(x.floor() as i64, y.floor() as i64, color.opaque());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_draws_something() {
        let palette = Palette::default();
        for t in ProjectileType::ALL {
            let frames = generate_projectile(&ProjectileConfig::new(t), &palette, 3).unwrap();
            assert_eq!(frames.len(), 8);
            assert!(frames.iter().all(|f| !f.is_blank()), "{} is blank", t);
        }
    }

    #[test]
    fn test_static_projectile_single_frame() {
        let config = ProjectileConfig {
            animated: false,
            ..ProjectileConfig::new(ProjectileType::Plasma)
        };
        assert_eq!(generate_projectile(&config, &Palette::default(), 1).unwrap().len(), 1);
    }

    #[test]
    fn test_bullet_core_is_opaque_primary() {
        let palette = Palette::default();
        let config = ProjectileConfig {
            animated: false,
            core_size: 1.0,
            ..ProjectileConfig::new(ProjectileType::Bullet)
        };
        let frame = &generate_projectile(&config, &palette, 0).unwrap()[0];
        assert_eq!(frame.get_pixel(16, 16), palette.primary.opaque());
        assert!(frame.is_empty_at(0, 0));
    }

    #[test]
    fn test_rotation_turns_missile() {
        let palette = Palette::default();
        let flat = ProjectileConfig {
            animated: false,
            ..ProjectileConfig::new(ProjectileType::Missile)
        };
        let upright = flat.clone().with_rotation(90.0);
        let a = &generate_projectile(&flat, &palette, 0).unwrap()[0];
        let b = &generate_projectile(&upright, &palette, 0).unwrap()[0];
        // Body spans x at rotation 0 and y at rotation 90
        assert!(!a.is_empty_at(25, 16));
        assert!(a.is_empty_at(16, 25));
        assert!(!b.is_empty_at(16, 7));
        assert!(b.is_empty_at(25, 16));
    }

    #[test]
    fn test_torpedo_deterministic() {
        let config = ProjectileConfig::new(ProjectileType::Torpedo);
        let palette = Palette::default();
        assert_eq!(
            generate_projectile(&config, &palette, 8).unwrap(),
            generate_projectile(&config, &palette, 8).unwrap()
        );
    }

    #[test]
    fn test_unknown_type() {
        let params = GenerationParameters::new().with("projectile_type", "railgun");
        assert!(matches!(
            ProjectileConfig::from_params(&params),
            Err(GenError::UnknownVariant { .. })
        ));
    }
}
