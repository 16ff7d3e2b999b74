//! Space backgrounds
//!
//! An opaque canvas filled with the palette's dark color, then layered:
//! nebula, drifting dust, stars, sparkles, shooting stars and, for
//! [`BackgroundType::Planet`], a lit planet disc.
//!
//! Object placement comes from hashed keys (`noise_1d(index * key + seed
//! offset)`) rather than an RNG stream, so changing one layer's count never
//! moves the objects of another layer.

use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::draw::{to_channel, wrap};
use super::{FrameSequence, SpriteBuffer, check_frame_count, frame_progress};
use crate::error::{GenError, Result, check_max, check_size};
use crate::noise::{noise_1d, noise_2d, seed_offset, simple_noise_2d};
use crate::palette::{Palette, Rgb, mix};
use crate::params::GenerationParameters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    /// Stars only, no nebula
    #[default]
    Starfield,
    Nebula,
    /// Nebula and stars behind a planet
    Planet,
}

impl BackgroundType {
    pub const ALL: [BackgroundType; 3] = [
        BackgroundType::Starfield,
        BackgroundType::Nebula,
        BackgroundType::Planet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BackgroundType::Starfield => "starfield",
            BackgroundType::Nebula => "nebula",
            BackgroundType::Planet => "planet",
        }
    }
}

impl FromStr for BackgroundType {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self> {
        BackgroundType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| GenError::unknown("background type", s))
    }
}

impl fmt::Display for BackgroundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Background generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    pub bg_type: BackgroundType,
    pub size: u32,
    pub star_density: u32,
    pub star_size_min: f64,
    pub star_size_max: f64,
    pub star_brightness: f64,
    pub star_twinkling: bool,
    pub sparkle_count: u32,
    pub sparkle_size: f64,
    pub sparkle_intensity: f64,
    pub shooting_star_count: u32,
    pub shooting_star_length: f64,
    /// Global animation speed
    pub shooting_star_speed: f64,
    /// Fraction of the noise range that shows as nebula
    pub nebula_density: f64,
    pub nebula_scale: f64,
    pub nebula_layers: u32,
    pub dust_density: u32,
    pub planet_clouds: bool,
    pub animated: bool,
    /// Wrap every stamped object around the canvas edges
    pub tileable: bool,
    pub frame_count: u32,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            bg_type: BackgroundType::Starfield,
            size: 512,
            star_density: 200,
            star_size_min: 1.0,
            star_size_max: 3.0,
            star_brightness: 1.0,
            star_twinkling: true,
            sparkle_count: 10,
            sparkle_size: 5.0,
            sparkle_intensity: 1.2,
            shooting_star_count: 3,
            shooting_star_length: 40.0,
            shooting_star_speed: 1.0,
            nebula_density: 0.3,
            nebula_scale: 0.1,
            nebula_layers: 3,
            dust_density: 50,
            planet_clouds: true,
            animated: true,
            tileable: false,
            frame_count: 8,
        }
    }
}

impl BackgroundConfig {
    pub fn new(bg_type: BackgroundType) -> Self {
        Self {
            bg_type,
            ..Default::default()
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_tileable(mut self, tileable: bool) -> Self {
        self.tileable = tileable;
        self
    }

    /// Drop every stamped layer, leaving fill, nebula and planet
    pub fn without_objects(mut self) -> Self {
        self.star_density = 0;
        self.sparkle_count = 0;
        self.shooting_star_count = 0;
        self.dust_density = 0;
        self
    }

    pub fn from_params(params: &GenerationParameters) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            bg_type: params.parse_or("bg_type", d.bg_type)?,
            size: params.u32_or("size", d.size)?,
            star_density: params.u32_or("star_density", d.star_density)?,
            star_size_min: params.f64_or("star_size_min", d.star_size_min)?,
            star_size_max: params.f64_or("star_size_max", d.star_size_max)?,
            star_brightness: params.f64_or("star_brightness", d.star_brightness)?,
            star_twinkling: params.bool_or("star_twinkling", d.star_twinkling)?,
            sparkle_count: params.u32_or("sparkle_count", d.sparkle_count)?,
            sparkle_size: params.f64_or("sparkle_size", d.sparkle_size)?,
            sparkle_intensity: params.f64_or("sparkle_intensity", d.sparkle_intensity)?,
            shooting_star_count: params.u32_or("shooting_star_count", d.shooting_star_count)?,
            shooting_star_length: params.f64_or("shooting_star_length", d.shooting_star_length)?,
            shooting_star_speed: params.f64_or("shooting_star_speed", d.shooting_star_speed)?,
            nebula_density: params.f64_or("nebula_density", d.nebula_density)?,
            nebula_scale: params.f64_or("nebula_scale", d.nebula_scale)?,
            nebula_layers: params.u32_or("nebula_layers", d.nebula_layers)?,
            dust_density: params.u32_or("dust_density", d.dust_density)?,
            planet_clouds: params.bool_or("planet_clouds", d.planet_clouds)?,
            animated: params.bool_or("animated", d.animated)?,
            tileable: params.bool_or("tileable", d.tileable)?,
            frame_count: params.u32_or("frame_count", d.frame_count)?,
        })
    }
}

/// Generate a background; one frame unless `animated`
pub fn generate_background(
    config: &BackgroundConfig,
    palette: &Palette,
    seed: u32,
) -> Result<FrameSequence> {
    let size = check_size(config.size)?;
    let frame_count = if config.animated {
        check_frame_count(config.frame_count)?
    } else {
        1
    };
    check_layer_limits(config)?;
    let offset = seed_offset(seed);

    let frames = (0..frame_count)
        .map(|frame| {
            let mut scene = Scene {
                buffer: SpriteBuffer::filled(size, size, palette.dark.opaque()),
                size: size as f64,
                time: frame_progress(frame, frame_count) * 2.0 * config.shooting_star_speed,
                frame,
                offset,
                config,
                palette,
            };
            scene.draw();
            scene.buffer
        })
        .collect();
    Ok(frames)
}

/// Object counts and sizes drive per-pixel loops; cap them
fn check_layer_limits(config: &BackgroundConfig) -> Result<()> {
    check_max("star_density", config.star_density, 1000)?;
    check_max("star_size_max", config.star_size_max, 8.0)?;
    check_max("sparkle_count", config.sparkle_count, 50)?;
    check_max("sparkle_size", config.sparkle_size, 15.0)?;
    check_max("shooting_star_count", config.shooting_star_count, 10)?;
    check_max("shooting_star_length", config.shooting_star_length, 100.0)?;
    check_max("nebula_layers", config.nebula_layers, 6)?;
    check_max("dust_density", config.dust_density, 500)?;
    Ok(())
}

struct Scene<'a> {
    buffer: SpriteBuffer,
    size: f64,
    time: f64,
    frame: u32,
    offset: f64,
    config: &'a BackgroundConfig,
    palette: &'a Palette,
}

impl Scene<'_> {
    fn draw(&mut self) {
        if self.config.bg_type != BackgroundType::Starfield {
            self.nebula();
        }
        self.dust();
        self.stars();
        self.sparkles();
        self.shooting_stars();
        if self.config.bg_type == BackgroundType::Planet {
            self.planet();
        }
    }

    /// Hashed placement value for object `index` under `key`, in `[0, 1)`
    fn rnd(&self, index: u32, key: f64) -> f64 {
        noise_1d(index as f64 * key + self.offset)
    }

    /// Lighten a pixel, wrapping around the edges when tileable
    fn plot(&mut self, x: i64, y: i64, color: Rgb, intensity: f64) {
        let (x, y) = if self.config.tileable {
            (wrap(x, self.buffer.width), wrap(y, self.buffer.height))
        } else {
            (x, y)
        };
        let [r, g, b] = color.scaled(intensity);
        self.buffer
            .blend_max_rgb(x, y, [to_channel(r), to_channel(g), to_channel(b)]);
    }

    /// Radial-falloff disc with `dist <= radius`
    fn disc(&mut self, cx: i64, cy: i64, radius: f64, color: Rgb, intensity: f64) {
        if radius <= 0.0 {
            return;
        }
        let r = radius.ceil() as i64;
        for dy in -r..=r {
            for dx in -r..=r {
                let dist = ((dx * dx + dy * dy) as f64).sqrt();
                if dist <= radius {
                    self.plot(cx + dx, cy + dy, color, (1.0 - dist / radius) * intensity);
                }
            }
        }
    }

    fn nebula(&mut self) {
        let cfg = self.config;
        if cfg.nebula_density <= 0.0 || cfg.nebula_layers == 0 {
            return;
        }
        // Layer weights 1, 1/2, 1/3, ... normalized so the sum spans [-1, 1)
        let weight: f64 = (0..cfg.nebula_layers).map(|l| 1.0 / (l + 1) as f64).sum();
        let threshold = 1.0 - cfg.nebula_density;
        let p = *self.palette;

        let size = self.buffer.width;
        for y in 0..size {
            for x in 0..size {
                let mut value = 0.0;
                for layer in 0..cfg.nebula_layers {
                    let scale = cfg.nebula_scale * (layer + 1) as f64;
                    value += noise_2d(x as f64 * scale + self.offset, y as f64 * scale)
                        / (layer + 1) as f64;
                }
                value /= weight;
                if value <= threshold {
                    continue;
                }
                let intensity = ((value - threshold) / cfg.nebula_density).min(1.0);
                let rgb = if intensity < 0.5 {
                    mix(p.primary, p.secondary, intensity * 2.0)
                } else {
                    mix(p.secondary, p.accent, (intensity - 0.5) * 2.0)
                };
                self.buffer
                    .blend_over(x as i64, y as i64, rgb, intensity * 0.4);
            }
        }
    }

    fn dust(&mut self) {
        let step = if self.config.animated { self.frame as f64 } else { 0.0 };
        let color = self.palette.primary;
        for i in 0..self.config.dust_density {
            let vx = (self.rnd(i, 32.7) - 0.5) * 0.2;
            let vy = (self.rnd(i, 33.9) - 0.5) * 0.2;
            let x = (self.rnd(i, 30.1) * self.size + vx * step).rem_euclid(self.size);
            let y = (self.rnd(i, 31.3) * self.size + vy * step).rem_euclid(self.size);
            let (px, py) = (x.round() as i64, y.round() as i64);
            // Dust always wraps
            let w = self.buffer.width;
            let [r, g, b] = color.scaled(0.3);
            self.buffer.blend_max_rgb(
                wrap(px, w),
                wrap(py, w),
                [to_channel(r), to_channel(g), to_channel(b)],
            );
        }
    }

    fn stars(&mut self) {
        let cfg = self.config;
        let color = self.palette.accent;
        for i in 0..cfg.star_density {
            let x = self.rnd(i, 1.1) * self.size;
            let y = self.rnd(i, 2.3) * self.size;
            let spread = cfg.star_size_max - cfg.star_size_min;
            let radius = cfg.star_size_min + self.rnd(i, 3.7) * spread;
            let mut brightness = (0.5 + self.rnd(i, 4.9) * 0.5) * cfg.star_brightness;
            if cfg.star_twinkling {
                let phase = self.rnd(i, 5.1) * TAU;
                let speed = 0.5 + self.rnd(i, 6.3) * 1.5;
                brightness *= 0.7 + (self.time * speed + phase).sin() * 0.3;
            }
            self.disc(x.round() as i64, y.round() as i64, radius, color, brightness);
        }
    }

    fn sparkles(&mut self) {
        let cfg = self.config;
        let color = self.palette.accent;
        for i in 0..cfg.sparkle_count {
            let cx = (self.rnd(i, 10.1) * self.size).round();
            let cy = (self.rnd(i, 11.3) * self.size).round();
            let spin = 0.5 + self.rnd(i, 13.9) * 2.0;
            let rotation = self.time * spin + self.rnd(i, 12.7) * TAU;
            let pulse_speed = 1.0 + self.rnd(i, 15.3) * 2.0;
            let pulse = (self.time * pulse_speed + self.rnd(i, 14.1) * TAU).sin() * 0.5 + 0.5;
            let intensity = pulse * cfg.sparkle_intensity;

            for ray in 0..4 {
                let angle = ray as f64 * PI / 2.0 + rotation;
                let mut r = 0.0;
                while r < cfg.sparkle_size {
                    let px = (cx + angle.cos() * r).round() as i64;
                    let py = (cy + angle.sin() * r).round() as i64;
                    self.plot(px, py, color, (1.0 - r / cfg.sparkle_size) * intensity);
                    r += 1.0;
                }
            }
            self.disc(cx as i64, cy as i64, 2.0, color, intensity);
        }
    }

    fn shooting_stars(&mut self) {
        let cfg = self.config;
        let color = self.palette.accent;
        for i in 0..cfg.shooting_star_count {
            let angle = -PI / 4.0 + self.rnd(i, 20.1) * PI / 6.0;
            let start_x = self.rnd(i, 21.3) * self.size * 1.5 - self.size * 0.25;
            let start_y = self.rnd(i, 22.7) * self.size * 1.5 - self.size * 0.25;
            let speed = 0.5 + self.rnd(i, 23.9) * 1.5;
            let phase = (self.time * speed + self.rnd(i, 24.1)) % 2.0;
            // Visible for half of each cycle
            if phase > 1.0 {
                continue;
            }
            let traveled = phase * self.size * 1.5;
            let x = start_x + angle.cos() * traveled;
            let y = start_y + angle.sin() * traveled;
            let intensity = 1.0 - phase;

            let mut l = 0.0;
            while l < cfg.shooting_star_length {
                let px = (x - angle.cos() * l).round() as i64;
                let py = (y - angle.sin() * l).round() as i64;
                self.plot(px, py, color, (1.0 - l / cfg.shooting_star_length) * intensity);
                l += 1.0;
            }
            self.disc(x.round() as i64, y.round() as i64, 2.0, color, intensity * 1.5);
        }
    }

    /// Planet lit from the top left, with an atmosphere ring and clouds
    fn planet(&mut self) {
        let p = *self.palette;
        let c = self.size / 2.0;
        let radius = self.size * 0.45;
        let size = self.buffer.width;

        for y in 0..size {
            for x in 0..size {
                let dx = x as f64 - c;
                let dy = y as f64 - c;
                let dist = (dx * dx + dy * dy).sqrt();

                if dist < radius {
                    let angle = dy.atan2(dx);
                    let nx = x as f64 * 0.05 + angle.cos() * radius * 0.02 + self.offset;
                    let ny = y as f64 * 0.05 + angle.sin() * radius * 0.02;
                    let surface = simple_noise_2d(nx, ny);

                    let light_angle = (-dy).atan2(-dx);
                    let light = 1.0 - (light_angle + PI * 0.75).abs() / PI;

                    let color = if surface > 0.3 && light > 0.6 {
                        p.accent
                    } else if surface > 0.0 && light > 0.4 {
                        p.primary
                    } else {
                        p.secondary
                    };
                    self.buffer.set_pixel(x, y, color.opaque());

                    if self.config.planet_clouds
                        && dist < radius * 0.95
                        && simple_noise_2d(x as f64 * 0.1 + self.offset, y as f64 * 0.1) > 0.35
                    {
                        self.buffer.set_pixel(x, y, Rgb::WHITE.opaque());
                    }
                } else if dist < radius * 1.1 {
                    let glow = 1.0 - (dist - radius) / (radius * 0.1);
                    self.buffer
                        .blend_over(x as i64, y as i64, p.accent.to_f64(), glow * 0.6);
                }
            }
        }
    }
}
