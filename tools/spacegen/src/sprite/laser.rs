//! Laser beam sprites
//!
//! A beam of `beam_length * size` pixels through the canvas centre, rotated
//! by `beam_angle`. The distance from the beam axis is perturbed by
//! coordinate noise; inside half the beam width the pixel is core, out to
//! `beam_width * glow_radius` it is glow.

use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::draw::{rgba, shade};
use super::{FrameSequence, SpriteBuffer, check_frame_count, frame_progress};
use crate::error::{GenError, Result, check_max, check_size};
use crate::noise::{noise_2d, seed_offset};
use crate::palette::{Palette, mix};
use crate::params::GenerationParameters;

/// Longest beam, as a fraction of the canvas
pub const MAX_BEAM_LENGTH: f64 = 1.0;

const MAX_PARTICLES: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaserType {
    #[default]
    Mining,
    Combat,
    Tractor,
    Plasma,
}

/// Per-style multipliers applied on top of the configured knobs
struct LaserStyle {
    width: f64,
    core: f64,
    distortion: f64,
    glow: f64,
}

impl LaserType {
    pub const ALL: [LaserType; 4] = [
        LaserType::Mining,
        LaserType::Combat,
        LaserType::Tractor,
        LaserType::Plasma,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LaserType::Mining => "mining",
            LaserType::Combat => "combat",
            LaserType::Tractor => "tractor",
            LaserType::Plasma => "plasma",
        }
    }

    fn style(self) -> LaserStyle {
        let (width, core, distortion, glow) = match self {
            LaserType::Mining => (1.0, 1.0, 1.0, 1.0),
            // Thin and hot
            LaserType::Combat => (0.75, 1.2, 0.5, 1.0),
            // Wide soft field
            LaserType::Tractor => (1.5, 0.6, 0.3, 2.0),
            LaserType::Plasma => (1.2, 1.3, 2.5, 1.2),
        };
        LaserStyle {
            width,
            core,
            distortion,
            glow,
        }
    }
}

impl FromStr for LaserType {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self> {
        LaserType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| GenError::unknown("laser type", s))
    }
}

impl fmt::Display for LaserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Laser generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaserConfig {
    pub laser_type: LaserType,
    pub size: u32,
    /// Beam length as a fraction of the canvas
    pub beam_length: f64,
    /// Beam width in pixels
    pub beam_width: f64,
    pub core_intensity: f64,
    /// Glow reach in multiples of the beam width
    pub glow_radius: f64,
    /// Pulses per loop
    pub pulse_speed: f64,
    pub distortion: f64,
    pub particle_count: u32,
    /// Degrees
    pub beam_angle: f64,
    pub add_core_flash: bool,
    pub add_electricity: bool,
    pub animated: bool,
    pub frame_count: u32,
}

impl Default for LaserConfig {
    fn default() -> Self {
        Self {
            laser_type: LaserType::Mining,
            size: 128,
            beam_length: 0.8,
            beam_width: 4.0,
            core_intensity: 1.5,
            glow_radius: 1.5,
            pulse_speed: 3.0,
            distortion: 0.1,
            particle_count: 15,
            beam_angle: 0.0,
            add_core_flash: true,
            add_electricity: false,
            animated: true,
            frame_count: 8,
        }
    }
}

impl LaserConfig {
    pub fn new(laser_type: LaserType) -> Self {
        Self {
            laser_type,
            ..Default::default()
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_angle(mut self, degrees: f64) -> Self {
        self.beam_angle = degrees;
        self
    }

    pub fn with_electricity(mut self, enabled: bool) -> Self {
        self.add_electricity = enabled;
        self
    }

    pub fn from_params(params: &GenerationParameters) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            laser_type: params.parse_or("laser_type", d.laser_type)?,
            size: params.u32_or("size", d.size)?,
            beam_length: params.f64_or("beam_length", d.beam_length)?,
            beam_width: params.f64_or("beam_width", d.beam_width)?,
            core_intensity: params.f64_or("core_intensity", d.core_intensity)?,
            glow_radius: params.f64_or("glow_radius", d.glow_radius)?,
            pulse_speed: params.f64_or("pulse_speed", d.pulse_speed)?,
            distortion: params.f64_or("distortion", d.distortion)?,
            particle_count: params.u32_or("particle_count", d.particle_count)?,
            beam_angle: params.f64_or("beam_angle", d.beam_angle)?,
            add_core_flash: params.bool_or("add_core_flash", d.add_core_flash)?,
            add_electricity: params.bool_or("add_electricity", d.add_electricity)?,
            animated: params.bool_or("animated", d.animated)?,
            frame_count: params.u32_or("frame_count", d.frame_count)?,
        })
    }
}

/// Generate a laser beam; one frame unless `animated`
pub fn generate_laser(
    config: &LaserConfig,
    palette: &Palette,
    seed: u32,
) -> Result<FrameSequence> {
    let size = check_size(config.size)?;
    if config.beam_width <= 0.0 {
        return Err(GenError::InvalidParameter(format!(
            "beam_width must be positive, got {}",
            config.beam_width
        )));
    }
    if !(config.beam_length > 0.0) {
        return Err(GenError::InvalidParameter(format!(
            "beam_length must be positive, got {}",
            config.beam_length
        )));
    }
    check_max("beam_length", config.beam_length, MAX_BEAM_LENGTH)?;
    check_max("particle_count", config.particle_count, MAX_PARTICLES)?;
    let frame_count = if config.animated {
        check_frame_count(config.frame_count)?
    } else {
        1
    };
    let offset = seed_offset(seed);

    let frames = (0..frame_count)
        .map(|frame| {
            let progress = frame_progress(frame, frame_count);
            render(config, palette, size, progress, offset)
        })
        .collect();
    Ok(frames)
}

fn render(
    config: &LaserConfig,
    palette: &Palette,
    size: u32,
    progress: f64,
    offset: f64,
) -> SpriteBuffer {
    let style = config.laser_type.style();
    let mut buffer = SpriteBuffer::square(size);

    let center = size as f64 / 2.0;
    let length = size as f64 * config.beam_length;
    let width = config.beam_width * style.width;
    let half = width / 2.0;
    let glow_reach = width * config.glow_radius * style.glow;
    let core_intensity = config.core_intensity * style.core;
    let distortion = config.distortion * style.distortion;

    let time = progress * TAU;
    let pulse_value = (time * config.pulse_speed).sin() * 0.5 + 0.5;
    let pulse = if config.animated {
        0.7 + pulse_value * 0.3
    } else {
        1.0
    };
    let (sin_a, cos_a) = (config.beam_angle * PI / 180.0).sin_cos();

    for y in 0..size {
        for x in 0..size {
            let dx = x as f64 - center;
            let dy = y as f64 - center;
            let rx = dx * cos_a - dy * sin_a;
            let ry = dx * sin_a + dy * cos_a;
            let along = rx + length / 2.0;
            if !(0.0..=length).contains(&along) {
                continue;
            }
            let dist = ry.abs() + noise_2d(along * 0.1 + offset, time * 0.5) * distortion * width;

            if dist < half {
                let i = (1.0 - dist / half) * core_intensity * pulse;
                buffer.set_pixel(x, y, shade(palette.accent, i, 255.0));
            } else if dist < glow_reach {
                let g = 1.0 - (dist - half) / (glow_reach - half);
                let [r, gr, b] = mix(palette.primary, palette.secondary, g);
                buffer.set_pixel(x, y, rgba([r * g, gr * g, b * g], g * 200.0));
            }
        }
    }

    // Particles ride the beam axis, evenly staggered
    let count = config.particle_count;
    for k in 0..count {
        let phase = (progress * config.pulse_speed + k as f64 / count as f64) % 1.0;
        let along = (phase - 0.5) * length;
        buffer.glow_disc(
            center + along * cos_a,
            center - along * sin_a,
            2.0,
            palette.accent,
            1.0,
        );
    }

    if config.add_electricity {
        electricity(&mut buffer, config, palette, width, length, time, offset);
    }

    if config.add_core_flash {
        let strength = 0.8 + pulse_value * 0.2;
        buffer.glow_disc(center, center, width * 2.0, palette.accent, strength);
    }

    buffer
}

/// Jagged arcs crawling along the beam
#[allow(clippy::too_many_arguments)]
fn electricity(
    buffer: &mut SpriteBuffer,
    config: &LaserConfig,
    palette: &Palette,
    width: f64,
    length: f64,
    time: f64,
    offset: f64,
) {
    const ARCS: u32 = 3;
    const STEP: f64 = 4.0;

    let center = buffer.width as f64 / 2.0;
    let (sin_a, cos_a) = (config.beam_angle * PI / 180.0).sin_cos();
    // Beam axis and its normal in canvas space
    let axis = (cos_a, -sin_a);
    let normal = (sin_a, cos_a);
    let points = (length / STEP).floor() as u32;

    for k in 0..ARCS {
        let mut prev: Option<(f64, f64)> = None;
        for j in 0..=points {
            let along = j as f64 * STEP - length / 2.0;
            let lateral =
                noise_2d(k as f64 * 7.3 + j as f64 * 0.37, time * 3.0 + offset) * width * 1.5;
            let point = (
                center + axis.0 * along + normal.0 * lateral,
                center + axis.1 * along + normal.1 * lateral,
            );
            if let Some((px, py)) = prev {
                buffer.glow_line(px, py, point.0, point.1, palette.accent, 0.8);
            }
            prev = Some(point);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still(laser_type: LaserType) -> LaserConfig {
        LaserConfig {
            animated: false,
            particle_count: 0,
            add_core_flash: false,
            distortion: 0.0,
            ..LaserConfig::new(laser_type)
        }
    }

    #[test]
    fn test_beam_core_and_extent() {
        let palette = Palette::default();
        let frames = generate_laser(&still(LaserType::Mining), &palette, 1).unwrap();
        assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        // Core on the axis, nothing past the beam ends
        assert_eq!(frame.get_pixel(64, 64)[3], 255);
        assert!(frame.is_empty_at(64, 10));
        assert!(frame.is_empty_at(2, 64));
        assert!(!frame.is_empty_at(20, 64));
    }

    #[test]
    fn test_beam_angle_rotates() {
        let palette = Palette::default();
        let config = still(LaserType::Mining).with_angle(90.0);
        let frame = &generate_laser(&config, &palette, 1).unwrap()[0];
        assert!(!frame.is_empty_at(64, 20));
        assert!(frame.is_empty_at(20, 64));
    }

    #[test]
    fn test_tractor_wider_than_combat() {
        let palette = Palette::default();
        let tractor = &generate_laser(&still(LaserType::Tractor), &palette, 1).unwrap()[0];
        let combat = &generate_laser(&still(LaserType::Combat), &palette, 1).unwrap()[0];
        assert!(tractor.filled_count() > combat.filled_count());
    }

    #[test]
    fn test_animated_frames_deterministic() {
        let config = LaserConfig::new(LaserType::Plasma).with_electricity(true);
        let palette = Palette::default();
        let a = generate_laser(&config, &palette, 77).unwrap();
        assert_eq!(a.len(), 8);
        assert_eq!(a, generate_laser(&config, &palette, 77).unwrap());
    }

    #[test]
    fn test_electricity_adds_pixels() {
        let palette = Palette::default();
        let plain = &generate_laser(&still(LaserType::Mining), &palette, 3).unwrap()[0];
        let config = still(LaserType::Mining).with_electricity(true);
        let arcs = &generate_laser(&config, &palette, 3).unwrap()[0];
        assert!(arcs.filled_count() >= plain.filled_count());
    }

    #[test]
    fn test_invalid_width() {
        let config = LaserConfig {
            beam_width: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            generate_laser(&config, &Palette::default(), 0),
            Err(GenError::InvalidParameter(_))
        ));
        assert!(matches!(
            "disruptor".parse::<LaserType>(),
            Err(GenError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn test_beam_length_limits() {
        let palette = Palette::default();
        for beam_length in [1e12, f64::NAN, 0.0, -0.5] {
            let config = LaserConfig {
                beam_length,
                add_electricity: true,
                ..still(LaserType::Plasma)
            };
            assert!(
                matches!(
                    generate_laser(&config, &palette, 0),
                    Err(GenError::InvalidParameter(_))
                ),
                "{}",
                beam_length
            );
        }
        let full = LaserConfig {
            beam_length: MAX_BEAM_LENGTH,
            ..still(LaserType::Mining)
        };
        assert!(generate_laser(&full, &palette, 0).is_ok());
    }

    #[test]
    fn test_particle_count_limit() {
        let config = LaserConfig {
            particle_count: u32::MAX,
            ..Default::default()
        };
        assert!(matches!(
            generate_laser(&config, &Palette::default(), 0),
            Err(GenError::InvalidParameter(_))
        ));
    }
}
