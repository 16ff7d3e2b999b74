//! Asteroid sprites
//!
//! The silhouette is a rotated, elongated disc whose edge is displaced by
//! coordinate noise and softened with a logistic falloff. Craters, surface
//! detail and damage cracks come from the RNG stream, in that order, so a
//! seed fully determines their placement while the silhouette stays a pure
//! function of the coordinates.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::draw::rgba;
use super::modifiers::{Outline, SpriteApply};
use super::SpriteBuffer;
use crate::error::{Result, check_max, check_size};
use crate::noise::{noise_2d, seed_offset, value_noise_2d};
use crate::palette::{ASTEROID_OUTLINE, OreType, Palette, Rgb, mix};
use crate::params::GenerationParameters;
use crate::seed::SeededRng;

/// Asteroid generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidConfig {
    pub size: u32,
    /// Surface detail stamps are `complexity * 3`
    pub complexity: u32,
    /// Edge displacement strength
    pub roughness: f64,
    pub elongation_x: f64,
    pub elongation_y: f64,
    /// Degrees
    pub rotation: f64,
    pub crater_count: u32,
    pub crater_depth: f64,
    /// 0 gives a hard edge, larger values a crisper logistic edge
    pub edge_sharpness: f64,
    pub noise_scale: f64,
    pub brightness: f64,
    pub contrast: f64,
    pub metallic: bool,
    /// Overrides the palette with the ore color table
    pub ore_type: Option<OreType>,
    /// 0.0..=1.0, draws `floor(damage * 10)` cracks
    pub damage: f64,
}

impl Default for AsteroidConfig {
    fn default() -> Self {
        Self {
            size: 64,
            complexity: 5,
            roughness: 0.5,
            elongation_x: 1.0,
            elongation_y: 1.0,
            rotation: 0.0,
            crater_count: 3,
            crater_depth: 0.5,
            edge_sharpness: 0.7,
            noise_scale: 0.1,
            brightness: 1.0,
            contrast: 1.0,
            metallic: false,
            ore_type: None,
            damage: 0.0,
        }
    }
}

impl AsteroidConfig {
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_craters(mut self, count: u32, depth: f64) -> Self {
        self.crater_count = count;
        self.crater_depth = depth;
        self
    }

    pub fn with_roughness(mut self, roughness: f64) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn with_ore(mut self, ore: OreType) -> Self {
        self.ore_type = Some(ore);
        self
    }

    pub fn with_damage(mut self, damage: f64) -> Self {
        self.damage = damage;
        self
    }

    pub fn from_params(params: &GenerationParameters) -> Result<Self> {
        let d = Self::default();
        let ore_type = match params.str_or("ore_type", "none")? {
            "none" | "" => None,
            name => Some(name.parse()?),
        };
        Ok(Self {
            size: params.u32_or("size", d.size)?,
            complexity: params.u32_or("complexity", d.complexity)?,
            roughness: params.f64_or("roughness", d.roughness)?,
            elongation_x: params.f64_or("elongation_x", d.elongation_x)?,
            elongation_y: params.f64_or("elongation_y", d.elongation_y)?,
            rotation: params.f64_or("rotation", d.rotation)?,
            crater_count: params.u32_or("crater_count", d.crater_count)?,
            crater_depth: params.f64_or("crater_depth", d.crater_depth)?,
            edge_sharpness: params.f64_or("edge_sharpness", d.edge_sharpness)?,
            noise_scale: params.f64_or("noise_scale", d.noise_scale)?,
            brightness: params.f64_or("brightness", d.brightness)?,
            contrast: params.f64_or("contrast", d.contrast)?,
            metallic: params.bool_or("metallic", d.metallic)?,
            ore_type,
            damage: params.f64_or("damage", d.damage)?,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Crater {
    x: f64,
    y: f64,
    radius: f64,
}

/// Generate an asteroid sprite
pub fn generate_asteroid(
    config: &AsteroidConfig,
    palette: &Palette,
    seed: u32,
) -> Result<SpriteBuffer> {
    let size = check_size(config.size)?;
    check_max("complexity", config.complexity, 10)?;
    check_max("crater_count", config.crater_count, 12)?;
    let palette = config.ore_type.map_or(*palette, OreType::palette);
    let mut rng = SeededRng::new(seed);
    let mut buffer = SpriteBuffer::square(size);

    let n = size as f64;
    let center = n / 2.0;
    let base_radius = n / 2.0 * 0.85;
    let offset = seed_offset(seed);

    let craters: Vec<Crater> = (0..config.crater_count)
        .map(|_| Crater {
            x: (rng.next() * 0.6 + 0.2) * n,
            y: (rng.next() * 0.6 + 0.2) * n,
            radius: base_radius * 0.2 * (0.5 + rng.next() * 0.5),
        })
        .collect();

    let angle = config.rotation * PI / 180.0;
    let (sin_a, cos_a) = angle.sin_cos();
    let elong_x = nonzero(config.elongation_x);
    let elong_y = nonzero(config.elongation_y);

    for y in 0..size {
        for x in 0..size {
            let (fx, fy) = (x as f64, y as f64);
            let dx = fx - center;
            let dy = fy - center;
            let ex = (dx * cos_a - dy * sin_a) / elong_x;
            let ey = (dx * sin_a + dy * cos_a) / elong_y;
            let dist = (ex * ex + ey * ey).sqrt();

            let noise = noise_2d(
                fx * config.noise_scale + offset,
                fy * config.noise_scale + offset,
            );
            let threshold = base_radius + noise * config.roughness * base_radius * 0.3;
            let edge = dist - threshold;
            let alpha = if config.edge_sharpness > 0.0 {
                1.0 / (1.0 + (edge * config.edge_sharpness * 10.0).exp())
            } else if edge < 0.0 {
                1.0
            } else {
                0.0
            };
            if alpha < 0.01 {
                continue;
            }

            let crater_factor = craters
                .iter()
                .filter_map(|c| {
                    let d = ((fx - c.x).powi(2) + (fy - c.y).powi(2)).sqrt();
                    (d < c.radius).then(|| (1.0 - d / c.radius) * config.crater_depth)
                })
                .fold(0.0, f64::max);

            let mut rgb = if crater_factor > 0.0 {
                mix(palette.dark, palette.primary, 1.0 - crater_factor)
            } else {
                let detail = value_noise_2d(fx * 0.15 + offset, fy * 0.15 + offset);
                surface_color(&palette, (dist / base_radius + detail * 0.6) * 0.5)
            };

            for c in rgb.iter_mut() {
                *c = ((*c / 255.0 - 0.5) * config.contrast + 0.5) * config.brightness * 255.0;
                if config.metallic {
                    *c += noise.abs() * 0.3 * 100.0;
                }
            }
            buffer.set_pixel(x, y, rgba(rgb, alpha * 255.0));
        }
    }

    // Surface detail
    let vein = config.ore_type.map(OreType::vein);
    let vein_chance = config.complexity as f64 * 0.01;
    for _ in 0..config.complexity * 3 {
        let x = (rng.next() * n).floor() as i64;
        let y = (rng.next() * n).floor() as i64;
        if let Some(p) = buffer.get(x, y).filter(|p| p[3] != 0) {
            let roll = rng.next();
            let color = match vein {
                Some(vein) if roll < vein_chance => vein,
                _ if roll > 0.5 => palette.secondary,
                _ => palette.primary,
            };
            buffer.put(x, y, color.with_alpha(p[3]));
        }
    }

    crack_overlay(&mut buffer, config.damage, &mut rng, Rgb::BLACK);
    buffer.apply(Outline::new(ASTEROID_OUTLINE));

    Ok(buffer)
}

/// Draw `floor(damage * 10)` straight cracks across filled pixels.
///
/// Each crack draws its start point, length and angle from `rng`.
pub fn crack_overlay(buffer: &mut SpriteBuffer, damage: f64, rng: &mut SeededRng, color: Rgb) {
    let count = (damage.clamp(0.0, 1.0) * 10.0).floor() as u32;
    let size = buffer.width.min(buffer.height) as f64;
    for _ in 0..count {
        let x = (rng.next() * size).floor();
        let y = (rng.next() * size).floor();
        let length = (rng.next() * size * 0.3).floor() as u32 + 3;
        let angle = rng.next() * PI * 2.0;
        for j in 0..length {
            let cx = (x + angle.cos() * j as f64).floor() as i64;
            let cy = (y + angle.sin() * j as f64).floor() as i64;
            if let Some(p) = buffer.get(cx, cy).filter(|p| p[3] != 0) {
                buffer.put(cx, cy, color.with_alpha(p[3]));
            }
        }
    }
}

/// Four-stop gradient primary -> secondary -> accent -> dark
fn surface_color(palette: &Palette, t: f64) -> [f64; 3] {
    if t < 0.33 {
        mix(palette.primary, palette.secondary, t * 3.0)
    } else if t < 0.66 {
        mix(palette.secondary, palette.accent, (t - 0.33) * 3.0)
    } else {
        mix(palette.accent, palette.dark, (t - 0.66) * 3.0)
    }
}

fn nonzero(v: f64) -> f64 {
    if v.abs() < 1e-6 { 1e-6 } else { v }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> AsteroidConfig {
        AsteroidConfig::default()
            .with_size(64)
            .with_craters(3, 0.5)
            .with_roughness(0.5)
    }

    #[test]
    fn test_reproducible() {
        let palette = Palette::default();
        let a = generate_asteroid(&scenario(), &palette, 777).unwrap();
        let b = generate_asteroid(&scenario(), &palette, 777).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_crater_positions_follow_seed() {
        let palette = Palette::default();
        let a = generate_asteroid(&scenario(), &palette, 1).unwrap();
        let b = generate_asteroid(&scenario(), &palette, 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_craters_never_add_silhouette() {
        let palette = Palette::default();
        let plain = generate_asteroid(&scenario().with_craters(0, 0.5), &palette, 9).unwrap();
        let cratered = generate_asteroid(&scenario().with_craters(6, 1.0), &palette, 9).unwrap();
        // Surface detail lands on different pixels, but only ever recolors
        assert_eq!(plain.filled_count(), cratered.filled_count());
    }

    #[test]
    fn test_center_filled_corners_empty() {
        let ast = generate_asteroid(&scenario(), &Palette::default(), 3).unwrap();
        assert!(!ast.is_empty_at(32, 32));
        assert!(ast.is_empty_at(0, 0));
        assert!(ast.is_empty_at(63, 63));
    }

    #[test]
    fn test_outline_color() {
        let ast = generate_asteroid(&scenario(), &Palette::default(), 3).unwrap();
        let outline = ASTEROID_OUTLINE.opaque();
        assert!(ast.pixels.chunks_exact(4).any(|p| p == outline));
    }

    #[test]
    fn test_ore_overrides_palette() {
        let config = scenario().with_ore(OreType::Gold).with_craters(0, 0.0);
        let ast = generate_asteroid(&config, &Palette::default(), 5).unwrap();
        let cyan = Palette::default().primary;
        let center = ast.get_pixel(32, 32);
        assert_ne!([center[0], center[1], center[2]], [cyan.r, cyan.g, cyan.b]);
    }

    #[test]
    fn test_damage_cracks_only_on_surface() {
        let palette = Palette::default();
        let intact = generate_asteroid(&scenario(), &palette, 21).unwrap();
        let damaged = generate_asteroid(&scenario().with_damage(1.0), &palette, 21).unwrap();
        assert_eq!(intact.filled_count(), damaged.filled_count());
    }

    #[test]
    fn test_detail_limits() {
        let palette = Palette::default();
        let craters = scenario().with_craters(13, 0.5);
        let detail = AsteroidConfig {
            complexity: u32::MAX,
            ..scenario()
        };
        for config in [craters, detail] {
            assert!(matches!(
                generate_asteroid(&config, &palette, 0),
                Err(crate::error::GenError::InvalidParameter(_))
            ));
        }
        assert!(generate_asteroid(&scenario().with_craters(12, 1.0), &palette, 0).is_ok());
    }

    #[test]
    fn test_from_params() {
        let params = GenerationParameters::new()
            .with("size", 48)
            .with("ore_type", "crystal")
            .with("metallic", true);
        let config = AsteroidConfig::from_params(&params).unwrap();
        assert_eq!(config.size, 48);
        assert_eq!(config.ore_type, Some(OreType::Crystal));
        assert!(config.metallic);
        let params = GenerationParameters::new().with("ore_type", "adamantium");
        assert!(AsteroidConfig::from_params(&params).is_err());
    }
}
