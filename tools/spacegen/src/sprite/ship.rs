//! Spaceship sprites
//!
//! The hull is grown in the left half of the canvas by one of three faction
//! styles, stamped with cockpit, weapon and engine details, mirrored by the
//! symmetry pass and finally outlined.
//!
//! RNG stream order: hull accent rolls (row-major over the left half), then
//! `complexity` detail stamps.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::modifiers::{Mirror, Outline, SpriteApply};
use super::SpriteBuffer;
use crate::error::{GenError, Result, check_max, check_size};
use crate::palette::{Palette, Rgb};
use crate::params::GenerationParameters;
use crate::seed::SeededRng;

/// Hull construction style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    /// Triangular nose, straight flanks, tapered stern
    #[default]
    Angular,
    /// Elliptical body
    Organic,
    /// Angular nose and stern around an organic midsection
    Hybrid,
}

impl FromStr for Faction {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "angular" => Ok(Faction::Angular),
            "organic" => Ok(Faction::Organic),
            "hybrid" => Ok(Faction::Hybrid),
            _ => Err(GenError::unknown("faction", s)),
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Faction::Angular => "angular",
            Faction::Organic => "organic",
            Faction::Hybrid => "hybrid",
        })
    }
}

/// Mirror pass applied after the half hull is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symmetry {
    #[default]
    Vertical,
    Horizontal,
    /// Vertical then horizontal
    Radial,
    /// Alias of `Radial`
    Both,
    None,
}

impl FromStr for Symmetry {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "vertical" => Ok(Symmetry::Vertical),
            "horizontal" => Ok(Symmetry::Horizontal),
            "radial" => Ok(Symmetry::Radial),
            "both" => Ok(Symmetry::Both),
            "none" => Ok(Symmetry::None),
            _ => Err(GenError::unknown("symmetry", s)),
        }
    }
}

impl Symmetry {
    fn mirrors(self) -> &'static [Mirror] {
        match self {
            Symmetry::Vertical => &[Mirror::Vertical],
            Symmetry::Horizontal => &[Mirror::Horizontal],
            Symmetry::Radial | Symmetry::Both => &[Mirror::Vertical, Mirror::Horizontal],
            Symmetry::None => &[],
        }
    }
}

/// Ship generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    /// Canvas side in pixels
    pub size: u32,
    /// Number of detail stamps (also scales weapon length)
    pub complexity: u32,
    pub faction: Faction,
    pub symmetry: Symmetry,
    pub weapons: bool,
    pub engines: bool,
    /// Cockpit color
    pub bright: Rgb,
    /// Engine exhaust color
    pub engine_color: Rgb,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            size: 32,
            complexity: 5,
            faction: Faction::Angular,
            symmetry: Symmetry::Vertical,
            weapons: true,
            engines: true,
            bright: Rgb::WHITE,
            engine_color: Rgb::from_u32(0xFF6600),
        }
    }
}

impl ShipConfig {
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_complexity(mut self, complexity: u32) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_faction(mut self, faction: Faction) -> Self {
        self.faction = faction;
        self
    }

    pub fn with_symmetry(mut self, symmetry: Symmetry) -> Self {
        self.symmetry = symmetry;
        self
    }

    /// Read from a flat parameter map, defaulting missing keys
    pub fn from_params(params: &GenerationParameters) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            size: params.u32_or("size", d.size)?,
            complexity: params.u32_or("complexity", d.complexity)?,
            faction: params.parse_or("faction", d.faction)?,
            symmetry: params.parse_or("symmetry", d.symmetry)?,
            weapons: params.bool_or("weapons", d.weapons)?,
            engines: params.bool_or("engines", d.engines)?,
            bright: params.parse_or("bright_color", d.bright)?,
            engine_color: params.parse_or("engine_color", d.engine_color)?,
        })
    }
}

/// Generate a ship sprite
pub fn generate_ship(config: &ShipConfig, palette: &Palette, seed: u32) -> Result<SpriteBuffer> {
    let size = check_size(config.size)?;
    check_max("complexity", config.complexity, 10)?;
    let mut rng = SeededRng::new(seed);
    let mut buffer = SpriteBuffer::square(size);

    let hull = palette.primary.opaque();
    let accent = palette.accent.opaque();
    let half = size / 2;
    let cx = half as i64;

    // Hull, left half only
    let accent_chance = match config.faction {
        Faction::Angular => 0.2,
        Faction::Organic => 0.15,
        Faction::Hybrid => 0.18,
    };
    for y in 0..size {
        for x in 0..half {
            let ny = y as f64 / size as f64;
            let nx = x as f64 / half as f64;
            if inside_hull(config.faction, nx, ny) {
                let color = if rng.next() < accent_chance { accent } else { hull };
                buffer.put(cx - x as i64 - 1, y as i64, color);
            }
        }
    }

    stamp_details(&mut buffer, config, &mut rng, accent);

    // Cockpit
    let cockpit_y = (size as f64 * 0.25).floor() as i64;
    let cockpit = (size as i64 / 16).max(1);
    for dy in 0..cockpit {
        for dx in -cockpit..=cockpit {
            if dx.abs() + dy.abs() <= cockpit {
                buffer.put(cx + dx, cockpit_y + dy, config.bright.opaque());
            }
        }
    }

    if config.weapons {
        let weapon_y = (size as f64 * 0.4).floor() as i64;
        let weapon_offset = size as i64 / 6;
        let length = (config.complexity as f64 / 3.0).max(1.0);
        let mut i = 0;
        while (i as f64) < length {
            buffer.put(cx - weapon_offset, weapon_y + i, accent);
            i += 1;
        }
    }

    if config.engines {
        let engine_y = size as i64 - (size as i64 / 8).max(2);
        let engine_size = (size as i64 / 12).max(1);
        let engine_offset = size as i64 / 8;
        buffer.fill_rect(
            cx - engine_offset,
            engine_y,
            engine_size,
            engine_size,
            config.engine_color.opaque(),
        );
    }

    for mirror in config.symmetry.mirrors() {
        buffer.apply(*mirror);
    }
    buffer.apply(Outline::new(palette.dark));

    Ok(buffer)
}

/// Whether a normalized left-half coordinate lies inside the hull
fn inside_hull(faction: Faction, nx: f64, ny: f64) -> bool {
    let tapered = |ny: f64| {
        if ny < 0.3 {
            Some(ny * 1.5)
        } else if ny < 0.7 {
            None
        } else {
            Some((1.0 - ny) * 1.5)
        }
    };
    match faction {
        Faction::Angular => nx < tapered(ny).unwrap_or(0.5),
        Faction::Organic => {
            let dy = ny - 0.5;
            (nx * nx + dy * dy * 4.0).sqrt() < 0.5
        }
        Faction::Hybrid => {
            let threshold = tapered(ny).unwrap_or_else(|| {
                let dy = ny - 0.5;
                0.5 - (nx * nx + dy * dy * 2.0).sqrt()
            });
            nx < threshold * 1.2
        }
    }
}

fn stamp_details(
    buffer: &mut SpriteBuffer,
    config: &ShipConfig,
    rng: &mut SeededRng,
    color: [u8; 4],
) {
    let size = config.size as f64;
    let half = (config.size / 2) as f64;
    let cx = (config.size / 2) as i64;

    let square = |buffer: &mut SpriteBuffer, x: i64, y: i64, s: i64| {
        for dy in 0..s {
            for dx in 0..s {
                buffer.put(cx - x - dx - 1, y + dy, color);
            }
        }
    };
    let disc = |buffer: &mut SpriteBuffer, x: i64, y: i64, s: i64| {
        for dy in -s..=s {
            for dx in -s..=s {
                if dx * dx + dy * dy <= s * s {
                    buffer.put(cx - x - dx - 1, y + dy, color);
                }
            }
        }
    };

    for _ in 0..config.complexity {
        match config.faction {
            Faction::Angular => {
                let y = (rng.next() * size * 0.6).floor() as i64 + (size * 0.2).floor() as i64;
                let x = (rng.next() * half * 0.8).floor() as i64;
                let s = (rng.next() * 2.0).floor() as i64 + 1;
                square(buffer, x, y, s);
            }
            Faction::Organic => {
                let y = (rng.next() * size).floor() as i64;
                let x = (rng.next() * half * 0.7).floor() as i64;
                let s = (rng.next() * 3.0).floor() as i64 + 1;
                disc(buffer, x, y, s);
            }
            Faction::Hybrid => {
                let y = (rng.next() * size).floor() as i64;
                let x = (rng.next() * half * 0.75).floor() as i64;
                let angular = rng.next() < 0.5;
                let s = (rng.next() * 2.0).floor() as i64 + 1;
                if angular {
                    square(buffer, x, y, s);
                } else {
                    disc(buffer, x, y, s);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vertical_symmetry(buf: &SpriteBuffer) {
        let cx = buf.width / 2;
        for y in 0..buf.height {
            for x in 0..cx {
                assert_eq!(
                    buf.get_pixel(cx + x, y),
                    buf.get_pixel(cx - x - 1, y),
                    "asymmetry at x={} y={}",
                    x,
                    y
                );
            }
        }
    }

    #[test]
    fn test_vertical_symmetry_all_factions() {
        let palette = Palette::default();
        for faction in [Faction::Angular, Faction::Organic, Faction::Hybrid] {
            for size in [16, 32, 64] {
                for seed in [0, 1, 42, 9999] {
                    let config = ShipConfig::default().with_size(size).with_faction(faction);
                    let ship = generate_ship(&config, &palette, seed).unwrap();
                    assert_vertical_symmetry(&ship);
                }
            }
        }
    }

    #[test]
    fn test_radial_symmetry() {
        let config = ShipConfig::default().with_symmetry(Symmetry::Radial);
        let ship = generate_ship(&config, &Palette::default(), 5).unwrap();
        assert_vertical_symmetry(&ship);
        let n = ship.height;
        for y in 0..n / 2 {
            for x in 0..ship.width {
                assert_eq!(ship.get_pixel(x, y), ship.get_pixel(x, n - y - 1));
            }
        }
    }

    #[test]
    fn test_determinism() {
        let config = ShipConfig::default().with_faction(Faction::Hybrid).with_complexity(8);
        let palette = Palette::default();
        let a = generate_ship(&config, &palette, 1234).unwrap();
        let b = generate_ship(&config, &palette, 1234).unwrap();
        assert_eq!(a, b);
        let c = generate_ship(&config, &palette, 1235).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_outline_uses_dark() {
        let palette = Palette::default();
        let ship = generate_ship(&ShipConfig::default(), &palette, 3).unwrap();
        let dark = palette.dark.opaque();
        assert!(ship.pixels.chunks_exact(4).any(|p| p == dark));
        // Top-left corner is far from the hull
        assert!(ship.is_empty_at(0, 0));
    }

    #[test]
    fn test_cockpit_is_bright() {
        let ship = generate_ship(&ShipConfig::default(), &Palette::default(), 11).unwrap();
        assert_eq!(ship.get_pixel(16, 8), [255, 255, 255, 255]);
    }

    #[test]
    fn test_unknown_faction() {
        let params = GenerationParameters::new().with("faction", "borg");
        assert!(matches!(
            ShipConfig::from_params(&params),
            Err(GenError::UnknownVariant { kind: "faction", .. })
        ));
    }

    #[test]
    fn test_zero_size() {
        let config = ShipConfig::default().with_size(0);
        assert!(matches!(
            generate_ship(&config, &Palette::default(), 1),
            Err(GenError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_complexity_limit() {
        let palette = Palette::default();
        let config = ShipConfig::default().with_complexity(u32::MAX);
        assert!(matches!(
            generate_ship(&config, &palette, 1),
            Err(GenError::InvalidParameter(_))
        ));
        assert!(generate_ship(&config.with_complexity(10), &palette, 1).is_ok());
    }
}
