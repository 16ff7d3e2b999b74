//! Color palettes and color utilities
//!
//! Every shape generator takes a [`Palette`] and reads its colors by role
//! (primary, secondary, accent, dark). Twelve named presets are built in,
//! plus the ore color tables used by the asteroid generator and the legacy
//! six-color grid palettes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{GenError, Result};

/// An opaque 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value
    pub const fn from_u32(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// RGBA bytes with the given alpha
    #[inline]
    pub fn with_alpha(self, alpha: u8) -> [u8; 4] {
        [self.r, self.g, self.b, alpha]
    }

    /// Opaque RGBA bytes
    #[inline]
    pub fn opaque(self) -> [u8; 4] {
        self.with_alpha(255)
    }

    /// Channels as floats in `0.0..=255.0`
    #[inline]
    pub fn to_f64(self) -> [f64; 3] {
        [self.r as f64, self.g as f64, self.b as f64]
    }

    /// Scale every channel by `factor` (truncating, like a canvas write)
    #[inline]
    pub fn scaled(self, factor: f64) -> [f64; 3] {
        let [r, g, b] = self.to_f64();
        [r * factor, g * factor, b * factor]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self> {
        hex_to_rgb(s)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex_to_rgb(&text).map_err(serde::de::Error::custom)
    }
}

/// Parse `#RRGGBB` or `RRGGBB` (case-insensitive)
pub fn hex_to_rgb(hex: &str) -> Result<Rgb> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(GenError::InvalidParameter(format!(
            "malformed hex color '{}'",
            hex
        )));
    }
    let value = u32::from_str_radix(digits, 16)
        .map_err(|e| GenError::InvalidParameter(format!("malformed hex color '{}': {}", hex, e)))?;
    Ok(Rgb::from_u32(value))
}

/// Format as `#rrggbb`, always lowercase.
///
/// Round trips through [`hex_to_rgb`] are exact up to case: `#ABCDEF` comes
/// back as `#abcdef`.
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    Rgb::new(r, g, b).to_string()
}

/// Per-channel linear blend, rounded.
///
/// `t` is expected in `[0, 1]`; callers are responsible for clamping.
pub fn interpolate(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8;
    Rgb::new(mix(c1.r, c2.r), mix(c1.g, c2.g), mix(c1.b, c2.b))
}

/// Multiply each channel by `factor`, clamped to `[0, 255]`
pub fn adjust_brightness(color: Rgb, factor: f64) -> Rgb {
    let scale = |c: u8| (c as f64 * factor).round().clamp(0.0, 255.0) as u8;
    Rgb::new(scale(color.r), scale(color.g), scale(color.b))
}

/// Float-channel blend without rounding, used inside per-pixel shading
#[inline]
pub fn mix(c1: Rgb, c2: Rgb, t: f64) -> [f64; 3] {
    let a = c1.to_f64();
    let b = c2.to_f64();
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// Four colors addressed by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: Rgb,
    pub secondary: Rgb,
    pub accent: Rgb,
    pub dark: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        CYBER_BLUE.palette
    }
}

impl Palette {
    pub const fn new(primary: Rgb, secondary: Rgb, accent: Rgb, dark: Rgb) -> Self {
        Self {
            primary,
            secondary,
            accent,
            dark,
        }
    }

    /// Parse four hex strings
    pub fn from_hex(primary: &str, secondary: &str, accent: &str, dark: &str) -> Result<Self> {
        Ok(Self::new(
            hex_to_rgb(primary)?,
            hex_to_rgb(secondary)?,
            hex_to_rgb(accent)?,
            hex_to_rgb(dark)?,
        ))
    }

    /// Build from an ordered list of hex colors.
    ///
    /// Four or more colors map to primary, secondary, accent, dark. With three
    /// colors the list is primary, secondary, dark and the accent is the
    /// secondary brightened by 1.3.
    pub fn from_hex_list<S: AsRef<str>>(colors: &[S]) -> Result<Self> {
        let parsed = colors
            .iter()
            .map(|c| hex_to_rgb(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        match parsed.as_slice() {
            [p, s, a, d, ..] => Ok(Self::new(*p, *s, *a, *d)),
            [p, s, d] => Ok(Self::new(*p, *s, adjust_brightness(*s, 1.3), *d)),
            _ => Err(GenError::InvalidParameter(format!(
                "palette needs 3 or 4 colors, got {}",
                parsed.len()
            ))),
        }
    }

    /// Colors in role order
    pub fn colors(&self) -> [Rgb; 4] {
        [self.primary, self.secondary, self.accent, self.dark]
    }
}

/// A named built-in palette
#[derive(Debug, Clone, Copy)]
pub struct PalettePreset {
    /// Lookup key (`snake_case`)
    pub key: &'static str,
    /// Display name
    pub name: &'static str,
    pub description: &'static str,
    pub palette: Palette,
}

const fn preset(
    key: &'static str,
    name: &'static str,
    description: &'static str,
    colors: [u32; 4],
) -> PalettePreset {
    PalettePreset {
        key,
        name,
        description,
        palette: Palette::new(
            Rgb::from_u32(colors[0]),
            Rgb::from_u32(colors[1]),
            Rgb::from_u32(colors[2]),
            Rgb::from_u32(colors[3]),
        ),
    }
}

const CYBER_BLUE: PalettePreset = preset(
    "cyber_blue",
    "Cyber Blue",
    "Futuristic cyber aesthetic",
    [0x00F0FF, 0x0080FF, 0x00FFAA, 0x001020],
);

/// The twelve built-in palettes
pub const PALETTE_PRESETS: [PalettePreset; 12] = [
    CYBER_BLUE,
    preset(
        "military_green",
        "Military Green",
        "Military and tactical vibes",
        [0x4A7C3C, 0x2E5A28, 0x7FA972, 0x1A2A1A],
    ),
    preset(
        "pirate_red",
        "Pirate Red",
        "Aggressive pirate faction",
        [0xC0302C, 0x8B1E1E, 0xFF6B5A, 0x200808],
    ),
    preset(
        "trader_white",
        "Trader White",
        "Clean trader vessels",
        [0xE8E8E8, 0xB0B0B0, 0xFFFFFF, 0x2A2A2A],
    ),
    preset(
        "alien_purple",
        "Alien Purple",
        "Mysterious alien technology",
        [0x9B59B6, 0x6A3A7C, 0xD291FF, 0x1A0A2A],
    ),
    preset(
        "mining_orange",
        "Mining Orange",
        "Industrial mining equipment",
        [0xE67E22, 0xD35400, 0xFFA94D, 0x2A1A0A],
    ),
    preset(
        "police_black",
        "Police Black",
        "Law enforcement fleet",
        [0x2C3E50, 0x1A252F, 0x3498DB, 0x0A0F14],
    ),
    preset(
        "medical_white",
        "Medical White",
        "Medical and rescue ships",
        [0xECF0F1, 0xBDC3C7, 0xE74C3C, 0x2C3E50],
    ),
    preset(
        "fire",
        "Fire",
        "Hot plasma and fire effects",
        [0xFF4500, 0xFF8C00, 0xFFD700, 0x1A0A00],
    ),
    preset(
        "ice",
        "Ice",
        "Frozen and cryo effects",
        [0x7FDBFF, 0x39CCCC, 0xB3FFFF, 0x001A1A],
    ),
    preset(
        "toxic",
        "Toxic",
        "Toxic and biological hazards",
        [0x7FFF00, 0x9ACD32, 0xADFF2F, 0x1A2A0A],
    ),
    preset(
        "energy",
        "Energy",
        "Pure energy manifestation",
        [0xFFD700, 0xFFA500, 0xFFFF00, 0x2A2000],
    ),
];

/// Look up a built-in palette by key
pub fn palette_preset(key: &str) -> Result<Palette> {
    PALETTE_PRESETS
        .iter()
        .find(|p| p.key == key)
        .map(|p| p.palette)
        .ok_or_else(|| GenError::unknown("palette", key))
}

/// Legacy six-color grid palettes, ordered dark to bright
pub const LEGACY_PALETTES: [(&str, [&str; 6]); 4] = [
    (
        "cyber",
        ["#001F3F", "#0074D9", "#00D9FF", "#FFFFFF", "#39CCCC", "#001a33"],
    ),
    (
        "military",
        ["#1A2910", "#4A5D23", "#7CB342", "#C5E1A5", "#2E3B1F", "#8BC34A"],
    ),
    (
        "pirate",
        ["#1A0A0A", "#660000", "#FF3366", "#FFA500", "#330000", "#CC0000"],
    ),
    (
        "trader",
        ["#F5F5F5", "#E0E0E0", "#0080FF", "#FFD700", "#BDBDBD", "#FFFFFF"],
    ),
];

/// Convert a legacy grid palette into roles.
///
/// Slot 0 is the outline color, slot 1 the hull, slot 2 the accent and
/// slot 4 the secondary hull tone.
pub fn legacy_palette(key: &str) -> Result<Palette> {
    let (_, colors) = LEGACY_PALETTES
        .iter()
        .find(|(name, _)| *name == key)
        .ok_or_else(|| GenError::unknown("palette", key))?;
    Palette::from_hex(colors[1], colors[4], colors[2], colors[0])
}

/// Mineral composition of an asteroid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OreType {
    Iron,
    Copper,
    Gold,
    Titanium,
    Uranium,
    Platinum,
    Crystal,
}

impl OreType {
    pub const ALL: [OreType; 7] = [
        OreType::Iron,
        OreType::Copper,
        OreType::Gold,
        OreType::Titanium,
        OreType::Uranium,
        OreType::Platinum,
        OreType::Crystal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OreType::Iron => "iron",
            OreType::Copper => "copper",
            OreType::Gold => "gold",
            OreType::Titanium => "titanium",
            OreType::Uranium => "uranium",
            OreType::Platinum => "platinum",
            OreType::Crystal => "crystal",
        }
    }

    /// Base, highlight, bright and vein colors
    pub fn colors(self) -> [Rgb; 4] {
        let hex = match self {
            OreType::Iron => [0x4A4A4A, 0x6B6B6B, 0x8C8C8C, 0xFF6B35],
            OreType::Copper => [0xB87333, 0xCD7F32, 0xE6A85C, 0xFFA500],
            OreType::Gold => [0xD4AF37, 0xFFD700, 0xFFA500, 0xFFDF00],
            OreType::Titanium => [0x2F4F4F, 0x708090, 0xA9A9A9, 0x00CED1],
            OreType::Uranium => [0x2E8B57, 0x3CB371, 0x00FF7F, 0x00FF00],
            OreType::Platinum => [0xC0C0C0, 0xE5E4E2, 0xFFFFFF, 0xB9F2FF],
            OreType::Crystal => [0x4169E1, 0x6495ED, 0x00BFFF, 0x87CEEB],
        };
        hex.map(Rgb::from_u32)
    }

    /// Ore colors as a role palette; dark is the base at 40% brightness
    pub fn palette(self) -> Palette {
        let [base, highlight, bright, _] = self.colors();
        Palette::new(base, highlight, bright, adjust_brightness(base, 0.4))
    }

    /// Color of exposed ore veins
    pub fn vein(self) -> Rgb {
        self.colors()[3]
    }
}

impl FromStr for OreType {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self> {
        OreType::ALL
            .into_iter()
            .find(|ore| ore.as_str() == s)
            .ok_or_else(|| GenError::unknown("ore type", s))
    }
}

impl fmt::Display for OreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outline color stamped around asteroids
pub const ASTEROID_OUTLINE: Rgb = Rgb::from_u32(0x1A1A1A);
