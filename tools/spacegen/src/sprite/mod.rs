//! Procedural pixel-art sprite generation
//!
//! Seven generators map a config, a [`Palette`] and a seed to RGBA pixel
//! buffers. Ships and asteroids are single images; projectiles, effects,
//! backgrounds, lasers and scanners produce a [`FrameSequence`] whose frame
//! `f` is rendered at progress `f / frame_count`.
//!
//! # Example
//! ```no_run
//! use spacegen::palette::palette_preset;
//! use spacegen::sprite::*;
//!
//! let palette = palette_preset("pirate_red").unwrap();
//! let config = ShipConfig::default().with_faction(Faction::Organic);
//! let ship = generate_ship(&config, &palette, 42).unwrap();
//! write_png(&ship, std::path::Path::new("ship.png")).unwrap();
//!
//! let frames = generate_effect(&EffectConfig::default(), &palette, 42).unwrap();
//! write_sprite_sheet(&frames, std::path::Path::new("explosion.png")).unwrap();
//! ```

mod asteroid;
mod background;
mod draw;
mod effect;
mod export;
mod laser;
mod modifiers;
mod projectile;
mod scanner;
mod ship;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, Result, check_max};
use crate::palette::Palette;
use crate::params::GenerationParameters;

// Core type
pub use self::buffer::SpriteBuffer;

pub use asteroid::{AsteroidConfig, crack_overlay, generate_asteroid};
pub use background::{BackgroundConfig, BackgroundType, generate_background};
pub use effect::{EffectConfig, EffectType, explosion_radius, generate_effect};
pub use export::{encode_png, sprite_sheet, write_png, write_sprite_sheet};
pub use laser::{LaserConfig, LaserType, generate_laser};
pub use modifiers::{Mirror, Outline, SpriteApply, SpriteModifier};
pub use projectile::{ProjectileConfig, ProjectileType, generate_projectile};
pub use scanner::{ScannerConfig, ScannerType, generate_scanner};
pub use ship::{Faction, ShipConfig, Symmetry, generate_ship};

/// Longest animation any generator renders
pub const MAX_FRAME_COUNT: u32 = 64;

/// Ordered frames of one animation, all sharing a canvas size
pub type FrameSequence = Vec<SpriteBuffer>;

/// Normalized progress of frame `frame` in an animation of `frame_count`
#[inline]
pub fn frame_progress(frame: u32, frame_count: u32) -> f64 {
    frame as f64 / frame_count.max(1) as f64
}

pub(crate) fn check_frame_count(frame_count: u32) -> Result<u32> {
    if frame_count == 0 {
        return Err(GenError::InvalidParameter(
            "frame_count must be at least 1".into(),
        ));
    }
    check_max("frame_count", frame_count, MAX_FRAME_COUNT)
}

/// The seven sprite generator families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpriteKind {
    Ship,
    Asteroid,
    Projectile,
    Effect,
    Background,
    Laser,
    Scanner,
}

impl SpriteKind {
    pub const ALL: [SpriteKind; 7] = [
        SpriteKind::Ship,
        SpriteKind::Asteroid,
        SpriteKind::Projectile,
        SpriteKind::Effect,
        SpriteKind::Background,
        SpriteKind::Laser,
        SpriteKind::Scanner,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SpriteKind::Ship => "ship",
            SpriteKind::Asteroid => "asteroid",
            SpriteKind::Projectile => "projectile",
            SpriteKind::Effect => "effect",
            SpriteKind::Background => "background",
            SpriteKind::Laser => "laser",
            SpriteKind::Scanner => "scanner",
        }
    }

    /// Whether the generator produces more than one frame
    pub fn is_animated(self) -> bool {
        !matches!(self, SpriteKind::Ship | SpriteKind::Asteroid)
    }
}

impl FromStr for SpriteKind {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self> {
        SpriteKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| GenError::unknown("sprite kind", s))
    }
}

impl fmt::Display for SpriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generate any sprite kind from a flat parameter map.
///
/// Single-image generators return a one-frame sequence.
pub fn generate(
    kind: SpriteKind,
    params: &GenerationParameters,
    palette: &Palette,
    seed: u32,
) -> Result<FrameSequence> {
    let frames = match kind {
        SpriteKind::Ship => vec![generate_ship(&ShipConfig::from_params(params)?, palette, seed)?],
        SpriteKind::Asteroid => vec![generate_asteroid(
            &AsteroidConfig::from_params(params)?,
            palette,
            seed,
        )?],
        SpriteKind::Projectile => {
            generate_projectile(&ProjectileConfig::from_params(params)?, palette, seed)?
        }
        SpriteKind::Effect => generate_effect(&EffectConfig::from_params(params)?, palette, seed)?,
        SpriteKind::Background => {
            generate_background(&BackgroundConfig::from_params(params)?, palette, seed)?
        }
        SpriteKind::Laser => generate_laser(&LaserConfig::from_params(params)?, palette, seed)?,
        SpriteKind::Scanner => {
            generate_scanner(&ScannerConfig::from_params(params)?, palette, seed)?
        }
    };
    tracing::debug!(
        "Generated {} ({} frame(s), {}x{}, seed {})",
        kind,
        frames.len(),
        frames.first().map_or(0, |f| f.width),
        frames.first().map_or(0, |f| f.height),
        seed
    );
    Ok(frames)
}

mod buffer {
    /// RGBA sprite buffer; a pixel with alpha 0 is empty
    #[derive(Clone, PartialEq, Eq)]
    pub struct SpriteBuffer {
        /// Width in pixels
        pub width: u32,
        /// Height in pixels
        pub height: u32,
        /// RGBA pixel data (4 bytes per pixel, row-major order)
        pub pixels: Vec<u8>,
    }

    impl std::fmt::Debug for SpriteBuffer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("SpriteBuffer")
                .field("width", &self.width)
                .field("height", &self.height)
                .field("filled", &self.filled_count())
                .finish()
        }
    }

    impl SpriteBuffer {
        /// Create a new buffer with every pixel empty
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                pixels: vec![0u8; (width * height * 4) as usize],
            }
        }

        /// Create an empty square canvas
        pub fn square(size: u32) -> Self {
            Self::new(size, size)
        }

        /// Create a buffer filled with a solid color
        pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
            let mut buffer = Self::new(width, height);
            for chunk in buffer.pixels.chunks_exact_mut(4) {
                chunk.copy_from_slice(&color);
            }
            buffer
        }

        /// Get pixel at (x, y)
        #[inline]
        pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
            let idx = ((y * self.width + x) * 4) as usize;
            [
                self.pixels[idx],
                self.pixels[idx + 1],
                self.pixels[idx + 2],
                self.pixels[idx + 3],
            ]
        }

        /// Set pixel at (x, y)
        #[inline]
        pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
            let idx = ((y * self.width + x) * 4) as usize;
            self.pixels[idx..idx + 4].copy_from_slice(&color);
        }

        /// Get mutable slice of pixel data at (x, y)
        #[inline]
        pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
            let idx = ((y * self.width + x) * 4) as usize;
            &mut self.pixels[idx..idx + 4]
        }

        /// Whether (x, y) has alpha 0
        #[inline]
        pub fn is_empty_at(&self, x: u32, y: u32) -> bool {
            self.pixels[((y * self.width + x) * 4 + 3) as usize] == 0
        }

        /// Map signed coordinates to the canvas, `None` when outside
        #[inline]
        pub fn index_of(&self, x: i64, y: i64) -> Option<(u32, u32)> {
            if x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64 {
                Some((x as u32, y as u32))
            } else {
                None
            }
        }

        /// Set a pixel given signed coordinates, ignoring writes off the canvas
        #[inline]
        pub fn put(&mut self, x: i64, y: i64, color: [u8; 4]) {
            if let Some((x, y)) = self.index_of(x, y) {
                self.set_pixel(x, y, color);
            }
        }

        /// Pixel at signed coordinates, `None` off the canvas
        #[inline]
        pub fn get(&self, x: i64, y: i64) -> Option<[u8; 4]> {
            self.index_of(x, y).map(|(x, y)| self.get_pixel(x, y))
        }

        /// Number of non-empty pixels
        pub fn filled_count(&self) -> usize {
            self.pixels.chunks_exact(4).filter(|p| p[3] != 0).count()
        }

        /// Whether every pixel is empty
        pub fn is_blank(&self) -> bool {
            self.filled_count() == 0
        }
    }
}
