//! Radar and scanner displays
//!
//! Layers, back to front: grid spokes, range rings, the type-specific sweep
//! or pulse, target blips, centre dot. Everything is lighten-blended, so the
//! layer order only matters where colors overlap.

use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::draw::shade;
use super::{FrameSequence, SpriteBuffer, check_frame_count, frame_progress};
use crate::error::{GenError, Result, check_max, check_size};
use crate::palette::{Palette, Rgb};
use crate::params::GenerationParameters;

/// Blip positions in units of the scan radius
const BLIPS: [(f64, f64); 4] = [(0.3, 0.4), (-0.5, 0.2), (0.2, -0.6), (-0.3, -0.4)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScannerType {
    /// Rotating wedge with a fading tail
    #[default]
    Sweep,
    /// Single expanding ring
    Ping,
    /// Sweep plus a fast ring
    Radar,
    /// Three staggered rings
    Sonar,
}

impl ScannerType {
    pub const ALL: [ScannerType; 4] = [
        ScannerType::Sweep,
        ScannerType::Ping,
        ScannerType::Radar,
        ScannerType::Sonar,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ScannerType::Sweep => "sweep",
            ScannerType::Ping => "ping",
            ScannerType::Radar => "radar",
            ScannerType::Sonar => "sonar",
        }
    }
}

impl FromStr for ScannerType {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self> {
        ScannerType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| GenError::unknown("scanner type", s))
    }
}

impl fmt::Display for ScannerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub scanner_type: ScannerType,
    pub size: u32,
    /// Display diameter as a fraction of the canvas
    pub scan_radius: f64,
    /// Sweep wedge width in degrees
    pub arc_width: f64,
    /// Sweep revolutions per loop
    pub rotation_speed: f64,
    pub line_thickness: f64,
    pub glow_intensity: f64,
    pub fade_length: f64,
    pub ring_count: u32,
    pub show_grid: bool,
    pub show_blips: bool,
    pub animated: bool,
    pub frame_count: u32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            scanner_type: ScannerType::Sweep,
            size: 128,
            scan_radius: 0.8,
            arc_width: 45.0,
            rotation_speed: 1.0,
            line_thickness: 2.0,
            glow_intensity: 1.0,
            fade_length: 0.5,
            ring_count: 3,
            show_grid: true,
            show_blips: false,
            animated: true,
            frame_count: 8,
        }
    }
}

impl ScannerConfig {
    pub fn new(scanner_type: ScannerType) -> Self {
        Self {
            scanner_type,
            ..Default::default()
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_blips(mut self, show: bool) -> Self {
        self.show_blips = show;
        self
    }

    pub fn from_params(params: &GenerationParameters) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            scanner_type: params.parse_or("scanner_type", d.scanner_type)?,
            size: params.u32_or("size", d.size)?,
            scan_radius: params.f64_or("scan_radius", d.scan_radius)?,
            arc_width: params.f64_or("arc_width", d.arc_width)?,
            rotation_speed: params.f64_or("rotation_speed", d.rotation_speed)?,
            line_thickness: params.f64_or("line_thickness", d.line_thickness)?,
            glow_intensity: params.f64_or("glow_intensity", d.glow_intensity)?,
            fade_length: params.f64_or("fade_length", d.fade_length)?,
            ring_count: params.u32_or("ring_count", d.ring_count)?,
            show_grid: params.bool_or("show_grid", d.show_grid)?,
            show_blips: params.bool_or("show_blips", d.show_blips)?,
            animated: params.bool_or("animated", d.animated)?,
            frame_count: params.u32_or("frame_count", d.frame_count)?,
        })
    }
}

/// Generate a scanner display; one frame unless `animated`
///
/// The display has no random elements, so the output does not depend on
/// `seed`; it is accepted for signature parity with the other generators.
pub fn generate_scanner(
    config: &ScannerConfig,
    palette: &Palette,
    _seed: u32,
) -> Result<FrameSequence> {
    let size = check_size(config.size)?;
    check_max("scan_radius", config.scan_radius, 1.0)?;
    check_max("ring_count", config.ring_count, 8)?;
    let frame_count = if config.animated {
        check_frame_count(config.frame_count)?
    } else {
        1
    };
    Ok((0..frame_count)
        .map(|frame| render(config, palette, size, frame_progress(frame, frame_count)))
        .collect())
}

fn render(config: &ScannerConfig, palette: &Palette, size: u32, t: f64) -> SpriteBuffer {
    let mut buffer = SpriteBuffer::square(size);
    let c = size as f64 / 2.0;
    let max_radius = size as f64 * config.scan_radius / 2.0;
    let angle = t * TAU * config.rotation_speed;

    if config.show_grid {
        for spoke in 0..8 {
            let a = spoke as f64 * PI / 4.0;
            buffer.glow_line(
                c,
                c,
                c + a.cos() * max_radius,
                c + a.sin() * max_radius,
                palette.primary,
                0.2,
            );
        }
    }

    for ring in 1..=config.ring_count {
        let radius = max_radius / config.ring_count as f64 * ring as f64;
        buffer.glow_ring(c, c, radius, config.line_thickness, palette.primary, 0.3, 255.0);
    }

    match config.scanner_type {
        ScannerType::Sweep => sweep(&mut buffer, config, palette.accent, max_radius, angle),
        ScannerType::Ping => {
            let phase = (t * 2.0) % 1.0;
            let radius = phase * max_radius;
            let width = max_radius * 0.1;
            buffer.glow_ring(
                c,
                c,
                radius,
                width,
                palette.accent,
                (1.0 - phase) * config.glow_intensity,
                200.0,
            );
        }
        ScannerType::Radar => {
            sweep(&mut buffer, config, palette.accent, max_radius, angle);
            let phase = (t * 3.0) % 1.0;
            buffer.glow_ring(
                c,
                c,
                phase * max_radius,
                2.0,
                palette.secondary,
                (1.0 - phase) * 0.8,
                255.0,
            );
        }
        ScannerType::Sonar => {
            for pulse in 0..3 {
                let phase = (t * 1.5 + pulse as f64 * 0.33) % 1.0;
                let strength = (1.0 - phase) * config.glow_intensity * 0.6;
                buffer.glow_ring(c, c, phase * max_radius, 3.0, palette.accent, strength, 255.0);
            }
        }
    }

    if config.show_blips {
        let blink = (t * 5.0).sin() * 0.5 + 0.5;
        for (bx, by) in BLIPS {
            buffer.glow_ring(
                c + bx * max_radius,
                c + by * max_radius,
                3.0,
                1.0,
                palette.secondary,
                0.5 + blink * 0.5,
                255.0,
            );
        }
    }

    buffer.glow_ring(c, c, 3.0, 1.0, palette.accent, 1.0, 255.0);
    buffer
}

/// Wedge trailing the sweep angle, fading from its leading edge
fn sweep(
    buffer: &mut SpriteBuffer,
    config: &ScannerConfig,
    color: Rgb,
    max_radius: f64,
    angle: f64,
) {
    let arc = config.arc_width.to_radians();
    let c = buffer.width as f64 / 2.0;
    for y in 0..buffer.height {
        for x in 0..buffer.width {
            let dx = x as f64 - c;
            let dy = y as f64 - c;
            if (dx * dx + dy * dy).sqrt() >= max_radius {
                continue;
            }
            let mut diff = dy.atan2(dx) - angle;
            diff = (diff + PI).rem_euclid(TAU) - PI;
            if (0.0..=arc).contains(&diff) {
                let glow = config.glow_intensity * (1.0 - diff / arc) * config.fade_length;
                buffer.blend_max(x as i64, y as i64, shade(color, glow, glow * 150.0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(scanner_type: ScannerType) -> ScannerConfig {
        ScannerConfig {
            show_grid: false,
            ring_count: 0,
            animated: false,
            ..ScannerConfig::new(scanner_type)
        }
    }

    #[test]
    fn test_sweep_wedge_side() {
        let palette = Palette::default();
        let frame = &generate_scanner(&bare(ScannerType::Sweep), &palette, 0).unwrap()[0];
        // Angle 0 at t = 0; the wedge opens towards +y (screen down)
        assert!(!frame.is_empty_at(84, 70));
        assert!(frame.is_empty_at(84, 58));
        assert!(frame.is_empty_at(30, 64));
    }

    #[test]
    fn test_centre_dot_always_drawn() {
        let palette = Palette::default();
        for t in ScannerType::ALL {
            let frames = generate_scanner(&ScannerConfig::new(t), &palette, 0).unwrap();
            assert_eq!(frames.len(), 8);
            for frame in &frames {
                assert!(!frame.is_empty_at(67, 64), "{}", t);
            }
        }
    }

    #[test]
    fn test_blips_toggle() {
        let palette = Palette::default();
        let without = &generate_scanner(&bare(ScannerType::Ping), &palette, 0).unwrap()[0];
        let config = bare(ScannerType::Ping).with_blips(true);
        let with = &generate_scanner(&config, &palette, 0).unwrap()[0];
        // First blip centre sits at (64 + 0.3 * 51.2, 64 + 0.4 * 51.2)
        assert!(without.is_empty_at(82, 84));
        assert!(!with.is_empty_at(82, 84));
    }

    #[test]
    fn test_sweep_rotates_between_frames() {
        let config = ScannerConfig {
            show_grid: false,
            ring_count: 0,
            frame_count: 4,
            ..Default::default()
        };
        let frames = generate_scanner(&config, &Palette::default(), 0).unwrap();
        assert_ne!(frames[0], frames[1]);
        assert_eq!(frames, generate_scanner(&config, &Palette::default(), 0).unwrap());
    }

    #[test]
    fn test_output_ignores_seed() {
        let palette = Palette::default();
        let config = ScannerConfig::new(ScannerType::Radar).with_blips(true);
        assert_eq!(
            generate_scanner(&config, &palette, 1).unwrap(),
            generate_scanner(&config, &palette, 0xdead_beef).unwrap()
        );
    }

    #[test]
    fn test_display_limits() {
        let palette = Palette::default();
        let wide = ScannerConfig {
            scan_radius: 1e12,
            ..bare(ScannerType::Sweep)
        };
        let rings = ScannerConfig {
            ring_count: u32::MAX,
            ..bare(ScannerType::Sonar)
        };
        for config in [wide, rings] {
            assert!(matches!(
                generate_scanner(&config, &palette, 0),
                Err(GenError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_unknown_scanner_type() {
        let params = GenerationParameters::new().with("scanner_type", "lidar");
        assert!(matches!(
            ScannerConfig::from_params(&params),
            Err(GenError::UnknownVariant { .. })
        ));
    }
}
