//! Whole-buffer post-processing passes
//!
//! Each pass is a value implementing [`SpriteModifier`], chained with
//! [`SpriteApply::apply`].

use super::SpriteBuffer;
use crate::palette::Rgb;

/// Trait for sprite post-processing passes
pub trait SpriteModifier {
    /// Apply the modification to the sprite buffer
    fn apply(&self, buffer: &mut SpriteBuffer);
}

/// Extension trait for fluent modifier application
pub trait SpriteApply {
    /// Apply a modifier and return self for chaining
    fn apply<M: SpriteModifier>(&mut self, modifier: M) -> &mut Self;
}

impl SpriteApply for SpriteBuffer {
    fn apply<M: SpriteModifier>(&mut self, modifier: M) -> &mut Self {
        modifier.apply(self);
        self
    }
}

/// Stamp `color` on every empty pixel with a filled 8-connected neighbour.
///
/// Candidates are collected before any write, so the pass never grows from
/// its own output and never touches a filled pixel.
#[derive(Debug, Clone, Copy)]
pub struct Outline {
    pub color: Rgb,
}

impl Outline {
    pub fn new(color: Rgb) -> Self {
        Self { color }
    }
}

impl SpriteModifier for Outline {
    fn apply(&self, buffer: &mut SpriteBuffer) {
        let mut outline = Vec::new();
        for y in 0..buffer.height {
            for x in 0..buffer.width {
                if buffer.is_empty_at(x, y) && has_filled_neighbor(buffer, x, y) {
                    outline.push((x, y));
                }
            }
        }
        let color = self.color.opaque();
        for (x, y) in outline {
            buffer.set_pixel(x, y, color);
        }
    }
}

fn has_filled_neighbor(buffer: &SpriteBuffer, x: u32, y: u32) -> bool {
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            if let Some(p) = buffer.get(x as i64 + dx, y as i64 + dy)
                && p[3] != 0
            {
                return true;
            }
        }
    }
    false
}

/// Exact mirror copies
///
/// `Vertical` assigns `(cx + x, y) = (cx - x - 1, y)` for every `x < cx`;
/// `Horizontal` assigns row `size - y - 1` from row `y` for every `y < cy`.
/// Empty source pixels are copied too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirror {
    Vertical,
    Horizontal,
}

impl SpriteModifier for Mirror {
    fn apply(&self, buffer: &mut SpriteBuffer) {
        match self {
            Mirror::Vertical => {
                let cx = buffer.width / 2;
                for y in 0..buffer.height {
                    for x in 0..cx {
                        let src = buffer.get_pixel(cx - x - 1, y);
                        buffer.set_pixel(cx + x, y, src);
                    }
                }
            }
            Mirror::Horizontal => {
                let cy = buffer.height / 2;
                let row = (buffer.width * 4) as usize;
                for y in 0..cy {
                    let src = y as usize * row;
                    let dst = (buffer.height - y - 1) as usize * row;
                    buffer.pixels.copy_within(src..src + row, dst);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_surrounds_single_pixel() {
        let mut buf = SpriteBuffer::square(5);
        buf.set_pixel(2, 2, [255, 255, 255, 255]);
        buf.apply(Outline::new(Rgb::new(1, 2, 3)));
        assert_eq!(buf.filled_count(), 9);
        assert_eq!(buf.get_pixel(2, 2), [255, 255, 255, 255]);
        assert_eq!(buf.get_pixel(1, 1), [1, 2, 3, 255]);
        assert!(buf.is_empty_at(0, 0));
    }

    #[test]
    fn test_outline_never_overwrites_fill() {
        let mut buf = SpriteBuffer::square(6);
        buf.fill_rect(1, 1, 3, 3, [9, 9, 9, 255]);
        let before = buf.clone();
        buf.apply(Outline::new(Rgb::BLACK));
        for y in 0..6 {
            for x in 0..6 {
                if !before.is_empty_at(x, y) {
                    assert_eq!(buf.get_pixel(x, y), before.get_pixel(x, y));
                }
            }
        }
    }

    #[test]
    fn test_mirror_vertical_copies_empty() {
        let mut buf = SpriteBuffer::square(4);
        buf.set_pixel(3, 0, [5, 5, 5, 255]);
        buf.set_pixel(0, 1, [7, 7, 7, 255]);
        buf.apply(Mirror::Vertical);
        assert!(buf.is_empty_at(3, 0));
        assert_eq!(buf.get_pixel(3, 1), [7, 7, 7, 255]);
    }

    #[test]
    fn test_mirror_horizontal() {
        let mut buf = SpriteBuffer::square(4);
        buf.set_pixel(1, 0, [5, 5, 5, 255]);
        buf.apply(Mirror::Horizontal);
        assert_eq!(buf.get_pixel(1, 3), [5, 5, 5, 255]);
    }
}
