//! Drawing primitives shared by the sprite generators

use super::SpriteBuffer;
use crate::palette::Rgb;

/// Round and clamp a float channel into a byte
#[inline]
pub(crate) fn to_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Shade a color by `intensity`, returning RGBA with the given alpha
#[inline]
pub(crate) fn shade(color: Rgb, intensity: f64, alpha: f64) -> [u8; 4] {
    let [r, g, b] = color.scaled(intensity);
    [to_channel(r), to_channel(g), to_channel(b), to_channel(alpha)]
}

/// Float RGB with an explicit alpha into bytes
#[inline]
pub(crate) fn rgba(rgb: [f64; 3], alpha: f64) -> [u8; 4] {
    [to_channel(rgb[0]), to_channel(rgb[1]), to_channel(rgb[2]), to_channel(alpha)]
}

/// Wrap a coordinate into `0..size`
#[inline]
pub(crate) fn wrap(v: i64, size: u32) -> i64 {
    v.rem_euclid(size as i64)
}

impl SpriteBuffer {
    /// Lighten-only blend: every channel (alpha included) keeps the maximum
    #[inline]
    pub fn blend_max(&mut self, x: i64, y: i64, rgba: [u8; 4]) {
        if let Some((x, y)) = self.index_of(x, y) {
            let px = self.pixel_mut(x, y);
            for (dst, src) in px.iter_mut().zip(rgba) {
                *dst = (*dst).max(src);
            }
        }
    }

    /// Lighten-only blend on color channels only, alpha untouched
    #[inline]
    pub fn blend_max_rgb(&mut self, x: i64, y: i64, rgb: [u8; 3]) {
        if let Some((x, y)) = self.index_of(x, y) {
            let px = self.pixel_mut(x, y);
            for i in 0..3 {
                px[i] = px[i].max(rgb[i]);
            }
        }
    }

    /// Mix `rgb` over the existing color by `alpha`, alpha channel untouched
    #[inline]
    pub fn blend_over(&mut self, x: i64, y: i64, rgb: [f64; 3], alpha: f64) {
        if let Some((x, y)) = self.index_of(x, y) {
            let px = self.pixel_mut(x, y);
            for i in 0..3 {
                px[i] = to_channel(px[i] as f64 * (1.0 - alpha) + rgb[i] * alpha);
            }
        }
    }

    /// Solid disc of pixels with `dx² + dy² < r²`
    pub fn fill_disc(&mut self, cx: i64, cy: i64, radius: i64, color: [u8; 4]) {
        let r2 = radius.saturating_mul(radius);
        let (x0, x1) = self.clip_x(cx.saturating_sub(radius), cx.saturating_add(radius));
        let (y0, y1) = self.clip_y(cy.saturating_sub(radius), cy.saturating_add(radius));
        for y in y0..=y1 {
            for x in x0..=x1 {
                let (dx, dy) = (x - cx, y - cy);
                if dx * dx + dy * dy < r2 {
                    self.put(x, y, color);
                }
            }
        }
    }

    /// Solid `w` x `h` block with its top-left corner at (x, y)
    pub fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: [u8; 4]) {
        if w <= 0 || h <= 0 {
            return;
        }
        let (x0, x1) = self.clip_x(x, x.saturating_add(w - 1));
        let (y0, y1) = self.clip_y(y, y.saturating_add(h - 1));
        for py in y0..=y1 {
            for px in x0..=x1 {
                self.put(px, py, color);
            }
        }
    }

    /// Clamp an inclusive column span to the canvas; empty when it misses
    fn clip_x(&self, lo: i64, hi: i64) -> (i64, i64) {
        (lo.max(0), hi.min(self.width as i64 - 1))
    }

    /// Clamp an inclusive row span to the canvas; empty when it misses
    fn clip_y(&self, lo: i64, hi: i64) -> (i64, i64) {
        (lo.max(0), hi.min(self.height as i64 - 1))
    }

    /// Radial-falloff disc, lighten-blended (alpha follows intensity)
    pub fn glow_disc(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb, strength: f64) {
        if radius <= 0.0 {
            return;
        }
        let (x0, x1) = self.clip_x((cx - radius).floor() as i64, (cx + radius).ceil() as i64);
        let (y0, y1) = self.clip_y((cy - radius).floor() as i64, (cy + radius).ceil() as i64);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dist = ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt();
                if dist < radius {
                    let intensity = (1.0 - dist / radius) * strength;
                    self.blend_max(x, y, shade(color, intensity, intensity * 255.0));
                }
            }
        }
    }

    /// Ring of the given thickness, lighten-blended
    ///
    /// Intensity falls off linearly with distance from the ring radius;
    /// `alpha_scale` maps intensity onto the alpha channel.
    #[allow(clippy::too_many_arguments)]
    pub fn glow_ring(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        thickness: f64,
        color: Rgb,
        strength: f64,
        alpha_scale: f64,
    ) {
        if thickness <= 0.0 {
            return;
        }
        let outer = radius + thickness;
        let x0 = (cx - outer).floor().max(0.0) as i64;
        let x1 = ((cx + outer).ceil() as i64).min(self.width as i64 - 1);
        let y0 = (cy - outer).floor().max(0.0) as i64;
        let y1 = ((cy + outer).ceil() as i64).min(self.height as i64 - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dist = ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt();
                let offset = (dist - radius).abs();
                if offset < thickness {
                    let intensity = (1.0 - offset / thickness) * strength;
                    self.blend_max(x, y, shade(color, intensity, intensity * alpha_scale));
                }
            }
        }
    }

    /// DDA line, lighten-blended at a constant intensity
    pub fn glow_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: Rgb, alpha: f64) {
        let dx = x2 - x1;
        let dy = y2 - y1;
        let steps = dx.abs().max(dy.abs()).ceil() as i64;
        if steps == 0 {
            self.blend_max(
                x1.round() as i64,
                y1.round() as i64,
                shade(color, alpha, alpha * 255.0),
            );
            return;
        }
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = (x1 + dx * t).round() as i64;
            let y = (y1 + dy * t).round() as i64;
            self.blend_max(x, y, shade(color, alpha, alpha * 255.0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_max_keeps_brighter() {
        let mut buf = SpriteBuffer::square(2);
        buf.set_pixel(0, 0, [100, 200, 50, 128]);
        buf.blend_max(0, 0, [150, 100, 50, 64]);
        assert_eq!(buf.get_pixel(0, 0), [150, 200, 50, 128]);
    }

    #[test]
    fn test_fill_disc_strict_radius() {
        let mut buf = SpriteBuffer::square(9);
        buf.fill_disc(4, 4, 2, [255, 255, 255, 255]);
        assert!(!buf.is_empty_at(4, 4));
        assert!(!buf.is_empty_at(5, 5));
        // dx² + dy² == r² is excluded
        assert!(buf.is_empty_at(6, 4));
        assert_eq!(buf.filled_count(), 9);
    }

    #[test]
    fn test_oversized_shapes_clip_to_canvas() {
        let mut buf = SpriteBuffer::square(4);
        buf.fill_disc(2, 2, i64::from(u32::MAX), [1, 1, 1, 255]);
        assert_eq!(buf.filled_count(), 16);

        let mut buf = SpriteBuffer::square(4);
        buf.fill_rect(-1_000_000, 2, i64::MAX, 1, [1, 1, 1, 255]);
        assert_eq!(buf.filled_count(), 4);

        let mut buf = SpriteBuffer::square(4);
        buf.glow_disc(2.0, 2.0, 1e12, Rgb::WHITE, 1.0);
        assert_eq!(buf.filled_count(), 16);
    }

    #[test]
    fn test_glow_ring_peaks_on_radius() {
        let mut buf = SpriteBuffer::square(21);
        buf.glow_ring(10.0, 10.0, 5.0, 2.0, Rgb::WHITE, 1.0, 255.0);
        assert_eq!(buf.get_pixel(15, 10), [255, 255, 255, 255]);
        assert!(buf.is_empty_at(10, 10));
    }

    #[test]
    fn test_glow_line_covers_endpoints() {
        let mut buf = SpriteBuffer::square(8);
        buf.glow_line(0.0, 0.0, 7.0, 3.0, Rgb::WHITE, 1.0);
        assert!(!buf.is_empty_at(0, 0));
        assert!(!buf.is_empty_at(7, 3));
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap(-1, 8), 7);
        assert_eq!(wrap(8, 8), 0);
        assert_eq!(wrap(3, 8), 3);
    }
}
