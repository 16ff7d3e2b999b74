//! Coordinate-hash noise primitives
//!
//! These are pure functions of their inputs. They never touch an RNG stream;
//! generators fold their seed in by offsetting the coordinates (see
//! [`seed_offset`]).

/// Fractional part, always in `[0, 1)` (also for negative inputs)
#[inline]
fn fract(n: f64) -> f64 {
    n - n.floor()
}

/// Hash noise in `[0, 1)`
#[inline]
pub fn noise_1d(x: f64) -> f64 {
    fract((x * 12.9898).sin() * 43758.5453)
}

/// Hash noise in `[-1, 1)`
#[inline]
pub fn noise_2d(x: f64, y: f64) -> f64 {
    fract((x * 12.9898 + y * 78.233).sin() * 43758.5453) * 2.0 - 1.0
}

/// Coordinate offset derived from a seed, in `[0, 1000)`.
///
/// Large enough to decorrelate seeds, small enough to keep `sin` precise.
#[inline]
pub fn seed_offset(seed: u32) -> f64 {
    (seed % 100_000) as f64 * 0.01
}

/// Value at an integer lattice point, in `[0, 1]`
#[inline]
fn lattice(i: i64, j: i64) -> f64 {
    // Remainder keeps the sign of the dividend
    let h = (i.wrapping_mul(374_761_393).wrapping_add(j.wrapping_mul(668_265_263))) % 1_000_000;
    ((h as f64).sin() + 1.0) / 2.0
}

fn lattice_blend(x: f64, y: f64, weight: impl Fn(f64) -> f64) -> f64 {
    let ix = x.floor();
    let iy = y.floor();
    let fx = weight(x - ix);
    let fy = weight(y - iy);
    let (i, j) = (ix as i64, iy as i64);

    let a = lattice(i, j);
    let b = lattice(i + 1, j);
    let c = lattice(i, j + 1);
    let d = lattice(i + 1, j + 1);

    let top = a + (b - a) * fx;
    let bottom = c + (d - c) * fx;
    top + (bottom - top) * fy - 0.5
}

/// Bilinear lattice noise with linear weights, in `[-0.5, 0.5]`
pub fn value_noise_2d(x: f64, y: f64) -> f64 {
    lattice_blend(x, y, |t| t)
}

/// Bilinear lattice noise with smoothstep weights, in `[-0.5, 0.5]`
pub fn simple_noise_2d(x: f64, y: f64) -> f64 {
    lattice_blend(x, y, |t| t * t * (3.0 - 2.0 * t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_ranges() {
        for i in 0..2000 {
            let x = i as f64 * 0.37 - 300.0;
            let y = i as f64 * -0.11 + 17.0;
            let n1 = noise_1d(x);
            assert!((0.0..1.0).contains(&n1));
            let n2 = noise_2d(x, y);
            assert!((-1.0..1.0).contains(&n2));
            let s = simple_noise_2d(x, y);
            assert!((-0.5..=0.5).contains(&s));
        }
    }

    #[test]
    fn test_noise_is_pure() {
        assert_eq!(noise_2d(3.25, -8.5), noise_2d(3.25, -8.5));
        assert_eq!(simple_noise_2d(1.5, 2.5), simple_noise_2d(1.5, 2.5));
    }

    #[test]
    fn test_lattice_noise_continuous_at_integers() {
        let eps = 1e-9;
        for &(x, y) in &[(3.0, 4.0), (-2.0, 7.0), (10.0, -1.0)] {
            let left = simple_noise_2d(x - eps, y);
            let right = simple_noise_2d(x + eps, y);
            assert!((left - right).abs() < 1e-6);
            let below = value_noise_2d(x, y - eps);
            let above = value_noise_2d(x, y + eps);
            assert!((below - above).abs() < 1e-6);
        }
    }

    #[test]
    fn test_lattice_points_match_hash() {
        assert!((value_noise_2d(2.0, 5.0) - (lattice(2, 5) - 0.5)).abs() < 1e-12);
        assert!((simple_noise_2d(-3.0, 1.0) - (lattice(-3, 1) - 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_seed_offset_differs() {
        assert_ne!(seed_offset(1), seed_offset(2));
        assert!(seed_offset(u32::MAX) < 1000.0);
    }
}
