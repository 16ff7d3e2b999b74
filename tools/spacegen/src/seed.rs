//! Seeded random number generation and seed derivation
//!
//! Every deterministic generator draws from a [`SeededRng`], a 32-bit linear
//! congruential generator. Seeds are either supplied directly or derived from
//! asset identifiers with [`generate_seed`], which hashes
//! `"{asset_type}_{item_id}_{variant}_{frame}"` with CRC32.
//!
//! The seed format is a compatibility contract: changing the separator, the
//! field order, or the hash invalidates every previously generated asset.
//!
//! # Example
//! ```
//! use spacegen::seed::{generate_seed, SeededRng};
//!
//! let seed = generate_seed("asteroid", "ORE_T1_001", "iron", 0);
//! let mut rng = SeededRng::new(seed);
//! let roll = rng.next_int(1, 6);
//! assert!((1..=6).contains(&roll));
//! ```

use std::f64::consts::PI;

use rand::SeedableRng;
use rand_pcg::Pcg32;

/// Numerical Recipes LCG multiplier
const LCG_MULTIPLIER: u32 = 1_664_525;
/// Numerical Recipes LCG increment
const LCG_INCREMENT: u32 = 1_013_904_223;
/// 2^32 as a float, the LCG modulus
const LCG_MODULUS: f64 = 4_294_967_296.0;

/// Derive a seed from asset identifiers.
///
/// The CRC32 runs over the UTF-16 code units of the joined string, each
/// truncated to its low byte. For ASCII identifiers this is the plain byte
/// string.
pub fn generate_seed(asset_type: &str, item_id: &str, variant: &str, frame: u32) -> u32 {
    seed_from_str(&format!("{}_{}_{}_{}", asset_type, item_id, variant, frame))
}

/// Derive a seed for the default variant and first frame.
pub fn generate_default_seed(asset_type: &str, item_id: &str) -> u32 {
    generate_seed(asset_type, item_id, "default", 0)
}

/// CRC32 of an arbitrary string (UTF-16 code units, low byte each).
pub fn seed_from_str(text: &str) -> u32 {
    let units: Vec<u8> = text.encode_utf16().map(|unit| unit as u8).collect();
    crc32fast::hash(&units)
}

/// Source of uniform values in `[0, 1)`.
///
/// Deterministic generators always take a [`SeededRng`]. Exploratory tools
/// such as granular synthesis accept any source, so callers can choose
/// between ambient randomness and a reproducible stream.
pub trait RandomSource {
    /// Next uniform value in `[0, 1)`
    fn next_unit(&mut self) -> f64;

    /// Uniform value mapped to `[-1, 1)`
    fn next_signed(&mut self) -> f64 {
        self.next_unit() * 2.0 - 1.0
    }

    /// Fisher-Yates shuffle, iterating from the back
    fn shuffle_slice<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..items.len()).rev() {
            let j = (self.next_unit() * (i + 1) as f64).floor() as usize;
            items.swap(i, j.min(i));
        }
    }
}

/// Deterministic 32-bit linear congruential generator
///
/// `state = (1664525 * state + 1013904223) mod 2^32`, yielding `state / 2^32`.
/// A seed of zero is valid and is used as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    /// Create a generator whose first draw advances from `seed`
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Current internal state
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Advance and return a value in `[0, 1)`
    pub fn next(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state as f64 / LCG_MODULUS
    }

    /// Integer in `[min, max]` inclusive
    pub fn next_int(&mut self, min: i64, max: i64) -> i64 {
        (self.next() * (max - min + 1) as f64).floor() as i64 + min
    }

    /// Float in `[min, max)`
    pub fn next_float(&mut self, min: f64, max: f64) -> f64 {
        self.next() * (max - min) + min
    }

    /// `true` with probability `p`
    pub fn next_bool(&mut self, p: f64) -> bool {
        self.next() < p
    }

    /// Uniformly pick one element, `None` for an empty slice
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.next_int(0, items.len() as i64 - 1) as usize;
        items.get(index)
    }

    /// In-place Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_int(0, i as i64) as usize;
            items.swap(i, j);
        }
    }

    /// Normally distributed value (Box-Muller, one draw pair per call)
    pub fn next_gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next().max(f64::MIN_POSITIVE);
        let u2 = self.next();
        let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        z0 * std_dev + mean
    }
}

impl RandomSource for SeededRng {
    fn next_unit(&mut self) -> f64 {
        self.next()
    }
}

impl RandomSource for rand::rngs::ThreadRng {
    fn next_unit(&mut self) -> f64 {
        rand::Rng::random::<f64>(self)
    }
}

impl RandomSource for Pcg32 {
    fn next_unit(&mut self) -> f64 {
        rand::Rng::random::<f64>(self)
    }
}

/// Ambient (non-reproducible) randomness for exploratory sound design
pub fn ambient() -> rand::rngs::ThreadRng {
    rand::rng()
}

/// Reproducible stream for sample processing (granular clouds, shuffled
/// slices) when the caller pins a seed
pub fn sample_rng(seed: u32) -> Pcg32 {
    Pcg32::seed_from_u64(u64::from(seed))
}
