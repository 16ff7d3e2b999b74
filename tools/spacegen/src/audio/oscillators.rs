//! Pulse shaping and noise sources

use std::f32::consts::PI;

use crate::seed::RandomSource;

/// Band-limited pulse from the first Fourier term of a duty-cycle `width` wave.
///
/// The cosine and sine coefficients are `2/pi * sin(pi*w)` and
/// `2/pi * (1 - cos(pi*w))`; the result is normalized to unit peak.
pub fn pulse(phase: f32, width: f32) -> f32 {
    let real = 2.0 / PI * (PI * width).sin();
    let imag = 2.0 / PI * (1.0 - (PI * width).cos());
    let norm = real.hypot(imag);
    if norm <= f32::EPSILON {
        return 0.0;
    }
    (real * phase.cos() + imag * phase.sin()) / norm
}

/// White noise in `[-1, 1)`
pub fn white_noise(len: usize, rng: &mut impl RandomSource) -> Vec<f32> {
    (0..len).map(|_| rng.next_signed() as f32).collect()
}

/// Pink noise via Paul Kellet's refined filter
pub fn pink_noise(len: usize, rng: &mut impl RandomSource) -> Vec<f32> {
    let mut b = [0.0f32; 7];
    let mut samples = Vec::with_capacity(len);
    for _ in 0..len {
        let white = rng.next_signed() as f32;
        b[0] = 0.99886 * b[0] + white * 0.0555179;
        b[1] = 0.99332 * b[1] + white * 0.0750759;
        b[2] = 0.96900 * b[2] + white * 0.1538520;
        b[3] = 0.86650 * b[3] + white * 0.3104856;
        b[4] = 0.55000 * b[4] + white * 0.5329522;
        b[5] = -0.7616 * b[5] - white * 0.0168980;
        let out = b.iter().sum::<f32>() + white * 0.5362;
        samples.push(out * 0.11);
        b[6] = white * 0.115926;
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::SeededRng;

    #[test]
    fn test_pulse_square_duty() {
        // Half duty: equal coefficients, so the peak sits at a quarter turn
        // past the cosine peak
        let peak = pulse(PI / 4.0, 0.5);
        assert!((peak - 1.0).abs() < 1e-5);
        assert!(pulse(PI / 4.0 + PI, 0.5) < -0.99);
        assert_eq!(pulse(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_noise_reproducible() {
        let a = white_noise(64, &mut SeededRng::new(3));
        let b = white_noise(64, &mut SeededRng::new(3));
        assert_eq!(a, b);
        assert!(a.iter().all(|&s| (-1.0..=1.0).contains(&s)));
    }

    #[test]
    fn test_pink_noise_bounded() {
        let samples = pink_noise(4096, &mut SeededRng::new(9));
        assert!(samples.iter().all(|&s| s.abs() < 1.5));
        assert!(samples.iter().any(|&s| s != 0.0));
    }
}
