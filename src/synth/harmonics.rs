//! Closed-form Fourier coefficients for band-limited waveforms
//!
//! Every waveform here is odd-symmetric, so only the sine (imaginary) terms
//! are populated. Index 0 is the DC term and is always zero.

use std::f64::consts::PI;

use crate::error::{Error, Result};

use super::WaveformKind;

/// Real and imaginary Fourier coefficients, indexed by harmonic number
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicWaveCoefficients {
    real: Vec<f64>,
    imag: Vec<f64>,
}

impl PeriodicWaveCoefficients {
    fn zeroed(len: usize) -> Self {
        Self {
            real: vec![0.0; len],
            imag: vec![0.0; len],
        }
    }

    /// Cosine terms
    pub fn real(&self) -> &[f64] {
        &self.real
    }

    /// Sine terms
    pub fn imag(&self) -> &[f64] {
        &self.imag
    }

    pub fn len(&self) -> usize {
        self.imag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imag.is_empty()
    }

    /// Highest harmonic index with a nonzero coefficient
    pub fn highest_harmonic(&self) -> usize {
        (1..self.len())
            .rev()
            .find(|&n| self.real[n] != 0.0 || self.imag[n] != 0.0)
            .unwrap_or(0)
    }
}

/// Build the coefficient arrays for a harmonic waveform.
///
/// Sine reuses the single-harmonic square formula (4/π at the fundamental);
/// the periodic oscillator normalizes its table, so it still plays as a
/// unit sine.
pub fn synthesize(kind: WaveformKind, harmonic_count: u32) -> Result<PeriodicWaveCoefficients> {
    if harmonic_count == 0 {
        return Err(Error::InvalidParameter(
            "harmonic count must be at least 1".to_string(),
        ));
    }
    let h = harmonic_count as usize;

    match kind {
        WaveformKind::Sine => Ok(square(1)),
        WaveformKind::Square => Ok(square(h)),
        WaveformKind::Sawtooth => Ok(sawtooth(h)),
        WaveformKind::Triangle => Ok(triangle(h)),
        WaveformKind::Noise(_) => Err(Error::InvalidWaveformKind(kind.to_string())),
    }
}

fn square(h: usize) -> PeriodicWaveCoefficients {
    let mut coeffs = PeriodicWaveCoefficients::zeroed(h * 2);
    for i in 1..=h {
        let n = 2 * i - 1;
        coeffs.imag[n] = 4.0 / (PI * n as f64);
    }
    coeffs
}

fn sawtooth(h: usize) -> PeriodicWaveCoefficients {
    let mut coeffs = PeriodicWaveCoefficients::zeroed(h + 1);
    for n in 1..=h {
        let sign = if n % 2 == 0 { -1.0 } else { 1.0 };
        coeffs.imag[n] = 2.0 / (PI * n as f64) * sign;
    }
    coeffs
}

fn triangle(h: usize) -> PeriodicWaveCoefficients {
    let mut coeffs = PeriodicWaveCoefficients::zeroed(h * 2 + 1);
    for k in 0..h {
        let n = 2 * k + 1;
        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
        coeffs.imag[n] = 8.0 / (PI * PI * (n * n) as f64) * sign;
    }
    coeffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::NoiseColor;

    fn nonzero(coeffs: &PeriodicWaveCoefficients) -> Vec<usize> {
        (0..coeffs.len()).filter(|&n| coeffs.imag()[n] != 0.0).collect()
    }

    #[test]
    fn test_square_odd_harmonics() {
        for h in [1u32, 2, 7, 15, 64] {
            let coeffs = synthesize(WaveformKind::Square, h).unwrap();
            let expected: Vec<usize> = (1..=h as usize).map(|i| 2 * i - 1).collect();

            assert_eq!(nonzero(&coeffs), expected);
            for &n in &expected {
                assert!((coeffs.imag()[n] - 4.0 / (PI * n as f64)).abs() < 1e-12);
            }
            assert!(coeffs.real().iter().all(|&r| r == 0.0));
            assert_eq!(coeffs.highest_harmonic(), 2 * h as usize - 1);
        }
    }

    #[test]
    fn test_sawtooth_alternating_signs() {
        for h in [1u32, 2, 10, 33] {
            let coeffs = synthesize(WaveformKind::Sawtooth, h).unwrap();
            assert_eq!(nonzero(&coeffs), (1..=h as usize).collect::<Vec<_>>());

            for n in 1..=h as usize {
                let value = coeffs.imag()[n];
                assert_eq!(value > 0.0, n % 2 == 1, "wrong sign at harmonic {}", n);
                assert!((value.abs() - 2.0 / (PI * n as f64)).abs() < 1e-12);
            }
            assert!(coeffs.real().iter().all(|&r| r == 0.0));
        }
    }

    #[test]
    fn test_triangle_odd_alternating() {
        for h in [1u32, 3, 8, 21] {
            let coeffs = synthesize(WaveformKind::Triangle, h).unwrap();
            let indices = nonzero(&coeffs);
            assert_eq!(indices.len(), h as usize);

            for (k, &n) in indices.iter().enumerate() {
                assert_eq!(n, 2 * k + 1);
                let value = coeffs.imag()[n];
                assert_eq!(value > 0.0, k % 2 == 0, "wrong sign at harmonic {}", n);
                assert!((value.abs() - 8.0 / (PI * PI * (n * n) as f64)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_sine_uses_single_square_harmonic() {
        let coeffs = synthesize(WaveformKind::Sine, 40).unwrap();
        assert_eq!(nonzero(&coeffs), vec![1]);
        assert!((coeffs.imag()[1] - 4.0 / PI).abs() < 1e-12);
    }

    #[test]
    fn test_deterministic() {
        let a = synthesize(WaveformKind::Triangle, 12).unwrap();
        let b = synthesize(WaveformKind::Triangle, 12).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_noise_kind_rejected() {
        let err = synthesize(WaveformKind::Noise(NoiseColor::Pink), 4).unwrap_err();
        assert!(matches!(err, Error::InvalidWaveformKind(_)));
    }

    #[test]
    fn test_zero_harmonics_rejected() {
        assert!(matches!(
            synthesize(WaveformKind::Square, 0),
            Err(Error::InvalidParameter(_))
        ));
    }
}
