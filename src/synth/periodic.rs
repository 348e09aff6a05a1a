//! Wavetable oscillator driven by Fourier coefficients
//!
//! One period is rebuilt from the coefficients with an inverse FFT, keeping
//! only the harmonics that fall below Nyquist at the playback frequency. The
//! table is normalized to a peak of 1.0, matching the browser's
//! `createPeriodicWave` default.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use super::PeriodicWaveCoefficients;

const MIN_TABLE_SIZE: usize = 2048;
const MAX_TABLE_SIZE: usize = 65536;

/// Highest harmonic index the largest wavetable can hold
pub const MAX_TABLE_HARMONIC: u32 = (MAX_TABLE_SIZE / 2) as u32;

/// Band-limited periodic oscillator
///
/// Clones share the wavetable, so instantiating another voice from a
/// prepared oscillator does not copy it.
#[derive(Debug, Clone)]
pub struct PeriodicOscillator {
    table: Arc<[f64]>,
    phase: f64,
    increment: f64,
    frequency: f64,
}

impl PeriodicOscillator {
    /// Build the wavetable for `frequency` at `sample_rate`
    pub fn new(coeffs: &PeriodicWaveCoefficients, frequency: f64, sample_rate: f64) -> Self {
        let nyquist = sample_rate * 0.5;
        let audible = |n: usize| (n as f64) * frequency < nyquist;

        let highest = (1..coeffs.len())
            .rev()
            .find(|&n| audible(n) && (coeffs.real()[n] != 0.0 || coeffs.imag()[n] != 0.0))
            .unwrap_or(1);
        let size = highest
            .saturating_mul(4)
            .clamp(MIN_TABLE_SIZE, MAX_TABLE_SIZE)
            .next_power_of_two();

        let mut spectrum = vec![Complex::new(0.0, 0.0); size];
        for n in 1..coeffs.len().min(size / 2) {
            if !audible(n) {
                break;
            }
            // a·cos + b·sin splits into conjugate bins (a - ib)/2 and (a + ib)/2
            let bin = Complex::new(coeffs.real()[n] * 0.5, -coeffs.imag()[n] * 0.5);
            spectrum[n] = bin;
            spectrum[size - n] = bin.conj();
        }

        let mut planner = FftPlanner::<f64>::new();
        planner.plan_fft_inverse(size).process(&mut spectrum);

        let mut table: Vec<f64> = spectrum.iter().map(|c| c.re).collect();
        let peak = table.iter().fold(0.0f64, |m, s| m.max(s.abs()));
        if peak > f64::EPSILON {
            for sample in table.iter_mut() {
                *sample /= peak;
            }
        } else {
            table.iter_mut().for_each(|s| *s = 0.0);
        }

        Self {
            table: table.into(),
            phase: 0.0,
            increment: frequency / sample_rate,
            frequency,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// One period of the waveform
    pub fn table(&self) -> &[f64] {
        &self.table
    }

    /// Generate the next sample with linear interpolation
    pub fn generate(&mut self) -> f64 {
        let len = self.table.len();
        let position = self.phase * len as f64;
        let index = (position as usize).min(len - 1);
        let frac = position - index as f64;

        let a = self.table[index];
        let b = self.table[(index + 1) % len];
        let sample = a + (b - a) * frac;

        self.phase += self.increment;
        self.phase -= self.phase.floor();

        sample
    }
}
