//! Raw phase-accumulator oscillator
//!
//! Produces the textbook shapes directly from phase, with no band limiting.
//! This is the "raw tone" counterpart of the periodic oscillator.

use std::f64::consts::PI;

use crate::error::{Error, Result};

use super::WaveformKind;

/// Shapes the raw oscillator can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl TryFrom<WaveformKind> for Shape {
    type Error = Error;

    fn try_from(kind: WaveformKind) -> Result<Self> {
        match kind {
            WaveformKind::Sine => Ok(Shape::Sine),
            WaveformKind::Square => Ok(Shape::Square),
            WaveformKind::Sawtooth => Ok(Shape::Sawtooth),
            WaveformKind::Triangle => Ok(Shape::Triangle),
            WaveformKind::Noise(_) => Err(Error::InvalidWaveformKind(kind.to_string())),
        }
    }
}

/// A basic oscillator that generates naive waveforms
#[derive(Debug, Clone)]
pub struct Oscillator {
    shape: Shape,
    phase: f64,
    frequency: f64,
    sample_rate: f64,
}

impl Oscillator {
    /// Create a new oscillator
    pub fn new(shape: Shape, frequency: f64, sample_rate: f64) -> Self {
        Self {
            shape,
            phase: 0.0,
            frequency,
            sample_rate,
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Generate the next sample
    pub fn generate(&mut self) -> f64 {
        let p = self.phase;
        let sample = match self.shape {
            Shape::Sine => (p * 2.0 * PI).sin(),
            Shape::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Shape::Sawtooth => 2.0 * p - 1.0,
            Shape::Triangle => {
                if p < 0.25 {
                    4.0 * p
                } else if p < 0.75 {
                    2.0 - 4.0 * p
                } else {
                    4.0 * p - 4.0
                }
            }
        };

        self.phase += self.frequency / self.sample_rate;
        self.phase -= self.phase.floor();

        sample
    }
}
