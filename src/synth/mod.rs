//! Synthesis primitives
//!
//! Harmonic coefficient synthesis, oscillators, noise generators and the
//! signal source abstraction that ties them together.

mod harmonics;
mod noise;
mod oscillator;
mod periodic;
mod source;
mod waveform;

pub use harmonics::{synthesize, PeriodicWaveCoefficients};
pub use noise::NoiseGenerator;
pub use oscillator::{Oscillator, Shape};
pub use periodic::{PeriodicOscillator, MAX_TABLE_HARMONIC};
pub use source::{Processor, ProcessorHandle, SignalSource};
pub use waveform::{NoiseColor, ToneMode, WaveformKind, WaveformSpec};
