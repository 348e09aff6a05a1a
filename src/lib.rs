//! Purewave - band-limited tones and colored noise
//!
//! Synthesizes harmonically exact periodic waveforms and stochastic noise,
//! plays them through a single-source mixing graph, and renders them offline
//! to 32-bit float WAV files.

pub mod config;
pub mod engine;
pub mod error;
pub mod synth;

pub use config::PurewaveConfig;
pub use engine::{encode_wav, render, MixGraph, OfflineRenderer, PcmBuffer};
pub use error::{Error, Result};
pub use synth::{NoiseColor, ToneMode, WaveformKind, WaveformSpec};
