//! Waveform selection and synthesis parameters

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Stochastic noise colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseColor {
    /// Uniform random samples
    White,
    /// Leaky-integrated white noise (1/f^2)
    Brown,
    /// Six-pole 1/f approximation
    Pink,
    /// Band-limited static with crackle and hum
    AmRadio,
}

impl NoiseColor {
    pub const ALL: [NoiseColor; 4] = [
        NoiseColor::White,
        NoiseColor::Brown,
        NoiseColor::Pink,
        NoiseColor::AmRadio,
    ];

    /// Stable identifier used by selectors and file names
    pub fn id(&self) -> &'static str {
        match self {
            NoiseColor::White => "white",
            NoiseColor::Brown => "brown",
            NoiseColor::Pink => "pink",
            NoiseColor::AmRadio => "am",
        }
    }
}

impl FromStr for NoiseColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let color = s.trim().to_ascii_lowercase();
        let color = color.strip_suffix("-noise").unwrap_or(&color);
        match color {
            "white" => Ok(NoiseColor::White),
            "brown" | "red" => Ok(NoiseColor::Brown),
            "pink" => Ok(NoiseColor::Pink),
            "am" | "am-radio" => Ok(NoiseColor::AmRadio),
            _ => Err(Error::InvalidWaveformKind(s.to_string())),
        }
    }
}

/// What a source produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaveformKind {
    Sine,
    Square,
    Sawtooth,
    Triangle,
    Noise(NoiseColor),
}

impl WaveformKind {
    /// True for kinds built from harmonic coefficients
    pub fn is_harmonic(&self) -> bool {
        !matches!(self, WaveformKind::Noise(_))
    }
}

impl fmt::Display for WaveformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveformKind::Sine => f.write_str("sine"),
            WaveformKind::Square => f.write_str("square"),
            WaveformKind::Sawtooth => f.write_str("sawtooth"),
            WaveformKind::Triangle => f.write_str("triangle"),
            WaveformKind::Noise(color) => write!(f, "{}-noise", color.id()),
        }
    }
}

impl FromStr for WaveformKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" => Ok(WaveformKind::Sine),
            "square" => Ok(WaveformKind::Square),
            "sawtooth" => Ok(WaveformKind::Sawtooth),
            "triangle" => Ok(WaveformKind::Triangle),
            _ => s.parse::<NoiseColor>().map(WaveformKind::Noise),
        }
    }
}

/// Playback flavor for harmonic waveforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneMode {
    /// Band-limited tone built from Fourier coefficients
    #[default]
    ClearTone,
    /// Naive phase-accumulator oscillator
    RawTone,
}

impl ToneMode {
    pub fn from_clear(clear: bool) -> Self {
        if clear {
            ToneMode::ClearTone
        } else {
            ToneMode::RawTone
        }
    }
}

/// Validated synthesis parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformSpec {
    kind: WaveformKind,
    frequency_hz: f64,
    harmonic_count: u32,
}

impl WaveformSpec {
    /// Create a spec, rejecting non-positive frequencies and zero harmonics
    pub fn new(kind: WaveformKind, frequency_hz: f64, harmonic_count: u32) -> Result<Self> {
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "frequency must be positive, got {frequency_hz}"
            )));
        }
        if harmonic_count == 0 {
            return Err(Error::InvalidParameter(
                "harmonic count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            kind,
            frequency_hz,
            harmonic_count,
        })
    }

    /// Parse the waveform selector and validate the rest
    pub fn parse(kind: &str, frequency_hz: f64, harmonic_count: u32) -> Result<Self> {
        Self::new(kind.parse()?, frequency_hz, harmonic_count)
    }

    pub fn kind(&self) -> WaveformKind {
        self.kind
    }

    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    pub fn harmonic_count(&self) -> u32 {
        self.harmonic_count
    }

    /// Conventional export name: `{kind}_{frequency}Hz_{harmonics}harmonics_{rate}sps.wav`
    pub fn file_name(&self, sample_rate: u32) -> String {
        format!(
            "{}_{}Hz_{}harmonics_{}sps.wav",
            self.kind, self.frequency_hz, self.harmonic_count, sample_rate
        )
    }
}
