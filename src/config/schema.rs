//! Configuration schema definitions

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::gain::DEFAULT_GAIN_DB;
use crate::synth::{ToneMode, WaveformKind, WaveformSpec};

/// Fallback tone frequency for out-of-range input
pub const DEFAULT_FREQUENCY_HZ: f64 = 60.0;

/// Fallback harmonic count for out-of-range input
pub const DEFAULT_HARMONICS: u32 = 15;

/// Main configuration for Purewave
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurewaveConfig {
    /// Audio output settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Tone to play or render
    #[serde(default)]
    pub tone: ToneConfig,

    /// Offline render settings
    #[serde(default)]
    pub render: RenderConfig,
}

impl PurewaveConfig {
    /// Replace out-of-range tone values with their defaults
    pub fn sanitize(&mut self) {
        self.tone.sanitize();
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate < 8000 || self.audio.sample_rate > 192000 {
            bail!("Sample rate must be between 8000 and 192000");
        }
        if self.audio.buffer_size < 64 || self.audio.buffer_size > 8192 {
            bail!("Buffer size must be between 64 and 8192");
        }

        if !self.render.duration.is_finite() || self.render.duration <= 0.0 {
            bail!("Render duration must be positive");
        }
        if self.render.sample_rate < 8000 || self.render.sample_rate > 384000 {
            bail!("Render sample rate must be between 8000 and 384000");
        }

        if let Err(e) = self.tone.waveform.parse::<WaveformKind>() {
            bail!("Tone waveform is invalid: {}", e);
        }

        Ok(())
    }
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz (default: 48000)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Buffer size in frames (default: 512)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: u32,

    /// Output device name (None = default device)
    #[serde(default)]
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
            device: None,
        }
    }
}

fn default_sample_rate() -> u32 { 48000 }
fn default_buffer_size() -> u32 { 512 }

/// Tone parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneConfig {
    /// Waveform selector, e.g. `square` or `pink-noise` (default: square)
    #[serde(default = "default_waveform")]
    pub waveform: String,

    /// Fundamental in Hz (default: 60)
    #[serde(default = "default_frequency")]
    pub frequency: f64,

    /// Harmonic count (default: 15)
    #[serde(default = "default_harmonics")]
    pub harmonics: u32,

    /// Live gain in dBFS (default: -3)
    #[serde(default = "default_tone_gain")]
    pub gain_db: f64,

    /// Band-limited synthesis when true, naive oscillators when false
    #[serde(default = "default_clear_tone")]
    pub clear_tone: bool,
}

impl ToneConfig {
    pub fn sanitize(&mut self) {
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            warn!(frequency = self.frequency, "invalid frequency, using {} Hz", DEFAULT_FREQUENCY_HZ);
            self.frequency = DEFAULT_FREQUENCY_HZ;
        }
        if self.harmonics == 0 {
            warn!("harmonic count must be at least 1, using {}", DEFAULT_HARMONICS);
            self.harmonics = DEFAULT_HARMONICS;
        }
        if !self.gain_db.is_finite() || self.gain_db > 0.0 {
            warn!(gain_db = self.gain_db, "invalid gain, using {} dBFS", DEFAULT_GAIN_DB);
            self.gain_db = DEFAULT_GAIN_DB;
        }
    }

    pub fn tone_mode(&self) -> ToneMode {
        ToneMode::from_clear(self.clear_tone)
    }

    pub fn spec(&self) -> crate::Result<WaveformSpec> {
        WaveformSpec::parse(&self.waveform, self.frequency, self.harmonics)
    }
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            waveform: default_waveform(),
            frequency: default_frequency(),
            harmonics: default_harmonics(),
            gain_db: default_tone_gain(),
            clear_tone: default_clear_tone(),
        }
    }
}

fn default_waveform() -> String { "square".to_string() }
fn default_frequency() -> f64 { DEFAULT_FREQUENCY_HZ }
fn default_harmonics() -> u32 { DEFAULT_HARMONICS }
fn default_tone_gain() -> f64 { DEFAULT_GAIN_DB }
fn default_clear_tone() -> bool { true }

/// Offline render configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Length in seconds (default: 1.0)
    #[serde(default = "default_duration")]
    pub duration: f64,

    /// Sample rate in Hz (default: 48000)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Render gain in dBFS (default: -6)
    #[serde(default = "default_render_gain")]
    pub gain_db: f64,

    /// Directory for exported files (default: current directory)
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            sample_rate: default_sample_rate(),
            gain_db: default_render_gain(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_duration() -> f64 { 1.0 }
fn default_render_gain() -> f64 { -6.0 }
fn default_output_dir() -> String { ".".to_string() }
