//! CLI interface for Purewave

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Band-limited tones and colored noise, live or rendered to WAV
#[derive(Parser)]
#[command(name = "purewave")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Tone overrides shared by `play` and `render`
#[derive(Args, Debug, Clone)]
pub struct ToneArgs {
    /// Waveform: sine, square, sawtooth, triangle or a noise color (white-noise, brown-noise, pink-noise, am-noise)
    #[arg(short, long)]
    pub waveform: Option<String>,

    /// Fundamental frequency in Hz
    #[arg(short, long)]
    pub frequency: Option<f64>,

    /// Number of harmonics
    #[arg(long)]
    pub harmonics: Option<u32>,

    /// Gain in dBFS (0 or below)
    #[arg(short, long, allow_hyphen_values = true)]
    pub gain: Option<f64>,

    /// Use naive oscillators instead of band-limited synthesis
    #[arg(long)]
    pub raw: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play a tone until Ctrl-C
    Play {
        /// Configuration file path
        #[arg(short, long, default_value = "purewave.yaml")]
        config: PathBuf,

        #[command(flatten)]
        tone: ToneArgs,
    },

    /// Render a tone to a WAV file
    Render {
        /// Configuration file path
        #[arg(short, long, default_value = "purewave.yaml")]
        config: PathBuf,

        #[command(flatten)]
        tone: ToneArgs,

        /// Duration in seconds
        #[arg(short, long)]
        duration: Option<f64>,

        /// Sample rate in Hz
        #[arg(short, long)]
        sample_rate: Option<u32>,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Estimate the fundamental of a WAV file
    Analyze {
        /// WAV file to read
        file: PathBuf,
    },

    /// List available audio devices
    Devices,

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "purewave.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}
