//! Error types shared by the synthesis core and the playback graph

use thiserror::Error;

/// Errors produced by synthesis, playback and file encoding
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Unrecognized waveform or noise selector
    #[error("invalid waveform kind: {0}")]
    InvalidWaveformKind(String),

    /// Out-of-range synthesis parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A processor could not be prepared
    #[error("source failed to initialize: {0}")]
    SourceInitFailed(String),

    /// Offline rendering did not complete
    #[error("rendering failed: {0}")]
    RenderingFailed(String),

    /// A source is already connected to the chain
    #[error("a source is already connected")]
    AlreadyConnected,

    /// Malformed WAV bytes
    #[error("invalid WAV data: {0}")]
    InvalidWav(String),

    /// The audio engine could not be opened or resumed
    #[error("audio backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, Error>;
