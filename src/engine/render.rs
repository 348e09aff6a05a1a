//! Offline rendering into a finite PCM buffer

use tracing::info;

use crate::error::{Error, Result};
use crate::synth::{ProcessorHandle, ToneMode, WaveformSpec};

use super::chain::SignalChain;
use super::gain::{sanitize_gain_db, RENDER_GAIN_DB};
use super::wav::{encode_wav, MAX_SAMPLE_RATE};

/// Largest sample count whose byte length still fits a WAV data chunk
const MAX_SAMPLES: usize = (u32::MAX as usize - 36) / 4;

/// Rendered mono audio
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl PcmBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            channels: 1,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Serialize as a 32-bit float WAV file
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        encode_wav(&self.samples, self.sample_rate)
    }
}

/// Renders a waveform spec for a fixed duration, with no real-time constraint
#[derive(Debug, Clone)]
pub struct OfflineRenderer {
    sample_rate: u32,
    gain_db: f64,
    tone_mode: ToneMode,
    seed: Option<u64>,
}

impl OfflineRenderer {
    /// Clear tone at -6 dBFS
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            gain_db: RENDER_GAIN_DB,
            tone_mode: ToneMode::ClearTone,
            seed: None,
        }
    }

    pub fn gain_db(mut self, db: f64) -> Self {
        self.gain_db = sanitize_gain_db(db);
        self
    }

    pub fn tone_mode(mut self, mode: ToneMode) -> Self {
        self.tone_mode = mode;
        self
    }

    /// Seed noise sources for reproducible renders
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Exactly `round(sample_rate * duration)` samples
    pub fn sample_count(&self, duration_seconds: f64) -> Result<usize> {
        if self.sample_rate == 0 || self.sample_rate > MAX_SAMPLE_RATE {
            return Err(Error::InvalidParameter(format!(
                "sample rate must be between 1 and {MAX_SAMPLE_RATE}, got {}",
                self.sample_rate
            )));
        }
        if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "duration must be positive, got {duration_seconds}"
            )));
        }

        let count = (self.sample_rate as f64 * duration_seconds).round();
        if count < 1.0 {
            return Err(Error::RenderingFailed(format!(
                "{duration_seconds}s at {} Hz is shorter than one sample",
                self.sample_rate
            )));
        }
        if count > MAX_SAMPLES as f64 {
            return Err(Error::RenderingFailed(format!(
                "{count} samples exceed the WAV size limit"
            )));
        }
        Ok(count as usize)
    }

    /// Run the source through the gain stage for the full duration
    pub fn render(&self, spec: &WaveformSpec, duration_seconds: f64) -> Result<PcmBuffer> {
        let count = self.sample_count(duration_seconds)?;

        let mut handle = ProcessorHandle::prepare(*spec, self.tone_mode, self.sample_rate)?;
        if let Some(seed) = self.seed {
            handle = handle.with_seed(seed);
        }
        let mut source = handle.instantiate();
        source.start();

        let mut chain = SignalChain::new(self.gain_db);
        chain.connect(source)?;

        let mut samples = Vec::with_capacity(count);
        for index in 0..count {
            let sample = chain.process() as f32;
            if !sample.is_finite() {
                return Err(Error::RenderingFailed(format!(
                    "non-finite sample at index {index}"
                )));
            }
            samples.push(sample);
        }
        chain.disconnect();

        info!(
            kind = %spec.kind(),
            frequency = spec.frequency_hz(),
            samples = count,
            sample_rate = self.sample_rate,
            "rendered offline buffer"
        );

        Ok(PcmBuffer::new(samples, self.sample_rate))
    }
}

/// Render a clear tone at -6 dBFS
pub fn render(spec: &WaveformSpec, duration_seconds: f64, sample_rate: u32) -> Result<PcmBuffer> {
    OfflineRenderer::new(sample_rate).render(spec, duration_seconds)
}
