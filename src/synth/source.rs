//! Signal sources and their two-phase construction
//!
//! A [`ProcessorHandle`] does the expensive preparation (coefficient
//! synthesis, wavetable construction) in the control context. Turning a
//! handle into a live [`SignalSource`] is synchronous and cheap, so nothing
//! on the audio path ever waits on preparation.

use tracing::debug;

use crate::error::{Error, Result};

use super::{
    synthesize, NoiseColor, NoiseGenerator, Oscillator, PeriodicOscillator, Shape, ToneMode,
    WaveformKind, WaveformSpec, MAX_TABLE_HARMONIC,
};

/// The concrete generator behind a source
pub enum Processor {
    /// Coefficient-driven band-limited oscillator
    Periodic(PeriodicOscillator),
    /// Naive built-in oscillator shape
    Simple(Oscillator),
    /// Stochastic noise color
    Noise(NoiseGenerator),
}

impl Processor {
    fn generate(&mut self) -> f64 {
        match self {
            Processor::Periodic(osc) => osc.generate(),
            Processor::Simple(osc) => osc.generate(),
            Processor::Noise(noise) => noise.advance(),
        }
    }
}

/// A started-or-stopped generator that the mixing graph can own
pub struct SignalSource {
    processor: Processor,
    spec: WaveformSpec,
    mode: ToneMode,
    running: bool,
}

impl SignalSource {
    pub fn new(processor: Processor, spec: WaveformSpec, mode: ToneMode) -> Self {
        Self {
            processor,
            spec,
            mode,
            running: false,
        }
    }

    pub fn processor(&self) -> &Processor {
        &self.processor
    }

    pub fn spec(&self) -> &WaveformSpec {
        &self.spec
    }

    pub fn tone_mode(&self) -> ToneMode {
        self.mode
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Next output sample; silence once stopped
    pub fn next_sample(&mut self) -> f64 {
        if self.running {
            self.processor.generate()
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
enum Prepared {
    Periodic(PeriodicOscillator),
    Simple(Shape),
    Noise(NoiseColor),
}

/// A prepared processor, ready to be instantiated without further work
#[derive(Debug, Clone)]
pub struct ProcessorHandle {
    spec: WaveformSpec,
    mode: ToneMode,
    sample_rate: u32,
    prepared: Prepared,
    seed: Option<u64>,
}

impl ProcessorHandle {
    /// Prepare a processor on the current thread.
    ///
    /// Clear tone harmonic kinds get a periodic wavetable, raw tone harmonic
    /// kinds get the naive oscillator, and noise colors get a noise
    /// generator in either mode.
    pub fn prepare(spec: WaveformSpec, mode: ToneMode, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::InvalidParameter(
                "sample rate must be positive".to_string(),
            ));
        }

        let prepared = match (spec.kind(), mode) {
            (WaveformKind::Noise(color), _) => Prepared::Noise(color),
            (kind, ToneMode::ClearTone) => {
                // Every harmonic at or past the table limit is dropped anyway
                let harmonics = spec.harmonic_count().min(MAX_TABLE_HARMONIC);
                if harmonics < spec.harmonic_count() {
                    debug!(requested = spec.harmonic_count(), harmonics, "capped harmonic count");
                }
                let coeffs = synthesize(kind, harmonics)?;
                Prepared::Periodic(PeriodicOscillator::new(
                    &coeffs,
                    spec.frequency_hz(),
                    sample_rate as f64,
                ))
            }
            (kind, ToneMode::RawTone) => Prepared::Simple(Shape::try_from(kind)?),
        };

        debug!(kind = %spec.kind(), ?mode, sample_rate, "prepared processor");

        Ok(Self {
            spec,
            mode,
            sample_rate,
            prepared,
            seed: None,
        })
    }

    /// Prepare a processor on the blocking pool
    pub async fn load(spec: WaveformSpec, mode: ToneMode, sample_rate: u32) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::prepare(spec, mode, sample_rate))
            .await
            .map_err(|e| Error::SourceInitFailed(e.to_string()))?
    }

    /// Seed noise generators created from this handle
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn spec(&self) -> &WaveformSpec {
        &self.spec
    }

    pub fn tone_mode(&self) -> ToneMode {
        self.mode
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Create a fresh, stopped source
    pub fn instantiate(&self) -> SignalSource {
        let processor = match &self.prepared {
            Prepared::Periodic(template) => Processor::Periodic(template.clone()),
            Prepared::Simple(shape) => Processor::Simple(Oscillator::new(
                *shape,
                self.spec.frequency_hz(),
                self.sample_rate as f64,
            )),
            Prepared::Noise(color) => Processor::Noise(match self.seed {
                Some(seed) => NoiseGenerator::with_seed(*color, seed),
                None => NoiseGenerator::new(*color),
            }),
        };
        SignalSource::new(processor, self.spec, self.mode)
    }
}
