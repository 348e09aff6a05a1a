//! Signal chain: one source slot, a gain stage and an analysis tap
//!
//! The chain is the only state shared between the control context and the
//! audio callback. The callback only ever calls [`SignalChain::fill_buffer`],
//! which does not allocate.

use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::synth::SignalSource;

use super::analysis::AnalysisTap;
use super::gain::GainStage;

/// Chain handle shared with the output backend
pub type SharedChain = Arc<Mutex<SignalChain>>;

/// Copy the analysis tap without waiting on the chain.
///
/// Returns `None` when the audio callback or a swap holds the lock.
pub fn try_tap_snapshot(chain: &SharedChain) -> Option<Vec<f32>> {
    chain.try_lock().ok().map(|chain| chain.tap().time_domain())
}

/// source -> gain -> analysis -> output
pub struct SignalChain {
    source: Option<SignalSource>,
    gain: GainStage,
    tap: AnalysisTap,
}

impl SignalChain {
    pub fn new(gain_db: f64) -> Self {
        Self {
            source: None,
            gain: GainStage::new(gain_db),
            tap: AnalysisTap::default(),
        }
    }

    /// Wrap in the shared handle used by backends
    pub fn shared(self) -> SharedChain {
        Arc::new(Mutex::new(self))
    }

    /// Connect a source; fails if one is already connected
    pub fn connect(&mut self, source: SignalSource) -> Result<()> {
        if self.source.is_some() {
            return Err(Error::AlreadyConnected);
        }
        self.source = Some(source);
        Ok(())
    }

    /// Stop and detach the current source
    pub fn disconnect(&mut self) -> Option<SignalSource> {
        let mut source = self.source.take()?;
        source.stop();
        Some(source)
    }

    /// Swap in a new source in one step, returning the stopped old one
    pub fn replace(&mut self, source: SignalSource) -> Option<SignalSource> {
        let old = self.disconnect();
        self.source = Some(source);
        old
    }

    pub fn is_connected(&self) -> bool {
        self.source.is_some()
    }

    pub fn connection_count(&self) -> usize {
        usize::from(self.source.is_some())
    }

    pub fn source(&self) -> Option<&SignalSource> {
        self.source.as_ref()
    }

    /// Set the gain in dBFS, returning the applied linear multiplier
    pub fn set_gain_db(&mut self, db: f64) -> f64 {
        self.gain.set_db(db)
    }

    pub fn gain(&self) -> &GainStage {
        &self.gain
    }

    pub fn tap(&self) -> &AnalysisTap {
        &self.tap
    }

    /// Generate the next output sample
    pub fn process(&mut self) -> f64 {
        let raw = self.source.as_mut().map_or(0.0, |s| s.next_sample());
        let out = self.gain.apply(raw);
        self.tap.push(out as f32);
        out
    }

    /// Fill a buffer with output samples
    pub fn fill_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process() as f32;
        }
    }
}
