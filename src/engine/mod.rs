//! Playback graph, offline rendering and file output
//!
//! [`MixGraph`] owns the one live source slot and drives the play/stop state
//! machine. The output device is reached through an [`AudioBackend`], so the
//! graph runs the same way against cpal or against a caller pulling samples.

pub mod analysis;
mod chain;
pub mod gain;
mod player;
mod recorder;
mod render;
pub mod wav;

pub use analysis::{find_zero_crossing, peak_frequency, AnalysisTap};
pub use chain::{try_tap_snapshot, SharedChain, SignalChain};
pub use player::{default_device_name, list_output_devices, Player};
pub use recorder::Recorder;
pub use render::{render, OfflineRenderer, PcmBuffer};
pub use wav::{decode_wav, encode_wav, WavHeader};

use std::sync::{MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::synth::{ProcessorHandle, ToneMode, WaveformSpec};

use gain::DEFAULT_GAIN_DB;

/// The audio engine a graph plays through
pub trait AudioBackend {
    /// Output sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// True until the first `resume`, and after `suspend`
    fn is_suspended(&self) -> bool;

    /// Start (or restart) pulling samples from the chain
    fn resume(&mut self, chain: &SharedChain) -> Result<()>;

    /// Stop pulling samples
    fn suspend(&mut self);
}

/// A backend with no device: the caller pulls samples from the chain.
///
/// Used for previews and tests.
#[derive(Debug, Clone)]
pub struct ManualBackend {
    sample_rate: u32,
    suspended: bool,
    resume_count: usize,
}

impl ManualBackend {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            suspended: true,
            resume_count: 0,
        }
    }

    /// How many times the backend was resumed
    pub fn resume_count(&self) -> usize {
        self.resume_count
    }
}

impl AudioBackend for ManualBackend {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn resume(&mut self, _chain: &SharedChain) -> Result<()> {
        self.suspended = false;
        self.resume_count += 1;
        Ok(())
    }

    fn suspend(&mut self) {
        self.suspended = true;
    }
}

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphState {
    Idle,
    Playing,
}

/// Single-source live playback session
pub struct MixGraph<B: AudioBackend> {
    backend: B,
    chain: SharedChain,
    tone_mode: ToneMode,
    current: Option<WaveformSpec>,
    seed: Option<u64>,
}

impl<B: AudioBackend> MixGraph<B> {
    /// Create an idle graph at the default -3 dBFS
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            chain: SignalChain::new(DEFAULT_GAIN_DB).shared(),
            tone_mode: ToneMode::default(),
            current: None,
            seed: None,
        }
    }

    /// Seed noise sources for reproducible sessions
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Shared chain handle (what the output callback reads)
    pub fn chain(&self) -> SharedChain {
        self.chain.clone()
    }

    pub fn state(&self) -> GraphState {
        if self.lock_chain().is_connected() {
            GraphState::Playing
        } else {
            GraphState::Idle
        }
    }

    pub fn is_playing(&self) -> bool {
        self.state() == GraphState::Playing
    }

    pub fn tone_mode(&self) -> ToneMode {
        self.tone_mode
    }

    /// Spec of the source currently playing
    pub fn current_spec(&self) -> Option<WaveformSpec> {
        self.current
    }

    pub fn gain_db(&self) -> f64 {
        self.lock_chain().gain().db()
    }

    pub fn linear_gain(&self) -> f64 {
        self.lock_chain().gain().linear()
    }

    /// Start playing `spec`, replacing whatever was playing.
    ///
    /// On failure the graph is left idle.
    pub async fn play(&mut self, spec: WaveformSpec) -> Result<()> {
        self.stop();

        if self.backend.is_suspended() {
            debug!("resuming suspended backend");
            self.backend.resume(&self.chain)?;
        }

        let handle = self.load(spec, self.tone_mode).await?;
        let mut source = handle.instantiate();
        source.start();
        self.lock_chain().connect(source)?;
        self.current = Some(spec);

        info!(
            kind = %spec.kind(),
            frequency = spec.frequency_hz(),
            harmonics = spec.harmonic_count(),
            mode = ?self.tone_mode,
            "playing"
        );
        Ok(())
    }

    /// Parse a waveform selector and play it.
    ///
    /// The previous source is stopped first, so an unknown selector leaves
    /// the graph idle.
    pub async fn play_named(&mut self, kind: &str, frequency_hz: f64, harmonic_count: u32) -> Result<()> {
        self.stop();
        let spec = WaveformSpec::parse(kind, frequency_hz, harmonic_count)?;
        self.play(spec).await
    }

    /// Stop and discard the active source. Returns false when already idle.
    pub fn stop(&mut self) -> bool {
        let stopped = self.lock_chain().disconnect();
        self.current = None;

        match stopped {
            Some(source) => {
                info!(kind = %source.spec().kind(), "stopped");
                true
            }
            None => false,
        }
    }

    /// Set the gain in dBFS, returning the applied linear multiplier
    pub fn set_gain(&mut self, db_fs: f64) -> f64 {
        let linear = self.lock_chain().set_gain_db(db_fs);
        debug!(db_fs, linear, "gain changed");
        linear
    }

    /// Switch between clear and raw tone.
    ///
    /// While playing, the replacement source is built first and swapped in
    /// under one lock of the chain. If it cannot be built the graph stops.
    pub async fn set_tone_mode(&mut self, mode: ToneMode) -> Result<()> {
        if mode == self.tone_mode {
            return Ok(());
        }
        self.tone_mode = mode;

        // Noise ignores tone mode, so its filter state keeps running
        let Some(spec) = self.current.filter(|spec| spec.kind().is_harmonic()) else {
            return Ok(());
        };

        let handle = match self.load(spec, mode).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(error = %e, "tone mode swap failed, stopping");
                self.stop();
                return Err(e);
            }
        };

        let mut source = handle.instantiate();
        source.start();
        self.lock_chain().replace(source);
        info!(?mode, "swapped tone mode");
        Ok(())
    }

    /// Stop playback and suspend the backend
    pub fn shutdown(&mut self) {
        self.stop();
        self.backend.suspend();
    }

    async fn load(&self, spec: WaveformSpec, mode: ToneMode) -> Result<ProcessorHandle> {
        let handle = ProcessorHandle::load(spec, mode, self.backend.sample_rate()).await?;
        Ok(match self.seed {
            Some(seed) => handle.with_seed(seed),
            None => handle,
        })
    }

    fn lock_chain(&self) -> MutexGuard<'_, SignalChain> {
        self.chain.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::synth::{NoiseColor, Processor, WaveformKind};

    fn graph() -> MixGraph<ManualBackend> {
        MixGraph::new(ManualBackend::new(48000)).with_seed(1)
    }

    fn spec(kind: WaveformKind) -> WaveformSpec {
        WaveformSpec::new(kind, 440.0, 15).unwrap()
    }

    fn pull(graph: &MixGraph<ManualBackend>, count: usize) -> Vec<f32> {
        let mut buffer = vec![0.0f32; count];
        graph.chain().lock().unwrap().fill_buffer(&mut buffer);
        buffer
    }

    /// Backend whose engine cannot be resumed
    struct BrokenBackend;

    impl AudioBackend for BrokenBackend {
        fn sample_rate(&self) -> u32 {
            48000
        }

        fn is_suspended(&self) -> bool {
            true
        }

        fn resume(&mut self, _chain: &SharedChain) -> Result<()> {
            Err(Error::Backend("device unplugged".to_string()))
        }

        fn suspend(&mut self) {}
    }

    #[tokio::test]
    async fn test_starts_idle() {
        let graph = graph();
        assert_eq!(graph.state(), GraphState::Idle);
        assert_eq!(graph.tone_mode(), ToneMode::ClearTone);
        assert!(pull(&graph, 64).iter().all(|&s| s == 0.0));
    }

    #[tokio::test]
    async fn test_play_resumes_and_connects() {
        let mut graph = graph();
        graph.play(spec(WaveformKind::Square)).await.unwrap();

        assert!(graph.is_playing());
        assert_eq!(graph.backend().resume_count(), 1);
        assert!(!graph.backend().is_suspended());
        assert!(pull(&graph, 256).iter().any(|&s| s != 0.0));
    }

    #[tokio::test]
    async fn test_play_while_playing_replaces_source() {
        let mut graph = graph();
        graph.play(spec(WaveformKind::Square)).await.unwrap();
        graph.play(spec(WaveformKind::Noise(NoiseColor::Brown))).await.unwrap();

        let chain = graph.chain();
        let chain = chain.lock().unwrap();
        assert_eq!(chain.connection_count(), 1);
        assert!(matches!(chain.source().unwrap().processor(), Processor::Noise(_)));
        drop(chain);

        // Already running, so no second resume
        assert_eq!(graph.backend().resume_count(), 1);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let mut graph = graph();
        graph.play(spec(WaveformKind::Triangle)).await.unwrap();

        assert!(graph.stop());
        assert!(!graph.stop());
        assert!(!graph.stop());
        assert_eq!(graph.state(), GraphState::Idle);
        assert!(pull(&graph, 64).iter().all(|&s| s == 0.0));
    }

    #[tokio::test]
    async fn test_stop_when_never_played() {
        let mut graph = graph();
        assert!(!graph.stop());
        assert!(!graph.stop());
    }

    #[tokio::test]
    async fn test_invalid_selector_leaves_graph_idle() {
        let mut graph = graph();
        graph.play(spec(WaveformKind::Sine)).await.unwrap();

        let err = graph.play_named("hexagon", 440.0, 15).await.unwrap_err();
        assert_eq!(err, Error::InvalidWaveformKind("hexagon".to_string()));
        assert_eq!(graph.state(), GraphState::Idle);
        assert_eq!(graph.chain().lock().unwrap().connection_count(), 0);
    }

    #[tokio::test]
    async fn test_play_named() {
        let mut graph = graph();
        graph.play_named("pink-noise", 60.0, 15).await.unwrap();
        assert_eq!(
            graph.current_spec().unwrap().kind(),
            WaveformKind::Noise(NoiseColor::Pink)
        );
    }

    #[tokio::test]
    async fn test_backend_failure_leaves_graph_idle() {
        let mut graph = MixGraph::new(BrokenBackend);
        let err = graph.play(spec(WaveformKind::Square)).await.unwrap_err();

        assert!(matches!(err, Error::Backend(_)));
        assert_eq!(graph.state(), GraphState::Idle);
        assert!(graph.current_spec().is_none());
    }

    #[tokio::test]
    async fn test_set_gain() {
        let mut graph = graph();

        let linear = graph.set_gain(-6.0);
        assert!((linear - 0.50119).abs() < 1e-4);
        assert_eq!(graph.gain_db(), -6.0);

        let linear = graph.set_gain(3.0);
        assert!(linear <= 1.0);
        assert_eq!(graph.gain_db(), DEFAULT_GAIN_DB);
    }

    #[tokio::test]
    async fn test_gain_applies_to_live_source() {
        let mut graph = graph();
        graph.set_tone_mode(ToneMode::RawTone).await.unwrap();
        graph
            .play(WaveformSpec::new(WaveformKind::Square, 1.0, 1).unwrap())
            .await
            .unwrap();

        graph.set_gain(0.0);
        assert_eq!(pull(&graph, 1)[0], 1.0);

        graph.set_gain(-20.0);
        assert!((pull(&graph, 1)[0] - 0.1).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_tone_mode_swap_while_playing() {
        let mut graph = graph();
        graph.play(spec(WaveformKind::Sawtooth)).await.unwrap();

        graph.set_tone_mode(ToneMode::RawTone).await.unwrap();
        {
            let chain = graph.chain();
            let chain = chain.lock().unwrap();
            assert_eq!(chain.connection_count(), 1);
            let source = chain.source().unwrap();
            assert_eq!(source.tone_mode(), ToneMode::RawTone);
            assert!(matches!(source.processor(), Processor::Simple(_)));
        }

        graph.set_tone_mode(ToneMode::ClearTone).await.unwrap();
        let chain = graph.chain();
        let chain = chain.lock().unwrap();
        assert!(matches!(chain.source().unwrap().processor(), Processor::Periodic(_)));
    }

    #[tokio::test]
    async fn test_tone_mode_change_keeps_noise_running() {
        let pink = WaveformSpec::new(WaveformKind::Noise(NoiseColor::Pink), 60.0, 15).unwrap();

        let mut switched = graph();
        switched.play(pink).await.unwrap();
        let mut samples = pull(&switched, 100);
        switched.set_tone_mode(ToneMode::RawTone).await.unwrap();
        samples.extend(pull(&switched, 100));
        assert_eq!(switched.tone_mode(), ToneMode::RawTone);

        let mut steady = graph();
        steady.play(pink).await.unwrap();
        assert_eq!(samples, pull(&steady, 200));
    }

    #[tokio::test]
    async fn test_tone_mode_while_idle_is_recorded() {
        let mut graph = graph();
        graph.set_tone_mode(ToneMode::RawTone).await.unwrap();
        assert_eq!(graph.state(), GraphState::Idle);

        graph.play(spec(WaveformKind::Square)).await.unwrap();
        let chain = graph.chain();
        let chain = chain.lock().unwrap();
        assert!(matches!(chain.source().unwrap().processor(), Processor::Simple(_)));
    }

    #[tokio::test]
    async fn test_shutdown_suspends_backend() {
        let mut graph = graph();
        graph.play(spec(WaveformKind::Sine)).await.unwrap();
        graph.shutdown();

        assert_eq!(graph.state(), GraphState::Idle);
        assert!(graph.backend().is_suspended());

        graph.play(spec(WaveformKind::Sine)).await.unwrap();
        assert_eq!(graph.backend().resume_count(), 2);
    }

    #[tokio::test]
    async fn test_tap_sees_output() {
        let mut graph = graph();
        graph.set_gain(0.0);
        graph
            .play(WaveformSpec::new(WaveformKind::Sine, 750.0, 1).unwrap())
            .await
            .unwrap();
        pull(&graph, 8192);

        let estimate = graph.chain().lock().unwrap().tap().peak_frequency(48000.0).unwrap();
        assert!((estimate - 750.0).abs() <= 48000.0 / 4096.0);
    }
}
