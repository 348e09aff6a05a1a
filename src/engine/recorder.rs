//! WAV file output
//!
//! Writes rendered buffers to disk under the canonical file name.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use super::PcmBuffer;
use crate::synth::WaveformSpec;

/// Saves rendered buffers as WAV files
pub struct Recorder {
    output: PathBuf,
    directory: bool,
}

impl Recorder {
    /// Create a recorder writing to `output`
    ///
    /// # Arguments
    /// * `output` - A `.wav` file path, or a directory (files get the
    ///   canonical name). Any path without a `.wav` extension is a directory.
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            directory: false,
        }
    }

    /// Create a recorder that always writes canonical names inside `dir`,
    /// creating it if needed
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            output: dir.into(),
            directory: true,
        }
    }

    /// Where a render of `spec` at `sample_rate` would be written
    pub fn target_path(&self, spec: &WaveformSpec, sample_rate: u32) -> PathBuf {
        if self.writes_into_directory() {
            self.output.join(spec.file_name(sample_rate))
        } else {
            self.output.clone()
        }
    }

    fn writes_into_directory(&self) -> bool {
        let is_wav = self
            .output
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        self.directory || self.output.is_dir() || !is_wav
    }

    /// Encode and write the buffer, returning the path written
    pub fn save(&self, spec: &WaveformSpec, pcm: &PcmBuffer) -> Result<PathBuf> {
        let path = self.target_path(spec, pcm.sample_rate());
        write_bytes(&path, &pcm.to_wav_bytes()?)?;

        info!(
            path = %path.display(),
            samples = pcm.len(),
            "saved wav file"
        );
        Ok(path)
    }
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {:?}", parent))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("failed to write WAV file: {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::render;
    use crate::synth::WaveformKind;
    use tempfile::TempDir;

    fn spec() -> WaveformSpec {
        WaveformSpec::new(WaveformKind::Triangle, 220.0, 7).unwrap()
    }

    #[test]
    fn test_directory_gets_canonical_name() {
        let dir = TempDir::new().unwrap();
        let recorder = Recorder::new(dir.path());

        let path = recorder.target_path(&spec(), 44100);
        assert_eq!(path, dir.path().join("triangle_220Hz_7harmonics_44100sps.wav"));
    }

    #[test]
    fn test_explicit_file_path_is_kept() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("out.wav");
        let recorder = Recorder::new(&file);

        assert_eq!(recorder.target_path(&spec(), 44100), file);
    }

    #[test]
    fn test_missing_directory_is_created() {
        let dir = TempDir::new().unwrap();
        let renders = dir.path().join("renders");
        let pcm = render(&spec(), 0.01, 8000).unwrap();

        let path = Recorder::new(&renders).save(&spec(), &pcm).unwrap();
        assert!(renders.is_dir());
        assert_eq!(path, renders.join("triangle_220Hz_7harmonics_8000sps.wav"));
        assert!(path.is_file());
    }

    #[test]
    fn test_in_dir_always_joins_canonical_name() {
        let dir = TempDir::new().unwrap();
        let odd = dir.path().join("takes.wav");
        let pcm = render(&spec(), 0.01, 8000).unwrap();

        let path = Recorder::in_dir(&odd).save(&spec(), &pcm).unwrap();
        assert!(odd.is_dir());
        assert_eq!(path, odd.join("triangle_220Hz_7harmonics_8000sps.wav"));
    }

    #[test]
    fn test_save_writes_encoded_bytes() {
        let dir = TempDir::new().unwrap();
        let pcm = render(&spec(), 0.05, 8000).unwrap();

        let path = Recorder::new(dir.path()).save(&spec(), &pcm).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes, pcm.to_wav_bytes().unwrap());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("nested").join("tone.wav");
        let pcm = render(&spec(), 0.01, 8000).unwrap();

        let path = Recorder::new(&file).save(&spec(), &pcm).unwrap();
        assert_eq!(path, file);
        assert!(file.exists());
    }

    #[test]
    fn test_saved_file_reads_with_hound() {
        let dir = TempDir::new().unwrap();
        let pcm = render(&spec(), 0.1, 22050).unwrap();
        let path = Recorder::new(dir.path()).save(&spec(), &pcm).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let wav_spec = reader.spec();
        assert_eq!(wav_spec.channels, 1);
        assert_eq!(wav_spec.sample_rate, 22050);
        assert_eq!(wav_spec.bits_per_sample, 32);
        assert_eq!(wav_spec.sample_format, hound::SampleFormat::Float);

        let samples: Vec<f32> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(samples, pcm.samples());
    }
}
