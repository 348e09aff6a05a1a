//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<PurewaveConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {:?}", path))?;
    let mut config: PurewaveConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse config: {:?}", path))?;
    config.sanitize();
    config.validate()?;
    Ok(config)
}

/// Load the file if it exists, otherwise use the defaults
pub fn load_or_default(path: &Path) -> Result<PurewaveConfig> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!("no config at {:?}, using defaults", path);
        Ok(PurewaveConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_minimal_config() {
        let yaml = r#"
audio:
  sample_rate: 44100
  buffer_size: 256

tone:
  waveform: triangle
  frequency: 110
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.audio.buffer_size, 256);
        assert_eq!(config.tone.waveform, "triangle");
        assert_eq!(config.tone.harmonics, 15);
        assert_eq!(config.render.duration, 1.0);
    }

    #[test]
    fn test_load_clamps_tone_values() {
        let yaml = r#"
tone:
  frequency: 0
  harmonics: 0
  gain_db: 6
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.tone.frequency, 60.0);
        assert_eq!(config.tone.harmonics, 15);
        assert_eq!(config.tone.gain_db, -3.0);
    }

    #[test]
    fn test_load_rejects_invalid_audio() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"audio:\n  sample_rate: 1000\n").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_example_file_is_valid() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(include_str!("../../purewave.example.yaml").as_bytes())
            .unwrap();
        assert!(load_config(file.path()).is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = load_or_default(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.tone.waveform, "square");

        assert!(load_config(&dir.path().join("absent.yaml")).is_err());
    }
}
