//! Options passed through to the external trainer.

use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};
use thiserror::Error;

/// An error reading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config: {0}")]
    Io(#[from] io::Error),
    /// The file is not a valid configuration.
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Search and recognition-model settings for the trainer. Fields missing from
/// a configuration file keep their defaults.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrainerConfig {
    pub enumeration_timeout: u64,
    pub testing_timeout: u64,
    pub iterations: usize,
    pub recognition_epochs: Vec<usize>,
    pub parser: String,
    pub maximum_frontier: usize,
    pub recognition_timeout: u64,
    pub activation: String,
    /// The features the recognition model is trained on.
    pub feature_extractor: String,
    /// The maximum arity of invented primitives.
    pub a: usize,
    pub top_k: usize,
    pub pseudo_counts: f64,
    pub helmholtz_ratio: f64,
    pub structure_penalty: f64,
    #[serde(rename = "CPUs")]
    pub cpus: usize,
    pub output_prefix: String,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            enumeration_timeout: 2,
            testing_timeout: 2,
            iterations: 5,
            recognition_epochs: vec![1000],
            parser: "loglinear".to_string(),
            maximum_frontier: 5,
            recognition_timeout: 100,
            activation: "tanh".to_string(),
            feature_extractor: "dummy".to_string(),
            a: 3,
            top_k: 2,
            pseudo_counts: 30.0,
            helmholtz_ratio: 0.5,
            structure_penalty: 1.0,
            cpus: std::thread::available_parallelism().map_or(1, usize::from),
            output_prefix: format!(
                "experimentOutputs/demo/{}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6f")
            ),
        }
    }
}

impl TrainerConfig {
    /// Reads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or isn't valid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = TrainerConfig::default();
        assert_eq!(config.recognition_epochs, vec![1000]);
        assert_eq!(config.parser, "loglinear");
        assert!(config.cpus >= 1);
        assert!(config.output_prefix.starts_with("experimentOutputs/demo/"));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["CPUs"], config.cpus);
        assert_eq!(json["helmholtzRatio"], 0.5);
        assert_eq!(json["topK"], 2);
        assert_eq!(json["featureExtractor"], "dummy");
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "iterations": 10, "CPUs": 4 }}"#).unwrap();
        let config = TrainerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.iterations, 10);
        assert_eq!(config.cpus, 4);
        assert_eq!(config.maximum_frontier, 5);
        assert_eq!(config.feature_extractor, "dummy");
    }

    #[test]
    fn bad_files() {
        assert!(matches!(
            TrainerConfig::from_file("/nonexistent/config.json"),
            Err(ConfigError::Io(_))
        ));
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "iterations": "many" }}"#).unwrap();
        assert!(matches!(
            TrainerConfig::from_file(file.path()),
            Err(ConfigError::Json(_))
        ));
    }
}
