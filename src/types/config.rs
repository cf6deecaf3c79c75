//! Sampler configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[cfg(feature = "python")]
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_MFD_BIN_WIDTH: f64 = 0.1;
const DEFAULT_NUMBER_OF_SAMPLES: u32 = 1;

/// Errors raised while loading or validating a [`SamplerConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration for a sampling run.
#[cfg_attr(feature = "python", pyclass)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Width of the magnitude bins handed to the source-model reader
    #[cfg_attr(feature = "python", pyo3(get, set))]
    #[serde(default = "default_mfd_bin_width")]
    pub mfd_bin_width: f64,

    /// Random seed. Ensembles and the GMPE sampler treat 0 as "seed from entropy"
    #[cfg_attr(feature = "python", pyo3(get, set))]
    #[serde(default)]
    pub seed: u64,

    /// Number of ensemble members to draw
    #[cfg_attr(feature = "python", pyo3(get, set))]
    #[serde(default = "default_number_of_samples")]
    pub number_of_samples: u32,

    /// Directory input-model references are resolved against
    #[cfg_attr(feature = "python", pyo3(get, set))]
    #[serde(default)]
    pub base_path: Option<String>,

    /// Source-model logic tree file (opaque to the sampler)
    #[cfg_attr(feature = "python", pyo3(get, set))]
    #[serde(default)]
    pub source_model_logic_tree_file: Option<String>,

    /// GMPE logic tree file (opaque to the sampler)
    #[cfg_attr(feature = "python", pyo3(get, set))]
    #[serde(default)]
    pub gmpe_logic_tree_file: Option<String>,

    /// Number of parallel workers (None = auto-detect)
    #[cfg_attr(feature = "python", pyo3(get, set))]
    #[serde(default)]
    pub n_workers: Option<usize>,
}

fn default_mfd_bin_width() -> f64 {
    DEFAULT_MFD_BIN_WIDTH
}

fn default_number_of_samples() -> u32 {
    DEFAULT_NUMBER_OF_SAMPLES
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            mfd_bin_width: DEFAULT_MFD_BIN_WIDTH,
            seed: 0,
            number_of_samples: DEFAULT_NUMBER_OF_SAMPLES,
            base_path: None,
            source_model_logic_tree_file: None,
            gmpe_logic_tree_file: None,
            n_workers: None,
        }
    }
}

impl SamplerConfig {
    /// Load configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SamplerConfig =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.mfd_bin_width > 0.0) || !self.mfd_bin_width.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "mfd_bin_width must be positive, got {}",
                self.mfd_bin_width
            )));
        }
        if self.number_of_samples == 0 {
            return Err(ConfigError::Invalid(
                "number_of_samples must be at least 1".to_string(),
            ));
        }
        if self.n_workers == Some(0) {
            return Err(ConfigError::Invalid(
                "n_workers must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve a branch's input-model reference against `base_path`.
    pub fn resolve_model_path(&self, name: &str) -> PathBuf {
        match &self.base_path {
            Some(base) => Path::new(base).join(name),
            None => PathBuf::from(name),
        }
    }
}
