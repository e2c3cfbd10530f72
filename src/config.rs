//! Runtime configuration
//!
//! Loaded from an optional YAML file; every key may be omitted:
//!
//! ```yaml
//! sentinel: "0"
//! strict: false
//! batch_size: 1000
//! workers: 1
//! format:
//!   separator: ","
//!   header: true
//! ```

use crate::pedfile::CsvFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors in configuration files or values
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Settings shared by ingestion, reconstruction and export
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PedigreeConfig {
    /// Identifier meaning "parent unknown"
    pub sentinel: String,
    /// Treat conflicting duplicate records as fatal
    pub strict: bool,
    /// Records per storage transaction during ingestion
    pub batch_size: usize,
    /// Threads used to fetch records during reconstruction and export
    pub workers: usize,
    /// Pedigree file layout
    pub format: CsvFormat,
}

impl Default for PedigreeConfig {
    fn default() -> Self {
        Self {
            sentinel: "0".to_string(),
            strict: false,
            batch_size: 1000,
            workers: 1,
            format: CsvFormat::default(),
        }
    }
}

impl PedigreeConfig {
    /// Load and validate a YAML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate YAML text
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
                path: PathBuf::from("<inline>"),
                source,
            })?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_format(mut self, format: CsvFormat) -> Self {
        self.format = format;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sentinel.trim().is_empty() {
            return Err(ConfigError::Invalid("sentinel must not be empty".into()));
        }
        if self.sentinel.contains(self.format.separator) {
            return Err(ConfigError::Invalid(format!(
                "sentinel {:?} contains the field separator {:?}",
                self.sentinel, self.format.separator
            )));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        Ok(())
    }
}
