//! Driver configuration.
//!
//! Loads and validates configuration from YAML files or environment variables.

use hsw_index::HswConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Driver configuration.
///
/// Example YAML:
/// ```yaml
/// index:
///   k: 4
///   metric: cosine
///   log_base: 3.0
///   seed: 42
/// dataset:
///   kind: random
///   n: 500
///   dims: 8
/// queries:
///   - [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8]
/// trace: true
/// snapshot: false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Index build parameters
    #[serde(default)]
    pub index: HswConfig,

    /// Where the vectors come from
    #[serde(default)]
    pub dataset: DatasetSource,

    /// Query vectors; one random query is generated when empty
    #[serde(default)]
    pub queries: Vec<Vec<f32>>,

    /// Include a traversal trace with each result
    #[serde(default)]
    pub trace: bool,

    /// Include the graph snapshot in the output
    #[serde(default)]
    pub snapshot: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DatasetSource {
    /// `n` vectors drawn uniformly from `[0, 1)^dims`
    Random {
        #[serde(default = "default_n")]
        n: usize,
        #[serde(default = "default_dims")]
        dims: usize,
    },
    /// JSON array of equal-length number arrays
    File { path: PathBuf },
}

impl Default for DatasetSource {
    fn default() -> Self {
        DatasetSource::Random {
            n: default_n(),
            dims: default_dims(),
        }
    }
}

fn default_n() -> usize {
    100
}

fn default_dims() -> usize {
    2
}

impl CliConfig {
    /// Load configuration from a YAML file.
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("Failed to read config file: {}", e)))?;

        let config: CliConfig = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("Failed to parse YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// Supported variables (all optional):
    /// - HSW_K
    /// - HSW_METRIC (`l1`, `l2`, `dot`, `cosine`)
    /// - HSW_LOG_BASE
    /// - HSW_SEED
    /// - HSW_DATASET (path to a JSON rows file; overrides HSW_N/HSW_DIMS)
    /// - HSW_N, HSW_DIMS
    /// - HSW_TRACE, HSW_SNAPSHOT (`true`/`false`)
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let mut index = HswConfig::default();
        if let Some(k) = env_parse("HSW_K")? {
            index.k = k;
        }
        if let Some(metric) = env_parse("HSW_METRIC")? {
            index.metric = metric;
        }
        if let Some(log_base) = env_parse("HSW_LOG_BASE")? {
            index.log_base = log_base;
        }
        index.seed = env_parse("HSW_SEED")?;

        let dataset = match std::env::var("HSW_DATASET") {
            Ok(path) => DatasetSource::File {
                path: PathBuf::from(path),
            },
            Err(_) => DatasetSource::Random {
                n: env_parse("HSW_N")?.unwrap_or_else(default_n),
                dims: env_parse("HSW_DIMS")?.unwrap_or_else(default_dims),
            },
        };

        let config = CliConfig {
            index,
            dataset,
            queries: Vec::new(),
            trace: env_parse("HSW_TRACE")?.unwrap_or(false),
            snapshot: env_parse("HSW_SNAPSHOT")?.unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.index
            .validate()
            .map_err(|e| ConfigError::InvalidField(format!("index: {}", e)))?;

        if let DatasetSource::Random { n, dims } = self.dataset {
            if n == 0 {
                return Err(ConfigError::InvalidField("dataset.n must be > 0".to_string()));
            }
            if dims == 0 {
                return Err(ConfigError::InvalidField(
                    "dataset.dims must be > 0".to_string(),
                ));
            }
            if let Some(q) = self.queries.iter().find(|q| q.len() != dims) {
                return Err(ConfigError::InvalidField(format!(
                    "query has {} components, dataset has {} dimensions",
                    q.len(),
                    dims
                )));
            }
        }

        Ok(())
    }
}

fn env_parse<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::InvalidField(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(None),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),
}
