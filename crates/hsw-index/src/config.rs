//! Build configuration.

use crate::{HswError, Result};
use hsw_vector::DistanceMetric;
use serde::{Deserialize, Serialize};

/// HSW configuration parameters.
///
/// Example YAML:
/// ```yaml
/// k: 4
/// metric: cosine
/// log_base: 3.0
/// seed: 42
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HswConfig {
    /// Outbound neighbors chosen per node per level.
    /// Default: 3
    #[serde(default = "default_k")]
    pub k: usize,

    /// Distance metric (`l1`, `l2`, `dot`, `cosine`).
    /// Default: l2
    #[serde(default)]
    pub metric: DistanceMetric,

    /// Base of the logarithm that sizes the hierarchy: `floor(log_base(N))` levels.
    /// Default: 3
    #[serde(default = "default_log_base")]
    pub log_base: f64,

    /// Seed for level sampling and start-node selection.
    /// `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for HswConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            metric: DistanceMetric::default(),
            log_base: default_log_base(),
            seed: None,
        }
    }
}

fn default_k() -> usize {
    3
}

fn default_log_base() -> f64 {
    3.0
}

impl HswConfig {
    /// Config with the given `k` and metric, defaults elsewhere.
    pub fn new(k: usize, metric: DistanceMetric) -> Self {
        Self {
            k,
            metric,
            ..Self::default()
        }
    }

    pub fn with_log_base(mut self, log_base: f64) -> Self {
        self.log_base = log_base;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(HswError::InvalidParameter("k must be >= 1".to_string()));
        }

        validate_log_base(self.log_base)
    }
}

pub(crate) fn validate_log_base(log_base: f64) -> Result<()> {
    if !log_base.is_finite() || log_base <= 1.0 {
        return Err(HswError::InvalidParameter(format!(
            "log_base must be a finite number > 1, got {}",
            log_base
        )));
    }
    Ok(())
}
