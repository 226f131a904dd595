//! HSW driver library.
//!
//! Exposes the driver pieces for testing; `main` only wires them to the
//! process environment.

pub mod config;
pub mod report;
pub mod source;

use hsw_index::HswError;

pub use config::{CliConfig, ConfigError, DatasetSource};
pub use report::{run, QueryReport, Report};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Index error: {0}")]
    Index(#[from] HswError),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
