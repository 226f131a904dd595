//! Dataset and query acquisition.

use crate::config::DatasetSource;
use crate::CliError;
use hsw_index::Dataset;
use rand::Rng;
use std::path::Path;

/// Materialize the configured dataset.
pub fn load_dataset<R: Rng + ?Sized>(source: &DatasetSource, rng: &mut R) -> Result<Dataset, CliError> {
    let rows = match source {
        DatasetSource::Random { n, dims } => {
            tracing::info!(n, dims, "generating random dataset");
            random_rows(rng, *n, *dims)
        }
        DatasetSource::File { path } => {
            tracing::info!(path = %path.display(), "loading dataset");
            read_rows(path)?
        }
    };
    Ok(Dataset::new(rows)?)
}

/// `n` rows drawn uniformly from `[0, 1)^dims`.
pub fn random_rows<R: Rng + ?Sized>(rng: &mut R, n: usize, dims: usize) -> Vec<Vec<f32>> {
    (0..n).map(|_| random_vector(rng, dims)).collect()
}

pub fn random_vector<R: Rng + ?Sized>(rng: &mut R, dims: usize) -> Vec<f32> {
    (0..dims).map(|_| rng.gen::<f32>()).collect()
}

/// Read a JSON array of number arrays. Shape checks happen in [`Dataset::new`].
pub fn read_rows(path: &Path) -> Result<Vec<Vec<f32>>, CliError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| CliError::Parse(format!("Failed to parse {}: {}", path.display(), e)))
}
