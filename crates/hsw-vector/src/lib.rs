//! Vector distance primitives for the HSW index.
//!
//! This crate provides the numeric layer underneath `hsw-index`:
//!
//! - **Distance metrics**: L1, L2, negated dot product, negated cosine
//! - **Batch scoring**: one query against an ordered set of rows
//! - **BruteForce**: exact linear scan, the accuracy baseline for the graph index
//!
//! Every metric follows the minimization convention: a smaller score means
//! closer. Dot product and cosine similarity are negated to fit.
//!
//! # Example
//!
//! ```
//! use hsw_vector::DistanceMetric;
//!
//! let d = DistanceMetric::L2.distance(&[0.0, 0.0], &[3.0, 4.0]).unwrap();
//! assert!((d - 5.0).abs() < 1e-6);
//!
//! let metric: DistanceMetric = "cosine".parse().unwrap();
//! assert_eq!(metric, DistanceMetric::NegatedCosine);
//! ```

mod brute;
mod distance;
mod traits;

pub use brute::BruteForce;
pub use distance::{
    euclidean_distance, euclidean_distance_squared, inner_product, l2_norm, manhattan_distance,
    negated_cosine, DistanceMetric,
};
pub use traits::VectorMatch;

/// Error type for vector operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VectorError {
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Degenerate vector: {0}")]
    DegenerateVector(String),

    #[error("Invalid vector: {0}")]
    InvalidVector(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for vector operations.
pub type Result<T> = std::result::Result<T, VectorError>;

/// Validate a vector's dimensions and values.
///
/// Rejects vectors whose length differs from `dimensions` and vectors that
/// contain NaN or infinite components.
pub fn validate_vector(vector: &[f32], dimensions: usize) -> Result<()> {
    if vector.len() != dimensions {
        return Err(VectorError::DimensionMismatch {
            expected: dimensions,
            actual: vector.len(),
        });
    }

    for (i, &v) in vector.iter().enumerate() {
        if v.is_nan() {
            return Err(VectorError::InvalidVector(format!("NaN value at index {}", i)));
        }
        if v.is_infinite() {
            return Err(VectorError::InvalidVector(format!(
                "Infinite value at index {}",
                i
            )));
        }
    }

    Ok(())
}
