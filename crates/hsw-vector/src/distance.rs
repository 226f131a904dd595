//! Distance functions for vector similarity.
//!
//! Provides four metrics, all reported so that lower = closer:
//! - **L1**: sum of absolute differences
//! - **L2**: Euclidean norm of the difference
//! - **Negated dot product**: -(a · b), for maximum inner product search
//! - **Negated cosine**: -(a · b) / (||a|| * ||b||), undefined for zero vectors
//!
//! The kernels process four lanes per iteration so the compiler can
//! auto-vectorize them in release builds.

use crate::{Result, VectorError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distance metric selector.
///
/// Serializes to the wire names `l1`, `l2`, `dot` and `cosine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Manhattan distance: sum(|a[i] - b[i]|)
    #[serde(rename = "l1")]
    L1,
    /// Euclidean distance: sqrt(sum((a[i] - b[i])^2))
    #[default]
    #[serde(rename = "l2")]
    L2,
    /// Negated inner product: -(a · b)
    #[serde(rename = "dot")]
    NegatedDotProduct,
    /// Negated cosine similarity: -(a · b) / (||a|| * ||b||)
    #[serde(rename = "cosine")]
    NegatedCosine,
}

impl DistanceMetric {
    /// All supported metrics.
    pub const ALL: [DistanceMetric; 4] = [
        Self::L1,
        Self::L2,
        Self::NegatedDotProduct,
        Self::NegatedCosine,
    ];

    /// Wire name of this metric.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::L1 => "l1",
            Self::L2 => "l2",
            Self::NegatedDotProduct => "dot",
            Self::NegatedCosine => "cosine",
        }
    }

    /// Whether the metric is undefined for zero-norm vectors.
    pub fn requires_nonzero_norm(&self) -> bool {
        matches!(self, Self::NegatedCosine)
    }

    /// Compute distance between two vectors.
    ///
    /// # Errors
    ///
    /// - `DimensionMismatch` if the vectors differ in length
    /// - `DegenerateVector` for cosine when either vector has zero norm
    #[inline]
    pub fn distance(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        if a.len() != b.len() {
            return Err(VectorError::DimensionMismatch {
                expected: a.len(),
                actual: b.len(),
            });
        }

        match self {
            Self::L1 => Ok(manhattan_distance(a, b)),
            Self::L2 => Ok(euclidean_distance(a, b)),
            Self::NegatedDotProduct => Ok(-inner_product(a, b)),
            Self::NegatedCosine => negated_cosine(a, b),
        }
    }

    /// Compute the distance from `query` to every row, in row order.
    ///
    /// Each element is produced by the same kernel as [`DistanceMetric::distance`],
    /// so `distances(q, rows)[i] == distance(q, rows[i])` bit for bit.
    pub fn distances<'a, I>(&self, query: &[f32], rows: I) -> Result<Vec<f32>>
    where
        I: IntoIterator<Item = &'a [f32]>,
    {
        if self.requires_nonzero_norm() && l2_norm(query) == 0.0 {
            return Err(VectorError::DegenerateVector(
                "query vector has zero norm".to_string(),
            ));
        }

        let rows = rows.into_iter();
        let mut out = Vec::with_capacity(rows.size_hint().0);
        for row in rows {
            out.push(self.distance(query, row)?);
        }
        Ok(out)
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = VectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l1" => Ok(Self::L1),
            "l2" => Ok(Self::L2),
            "dot" => Ok(Self::NegatedDotProduct),
            "cosine" => Ok(Self::NegatedCosine),
            other => Err(VectorError::InvalidParameter(format!(
                "unknown distance metric '{}', expected one of l1, l2, dot, cosine",
                other
            ))),
        }
    }
}

/// Compute Manhattan (L1) distance between two vectors.
///
/// ```
/// use hsw_vector::manhattan_distance;
///
/// let d = manhattan_distance(&[1.0, 2.0], &[4.0, 0.0]);
/// assert!((d - 5.0).abs() < 1e-6);
/// ```
#[inline]
pub fn manhattan_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let mut sum = 0.0f32;
    let chunks = a.len() / 4;

    for i in 0..chunks {
        let base = i * 4;
        sum += (a[base] - b[base]).abs()
            + (a[base + 1] - b[base + 1]).abs()
            + (a[base + 2] - b[base + 2]).abs()
            + (a[base + 3] - b[base + 3]).abs();
    }

    for i in (chunks * 4)..a.len() {
        sum += (a[i] - b[i]).abs();
    }

    sum
}

/// Compute Euclidean (L2) distance between two vectors.
///
/// ```
/// use hsw_vector::euclidean_distance;
///
/// let a = [1.0, 2.0, 3.0];
/// let b = [4.0, 5.0, 6.0];
/// let dist = euclidean_distance(&a, &b);
/// assert!((dist - 5.196).abs() < 0.01); // sqrt(27)
/// ```
#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    euclidean_distance_squared(a, b).sqrt()
}

/// Compute squared Euclidean distance (no sqrt).
#[inline]
pub fn euclidean_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let mut sum = 0.0f32;
    let chunks = a.len() / 4;

    for i in 0..chunks {
        let base = i * 4;
        let d0 = a[base] - b[base];
        let d1 = a[base + 1] - b[base + 1];
        let d2 = a[base + 2] - b[base + 2];
        let d3 = a[base + 3] - b[base + 3];
        sum += d0 * d0 + d1 * d1 + d2 * d2 + d3 * d3;
    }

    for i in (chunks * 4)..a.len() {
        let d = a[i] - b[i];
        sum += d * d;
    }

    sum
}

/// Compute inner product (dot product) of two vectors.
///
/// ```
/// use hsw_vector::inner_product;
///
/// let ip = inner_product(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
/// assert!((ip - 32.0).abs() < 0.001);
/// ```
#[inline]
pub fn inner_product(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let mut sum = 0.0f32;
    let chunks = a.len() / 4;

    for i in 0..chunks {
        let base = i * 4;
        sum += a[base] * b[base]
            + a[base + 1] * b[base + 1]
            + a[base + 2] * b[base + 2]
            + a[base + 3] * b[base + 3];
    }

    for i in (chunks * 4)..a.len() {
        sum += a[i] * b[i];
    }

    sum
}

/// Euclidean norm of a single vector.
#[inline]
pub fn l2_norm(v: &[f32]) -> f32 {
    inner_product(v, v).sqrt()
}

/// Negated cosine similarity: -(a · b) / (||a|| * ||b||).
///
/// Returns a value in [-1, 1] where -1 means identical direction.
///
/// # Errors
///
/// `DegenerateVector` if either vector has zero norm.
///
/// ```
/// use hsw_vector::negated_cosine;
///
/// let d = negated_cosine(&[1.0, 0.0], &[2.0, 0.0]).unwrap();
/// assert!((d + 1.0).abs() < 1e-6);
/// assert!(negated_cosine(&[0.0, 0.0], &[1.0, 0.0]).is_err());
/// ```
#[inline]
pub fn negated_cosine(a: &[f32], b: &[f32]) -> Result<f32> {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let (dot, norm_a_sq, norm_b_sq) = dot_and_norms(a, b);
    if norm_a_sq == 0.0 || norm_b_sq == 0.0 {
        return Err(VectorError::DegenerateVector(
            "cosine distance is undefined for a zero-norm vector".to_string(),
        ));
    }

    Ok(-dot / (norm_a_sq.sqrt() * norm_b_sq.sqrt()))
}

/// Compute dot product and squared norms in a single pass.
///
/// Returns (dot, norm_a_squared, norm_b_squared)
#[inline]
fn dot_and_norms(a: &[f32], b: &[f32]) -> (f32, f32, f32) {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    let chunks = a.len() / 4;

    for i in 0..chunks {
        let base = i * 4;

        dot += a[base] * b[base]
            + a[base + 1] * b[base + 1]
            + a[base + 2] * b[base + 2]
            + a[base + 3] * b[base + 3];

        norm_a += a[base] * a[base]
            + a[base + 1] * a[base + 1]
            + a[base + 2] * a[base + 2]
            + a[base + 3] * a[base + 3];

        norm_b += b[base] * b[base]
            + b[base + 1] * b[base + 1]
            + b[base + 2] * b[base + 2]
            + b[base + 3] * b[base + 3];
    }

    for i in (chunks * 4)..a.len() {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }

    (dot, norm_a, norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        let a = [0.0, 0.0, 0.0, 0.0, 0.0];
        let b = [1.0, -2.0, 3.0, -4.0, 5.0];
        assert!((manhattan_distance(&a, &b) - 15.0).abs() < 0.001);
    }

    #[test]
    fn test_euclidean_distance() {
        let a = [0.0, 0.0, 0.0];
        let b = [3.0, 4.0, 0.0];
        assert!((euclidean_distance(&a, &b) - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_self_distance_is_zero_for_l1_and_l2() {
        let a = [1.5, -2.0, 3.25, 7.0, -0.5];
        assert_eq!(DistanceMetric::L1.distance(&a, &a).unwrap(), 0.0);
        assert_eq!(DistanceMetric::L2.distance(&a, &a).unwrap(), 0.0);

        let b = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert!(DistanceMetric::L1.distance(&a, &b).unwrap() >= 0.0);
        assert!(DistanceMetric::L2.distance(&a, &b).unwrap() >= 0.0);
    }

    #[test]
    fn test_negated_dot_product() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        let d = DistanceMetric::NegatedDotProduct.distance(&a, &b).unwrap();
        assert!((d + 32.0).abs() < 0.001);

        // Self-distance is not zero for the negated metrics
        let d = DistanceMetric::NegatedDotProduct.distance(&a, &a).unwrap();
        assert!((d + 14.0).abs() < 0.001);
    }

    #[test]
    fn test_negated_cosine() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];
        let c = [-3.0, 0.0];

        let metric = DistanceMetric::NegatedCosine;
        assert!((metric.distance(&a, &a).unwrap() + 1.0).abs() < 0.001);
        assert!(metric.distance(&a, &b).unwrap().abs() < 0.001);
        assert!((metric.distance(&a, &c).unwrap() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_zero_vector_cosine_is_degenerate() {
        let zero = [0.0, 0.0, 0.0];
        let b = [1.0, 2.0, 3.0];

        let metric = DistanceMetric::NegatedCosine;
        assert!(matches!(
            metric.distance(&zero, &b),
            Err(VectorError::DegenerateVector(_))
        ));
        assert!(matches!(
            metric.distance(&b, &zero),
            Err(VectorError::DegenerateVector(_))
        ));

        // The other metrics are defined for zero vectors
        assert!(DistanceMetric::L2.distance(&zero, &b).is_ok());
        assert!(DistanceMetric::NegatedDotProduct.distance(&zero, &b).is_ok());
    }

    #[test]
    fn test_length_mismatch() {
        let result = DistanceMetric::L1.distance(&[1.0, 2.0], &[1.0]);
        assert_eq!(
            result,
            Err(VectorError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_batch_matches_scalar() {
        let query: Vec<f32> = (0..7).map(|i| i as f32 * 0.3 - 1.0).collect();
        let rows: Vec<Vec<f32>> = (0..5)
            .map(|r| (0..7).map(|i| ((r * 7 + i) % 5) as f32 - 1.5).collect())
            .collect();

        for metric in DistanceMetric::ALL {
            let batch = metric
                .distances(&query, rows.iter().map(|r| r.as_slice()))
                .unwrap();
            assert_eq!(batch.len(), rows.len());
            for (row, d) in rows.iter().zip(&batch) {
                assert_eq!(metric.distance(&query, row).unwrap().to_bits(), d.to_bits());
            }
        }
    }

    #[test]
    fn test_batch_rejects_zero_query_for_cosine() {
        let rows = [vec![1.0, 0.0]];
        let result = DistanceMetric::NegatedCosine
            .distances(&[0.0, 0.0], rows.iter().map(|r| r.as_slice()));
        assert!(matches!(result, Err(VectorError::DegenerateVector(_))));

        // Empty candidate set still validates the query
        let empty: [&[f32]; 0] = [];
        let result = DistanceMetric::NegatedCosine.distances(&[0.0, 0.0], empty);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_and_display() {
        for metric in DistanceMetric::ALL {
            let parsed: DistanceMetric = metric.to_string().parse().unwrap();
            assert_eq!(parsed, metric);
        }
        assert_eq!("L2".parse::<DistanceMetric>().unwrap(), DistanceMetric::L2);
        assert!(matches!(
            "hamming".parse::<DistanceMetric>(),
            Err(VectorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_serde_wire_names() {
        let json = serde_json::to_string(&DistanceMetric::NegatedDotProduct).unwrap();
        assert_eq!(json, "\"dot\"");
        let metric: DistanceMetric = serde_json::from_str("\"cosine\"").unwrap();
        assert_eq!(metric, DistanceMetric::NegatedCosine);
    }

    #[test]
    fn test_high_dimensional() {
        let a: Vec<f32> = (0..128).map(|i| i as f32).collect();
        let b: Vec<f32> = (0..128).map(|i| (i + 1) as f32).collect();

        let d = euclidean_distance(&a, &b);
        assert!((d - (128.0f32).sqrt()).abs() < 0.01);
        assert!((manhattan_distance(&a, &b) - 128.0).abs() < 0.01);
    }
}
