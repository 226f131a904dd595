//! Brute force vector search.
//!
//! Linear scan, O(n * d) per query. Serves as the exact baseline the graph
//! index is measured against in tests and benches.

use crate::distance::DistanceMetric;
use crate::traits::VectorMatch;
use crate::{validate_vector, Result, VectorError};

/// Exact nearest-neighbor search over an append-only set of vectors.
///
/// # Example
///
/// ```
/// use hsw_vector::{BruteForce, DistanceMetric};
///
/// let mut exact = BruteForce::new(2, DistanceMetric::L2);
/// exact.insert(&[0.0, 0.0]).unwrap();
/// exact.insert(&[5.0, 5.0]).unwrap();
///
/// let best = exact.nearest(&[4.0, 4.0]).unwrap().unwrap();
/// assert_eq!(best.index, 1);
/// ```
#[derive(Debug, Clone)]
pub struct BruteForce {
    /// Row storage, insertion order
    vectors: Vec<Vec<f32>>,
    /// Vector dimensions (all vectors must have this dimension)
    dimensions: usize,
    /// Distance metric to use
    metric: DistanceMetric,
}

impl BruteForce {
    /// Create an empty brute force searcher.
    pub fn new(dimensions: usize, metric: DistanceMetric) -> Self {
        Self {
            vectors: Vec::new(),
            dimensions,
            metric,
        }
    }

    /// Create a searcher preloaded with `rows`.
    pub fn from_rows<'a, I>(dimensions: usize, metric: DistanceMetric, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a [f32]>,
    {
        let mut exact = Self::new(dimensions, metric);
        for row in rows {
            exact.insert(row)?;
        }
        Ok(exact)
    }

    /// Distance metric used by this searcher.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Append a vector; returns its index.
    pub fn insert(&mut self, vector: &[f32]) -> Result<usize> {
        validate_vector(vector, self.dimensions)?;
        self.vectors.push(vector.to_vec());
        Ok(self.vectors.len() - 1)
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Check if no vectors are stored.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Return the `k` closest vectors, sorted by distance then index.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<VectorMatch>> {
        validate_vector(query, self.dimensions)?;

        if k == 0 {
            return Ok(vec![]);
        }

        let distances = self
            .metric
            .distances(query, self.vectors.iter().map(|v| v.as_slice()))?;

        let mut results: Vec<VectorMatch> = distances
            .into_iter()
            .enumerate()
            .map(|(index, distance)| VectorMatch::new(index, distance))
            .collect();

        results.sort();
        results.truncate(k);

        Ok(results)
    }

    /// Return the single closest vector, or `None` if empty.
    pub fn nearest(&self, query: &[f32]) -> Result<Option<VectorMatch>> {
        Ok(self.search(query, 1)?.into_iter().next())
    }

    /// Rank of `index` among all stored vectors for `query` (0 = exact nearest).
    pub fn rank_of(&self, query: &[f32], index: usize) -> Result<usize> {
        if index >= self.vectors.len() {
            return Err(VectorError::InvalidParameter(format!(
                "index {} out of range for {} vectors",
                index,
                self.vectors.len()
            )));
        }
        let ranked = self.search(query, self.vectors.len())?;
        Ok(ranked
            .iter()
            .position(|m| m.index == index)
            .unwrap_or(ranked.len()))
    }
}
