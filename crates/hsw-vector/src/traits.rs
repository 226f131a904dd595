//! Search result type shared by the exact and graph searches.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A match returned from vector search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    /// Position of the vector in insertion order.
    pub index: usize,
    /// Distance (lower = more similar).
    pub distance: f32,
}

impl VectorMatch {
    /// Create a new vector match.
    pub fn new(index: usize, distance: f32) -> Self {
        Self { index, distance }
    }
}

impl Eq for VectorMatch {}

impl PartialOrd for VectorMatch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VectorMatch {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lower distance first, lower index breaks ties
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.index.cmp(&other.index))
    }
}
