//! Hierarchical small-world (HSW) graph index.
//!
//! Answers approximate nearest neighbor queries over a fixed dataset using a
//! simplified HNSW-style hierarchy:
//!
//! - Every vector samples a membership depth `m`; it joins levels `0..m`
//! - Higher levels hold exponentially fewer vectors
//! - At each level a new vector links to its `k` closest earlier peers, and
//!   each chosen peer links back (backlinks are not capped)
//! - A query starts at a random top-level node and hill-climbs greedily,
//!   descending one level each time it reaches a local optimum
//!
//! The index is build-once, query-many: [`IndexBuilder::build`] returns a
//! frozen [`GraphIndex`] that any number of threads may query.
//!
//! # Parameters
//!
//! - `k`: outbound neighbors chosen per node per level (default: 3)
//! - `log_base`: level count is `floor(log_base(N))` (default: 3)
//! - `metric`: `l1`, `l2`, `dot` or `cosine` (default: `l2`)
//! - `seed`: optional seed for reproducible builds and queries
//!
//! # Example
//!
//! ```
//! use hsw_index::{Dataset, HswConfig, IndexBuilder, QueryEngine};
//! use hsw_vector::DistanceMetric;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let rows: Vec<Vec<f32>> = (0..9).map(|i| vec![i as f32, 0.0]).collect();
//! let dataset = Dataset::new(rows).unwrap();
//!
//! let config = HswConfig::new(2, DistanceMetric::L2);
//! let mut rng = StdRng::seed_from_u64(7);
//! let graph = IndexBuilder::new(config).build(dataset, &mut rng).unwrap();
//! assert_eq!(graph.n_levels(), 2);
//!
//! let result = QueryEngine::new(&graph).query(&[8.1, 0.0], &mut rng);
//! // The top level may be empty for an unlucky seed; otherwise the walk
//! // along the line ends at node 8.
//! if let Ok(found) = result {
//!     assert_eq!(found.node_id, 8);
//! }
//! ```

mod builder;
mod config;
mod dataset;
mod graph;
mod index;
mod layer;
mod search;
mod trace;

pub use builder::IndexBuilder;
pub use config::HswConfig;
pub use dataset::Dataset;
pub use graph::{GraphIndex, GraphSnapshot, LevelGraph, LevelSnapshot, Neighbors, NodeId};
pub use index::HswIndex;
pub use layer::{level_count, LevelSampler};
pub use search::{QueryEngine, QueryResult};
pub use trace::{QueryStep, QueryTrace};

/// Error type for HSW index operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HswError {
    #[error("Vector error: {0}")]
    Vector(#[from] hsw_vector::VectorError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Index is empty: {0}")]
    EmptyIndex(String),
}

/// Result type for HSW index operations.
pub type Result<T> = std::result::Result<T, HswError>;
