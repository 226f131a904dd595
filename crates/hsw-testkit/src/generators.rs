//! Deterministic dataset generators.
//!
//! Every generator is a pure function of its arguments: the same seed always
//! yields the same rows.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `n` two-dimensional points on the x axis: `(0,0), (1,0), ..., (n-1,0)`.
pub fn line_points(n: usize) -> Vec<Vec<f32>> {
    (0..n).map(|i| vec![i as f32, 0.0]).collect()
}

/// `n` points drawn uniformly from `[0, 1)^dims`.
pub fn uniform_cloud(seed: u64, n: usize, dims: usize) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..dims).map(|_| rng.gen::<f32>()).collect())
        .collect()
}

/// `clusters * per_cluster` points scattered tightly around well separated centers.
///
/// Centers sit at `(10 * c, 10 * c, ...)`; each point is within `spread` of its
/// center on every axis. Rows are interleaved across clusters so insertion order
/// does not group them.
pub fn clustered_blobs(
    seed: u64,
    clusters: usize,
    per_cluster: usize,
    dims: usize,
    spread: f32,
) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(clusters * per_cluster);
    for _ in 0..per_cluster {
        for c in 0..clusters {
            let center = 10.0 * c as f32;
            rows.push(
                (0..dims)
                    .map(|_| center + rng.gen_range(-spread..=spread))
                    .collect(),
            );
        }
    }
    rows
}
