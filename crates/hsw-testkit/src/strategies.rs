//! Proptest strategies for index construction scenarios.

use hsw_vector::DistanceMetric;
use proptest::prelude::*;

/// Parameters for one randomized build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildParams {
    pub k: usize,
    pub metric: DistanceMetric,
    pub log_base: f64,
    pub seed: u64,
}

// Components stay away from zero so cosine never sees a zero-norm row,
// even while shrinking.
fn arb_component() -> impl Strategy<Value = f32> {
    prop_oneof![-10.0f32..-0.5, 0.5f32..10.0]
}

/// Datasets of `min_len..max_len` rows, all of dimension `dims`.
pub fn arb_dataset(
    min_len: usize,
    max_len: usize,
    dims: usize,
) -> impl Strategy<Value = Vec<Vec<f32>>> {
    prop::collection::vec(prop::collection::vec(arb_component(), dims), min_len..max_len)
}

pub fn arb_metric() -> impl Strategy<Value = DistanceMetric> {
    prop_oneof![
        Just(DistanceMetric::L1),
        Just(DistanceMetric::L2),
        Just(DistanceMetric::NegatedDotProduct),
        Just(DistanceMetric::NegatedCosine),
    ]
}

/// Build parameters valid for any dataset of at least 4 rows.
pub fn arb_build_params() -> impl Strategy<Value = BuildParams> {
    (
        1usize..6,
        arb_metric(),
        prop_oneof![Just(2.0f64), Just(3.0), Just(4.0)],
        any::<u64>(),
    )
        .prop_map(|(k, metric, log_base, seed)| BuildParams {
            k,
            metric,
            log_base,
            seed,
        })
}
