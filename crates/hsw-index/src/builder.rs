//! Index construction.
//!
//! Nodes are inserted strictly in dataset order. Each node samples a
//! membership depth, then at every level it joins it links to its `k`
//! closest earlier members and those members link back.

use crate::config::HswConfig;
use crate::dataset::Dataset;
use crate::graph::{Candidate, GraphIndex, NodeId};
use crate::layer::{level_count, LevelSampler};
use crate::{HswError, Result};
use hsw_observe::{obs_count, obs_gauge, obs_timed, BuildEvt, BuildKind, Meter, NoopMeter, VizEvent};
use hsw_vector::{l2_norm, VectorError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Instant;

/// Builds a [`GraphIndex`] from a [`Dataset`].
///
/// The builder holds only parameters; every call to [`build`](Self::build)
/// starts from an empty graph and returns a fresh, owned index. Nothing is
/// returned on failure.
pub struct IndexBuilder {
    config: HswConfig,
    meter: Arc<dyn Meter>,
}

impl IndexBuilder {
    /// Create a builder with no telemetry.
    pub fn new(config: HswConfig) -> Self {
        Self {
            config,
            meter: Arc::new(NoopMeter),
        }
    }

    /// Report build counters and events to `meter`.
    pub fn with_meter(mut self, meter: Arc<dyn Meter>) -> Self {
        self.meter = meter;
        self
    }

    /// Get configuration.
    pub fn config(&self) -> &HswConfig {
        &self.config
    }

    /// Build with a random source derived from the configured seed
    /// (or OS entropy when no seed is set).
    pub fn build_seeded(&self, dataset: Dataset) -> Result<GraphIndex> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.build(dataset, &mut rng)
    }

    /// Build an index over `dataset`, drawing membership depths from `rng`.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if `k < 1`, `log_base` is not a finite number
    ///   above 1, or the dataset is too small for a single level
    /// - `Vector(DegenerateVector)` if the metric is cosine and a row has
    ///   zero norm
    pub fn build<R: Rng + ?Sized>(&self, dataset: Dataset, rng: &mut R) -> Result<GraphIndex> {
        self.config.validate()?;

        let n = dataset.len();
        let k = self.config.k;
        let metric = self.config.metric;
        let log_base = self.config.log_base;

        let n_levels = level_count(n, log_base)?;
        if n_levels < 1 {
            return Err(HswError::InvalidParameter(format!(
                "dataset of {} vectors is too small for log_base {}: need at least {} to form one level",
                n,
                log_base,
                log_base.ceil()
            )));
        }

        if metric.requires_nonzero_norm() {
            if let Some(id) = dataset.rows().position(|row| l2_norm(row) == 0.0) {
                return Err(HswError::Vector(VectorError::DegenerateVector(format!(
                    "vector {} has zero norm",
                    id
                ))));
            }
        }

        tracing::info!(
            nodes = n,
            dimensions = dataset.dimensions(),
            levels = n_levels,
            k,
            metric = %metric,
            "building HSW index"
        );
        self.meter.emit(VizEvent::Build(BuildEvt {
            kind: BuildKind::Start {
                nodes: n as u32,
                levels: n_levels as u8,
                k: k as u32,
            },
        }));

        let started = Instant::now();
        let sampler = LevelSampler::new(n_levels, log_base);
        let mut graph = GraphIndex::new(dataset, metric, k, log_base, n_levels);

        obs_timed!(self.meter, "hsw_build_ms", &[], {
            for id in 0..n as NodeId {
                let depth = sampler.sample(rng);
                tracing::trace!(node = id, depth, "sampled membership depth");

                for level in 0..depth {
                    let outbound = select_neighbors(&graph, level, id, k)?;
                    graph.level_mut(level).insert_node(id, outbound);
                }
            }
        });

        let mut total_edges = 0usize;
        for (level, layer) in graph.levels().iter().enumerate() {
            let edges = layer.edge_count();
            total_edges += edges;
            tracing::debug!(level, members = layer.len(), edges, "level complete");
            self.meter.emit(VizEvent::Build(BuildEvt {
                kind: BuildKind::LevelComplete {
                    level: level as u8,
                    members: layer.len() as u32,
                    edges: edges as u64,
                },
            }));
        }

        let elapsed_ms = started.elapsed().as_millis();
        obs_count!(self.meter, "hsw_build_nodes_total", &[], n);
        obs_count!(self.meter, "hsw_build_edges_total", &[], total_edges);
        obs_gauge!(self.meter, "hsw_levels", &[], n_levels);
        self.meter.emit(VizEvent::Build(BuildEvt {
            kind: BuildKind::Finish {
                ms: elapsed_ms.min(u32::MAX as u128) as u32,
            },
        }));

        if graph.level_nodes(n_levels - 1).is_empty() {
            tracing::warn!(
                top_level = n_levels - 1,
                "no node reached the top level; queries will fail until rebuilt"
            );
        }
        tracing::info!(
            nodes = n,
            edges = total_edges,
            elapsed_ms = elapsed_ms as u64,
            "HSW index built"
        );

        Ok(graph)
    }
}

/// Pick the `k` members of `level` closest to `node_id`, ascending by
/// distance, ties to the lower id. Takes all members if there are fewer.
///
/// `node_id` itself is not yet a member, so it never selects itself.
fn select_neighbors(
    graph: &GraphIndex,
    level: usize,
    node_id: NodeId,
    k: usize,
) -> Result<Vec<NodeId>> {
    let peers = graph.level_nodes(level);
    if peers.is_empty() {
        return Ok(Vec::new());
    }

    let distances = graph.metric().distances(
        graph.vector(node_id),
        peers.iter().map(|&peer| graph.vector(peer)),
    )?;

    let mut candidates: Vec<Candidate> = peers
        .iter()
        .zip(distances)
        .map(|(&peer, distance)| Candidate {
            node_id: peer,
            distance,
        })
        .collect();

    if candidates.len() > k {
        candidates.select_nth_unstable(k - 1);
        candidates.truncate(k);
    }
    candidates.sort_unstable();

    Ok(candidates.into_iter().map(|c| c.node_id).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsw_testkit::{line_points, uniform_cloud, RecordingMeter};
    use hsw_vector::DistanceMetric;

    fn build(rows: Vec<Vec<f32>>, config: HswConfig, seed: u64) -> Result<GraphIndex> {
        let mut rng = StdRng::seed_from_u64(seed);
        IndexBuilder::new(config).build(Dataset::new(rows)?, &mut rng)
    }

    #[test]
    fn test_rejects_tiny_datasets() {
        for n in [1, 2] {
            let result = build(line_points(n), HswConfig::new(2, DistanceMetric::L2), 1);
            assert!(matches!(result, Err(HswError::InvalidParameter(_))), "n = {}", n);
        }
    }

    #[test]
    fn test_rejects_zero_k() {
        let result = build(line_points(9), HswConfig::new(0, DistanceMetric::L2), 1);
        assert!(matches!(result, Err(HswError::InvalidParameter(_))));
    }

    #[test]
    fn test_rejects_zero_vector_for_cosine() {
        let mut rows = uniform_cloud(3, 10, 3);
        rows[6] = vec![0.0, 0.0, 0.0];

        let result = build(rows.clone(), HswConfig::new(2, DistanceMetric::NegatedCosine), 1);
        assert!(matches!(
            result,
            Err(HswError::Vector(VectorError::DegenerateVector(_)))
        ));

        // Same data is fine for a metric defined at zero
        assert!(build(rows, HswConfig::new(2, DistanceMetric::L2), 1).is_ok());
    }

    #[test]
    fn test_line_level_zero_links_previous_two() {
        // Every node that joins level 0 links to its two closest earlier members
        let graph = build(line_points(9), HswConfig::new(2, DistanceMetric::L2), 3).unwrap();
        assert_eq!(graph.n_levels(), 2);

        let level0 = graph.level(0).unwrap();
        let members = level0.nodes();
        for (pos, &id) in members.iter().enumerate() {
            let outbound = level0.neighbors(id).unwrap().outbound();
            let mut expected: Vec<NodeId> = members[..pos].iter().rev().take(2).copied().collect();
            expected.sort_by_key(|&p| (id - p, p));
            assert_eq!(outbound, expected.as_slice(), "node {}", id);
        }
    }

    #[test]
    fn test_fewer_candidates_than_k() {
        let graph = build(line_points(9), HswConfig::new(50, DistanceMetric::L1), 8).unwrap();
        let level0 = graph.level(0).unwrap();
        for (pos, &id) in level0.nodes().iter().enumerate() {
            assert_eq!(level0.neighbors(id).unwrap().outbound().len(), pos);
        }
    }

    #[test]
    fn test_tie_break_prefers_lower_id() {
        // Nodes 0 and 1 sit at the same distance from node 3
        let rows = vec![vec![1.0, 0.0], vec![-1.0, 0.0], vec![5.0, 5.0], vec![0.0, 0.0]];
        let config = HswConfig::new(1, DistanceMetric::L2).with_log_base(2.0);

        for seed in 0..16 {
            let graph = build(rows.clone(), config.clone(), seed).unwrap();
            let level0 = graph.level(0).unwrap();
            if !(0..4).all(|id| level0.contains(id)) {
                continue;
            }
            assert_eq!(level0.neighbors(3).unwrap().outbound(), &[0]);
        }
    }

    #[test]
    fn test_reports_to_meter() {
        let meter = RecordingMeter::new();
        let builder = IndexBuilder::new(HswConfig::new(2, DistanceMetric::L2))
            .with_meter(Arc::new(meter.clone()));

        let mut rng = StdRng::seed_from_u64(5);
        let graph = builder
            .build(Dataset::new(line_points(27)).unwrap(), &mut rng)
            .unwrap();

        assert_eq!(meter.counter_value("hsw_build_nodes_total"), 27);
        let edges: usize = graph.levels().iter().map(|l| l.edge_count()).sum();
        assert_eq!(meter.counter_value("hsw_build_edges_total"), edges as u64);
        assert_eq!(meter.gauge_value("hsw_levels"), Some(3));
        assert_eq!(meter.samples("hsw_build_ms").len(), 1);

        let events = meter.events();
        assert!(matches!(
            events.first(),
            Some(VizEvent::Build(BuildEvt { kind: BuildKind::Start { nodes: 27, levels: 3, k: 2 } }))
        ));
        let level_events = events
            .iter()
            .filter(|e| matches!(e, VizEvent::Build(BuildEvt { kind: BuildKind::LevelComplete { .. } })))
            .count();
        assert_eq!(level_events, 3);
        assert!(matches!(
            events.last(),
            Some(VizEvent::Build(BuildEvt { kind: BuildKind::Finish { .. } }))
        ));
    }
}
