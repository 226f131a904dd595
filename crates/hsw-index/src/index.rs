//! Shared, rebuildable index handle.

use crate::builder::IndexBuilder;
use crate::config::HswConfig;
use crate::dataset::Dataset;
use crate::graph::{GraphIndex, GraphSnapshot};
use crate::search::{QueryEngine, QueryResult};
use crate::trace::QueryTrace;
use crate::{HswError, Result};
use hsw_observe::{Meter, NoopMeter};
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Thread-safe owner of the current [`GraphIndex`].
///
/// Queries take a read lock only long enough to clone the `Arc`, so a
/// rebuild never blocks in-flight queries. A rebuild runs without holding
/// any lock and swaps the finished graph in; if it fails, the previous
/// graph stays in place.
///
/// All randomness flows from one generator seeded by `config.seed`, so a
/// seeded handle replays the same sequence of builds and queries.
pub struct HswIndex {
    config: HswConfig,
    meter: Arc<dyn Meter>,
    graph: RwLock<Option<Arc<GraphIndex>>>,
    rng: Mutex<StdRng>,
}

impl HswIndex {
    /// Create an empty handle. Fails if `config` is invalid.
    pub fn new(config: HswConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            meter: Arc::new(NoopMeter),
            graph: RwLock::new(None),
            rng: Mutex::new(rng),
        })
    }

    pub fn with_meter(mut self, meter: Arc<dyn Meter>) -> Self {
        self.meter = meter;
        self
    }

    /// Get configuration.
    pub fn config(&self) -> &HswConfig {
        &self.config
    }

    /// Build a new graph over `dataset` and make it current.
    pub fn build(&self, dataset: Dataset) -> Result<()> {
        let mut rng = self.child_rng();
        let graph = IndexBuilder::new(self.config.clone())
            .with_meter(Arc::clone(&self.meter))
            .build(dataset, &mut rng)?;

        let previous = self.graph.write().replace(Arc::new(graph));
        if previous.is_some() {
            tracing::info!("replaced existing HSW graph");
        }
        Ok(())
    }

    /// Current graph, or `EmptyIndex` if nothing has been built.
    pub fn graph(&self) -> Result<Arc<GraphIndex>> {
        self.graph
            .read()
            .clone()
            .ok_or_else(|| HswError::EmptyIndex("index has not been built".to_string()))
    }

    pub fn is_built(&self) -> bool {
        self.graph.read().is_some()
    }

    /// Query the current graph.
    pub fn query(&self, query: &[f32]) -> Result<QueryResult> {
        let graph = self.graph()?;
        let mut rng = self.child_rng();
        self.engine(&graph).query(query, &mut rng)
    }

    /// Query the current graph and return the traversal trace.
    pub fn query_traced(&self, query: &[f32]) -> Result<(QueryResult, QueryTrace)> {
        let graph = self.graph()?;
        let mut rng = self.child_rng();
        self.engine(&graph).query_traced(query, &mut rng)
    }

    pub fn snapshot(&self) -> Result<GraphSnapshot> {
        Ok(self.graph()?.snapshot())
    }

    /// Drop the current graph. Queries fail with `EmptyIndex` until the next build.
    pub fn clear(&self) {
        *self.graph.write() = None;
    }

    fn engine<'a>(&self, graph: &'a GraphIndex) -> QueryEngine<'a> {
        QueryEngine::new(graph).with_meter(Arc::clone(&self.meter))
    }

    /// Independent generator for one operation, so the shared lock is held
    /// only for a single draw.
    fn child_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.rng.lock().gen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsw_testkit::{line_points, uniform_cloud};
    use hsw_vector::DistanceMetric;
    use std::thread;

    fn built_handle(seed: u64) -> HswIndex {
        let index = HswIndex::new(HswConfig::new(3, DistanceMetric::L2).with_seed(seed)).unwrap();
        index
            .build(Dataset::new(uniform_cloud(seed, 300, 3)).unwrap())
            .unwrap();
        index
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = HswIndex::new(HswConfig::new(0, DistanceMetric::L1));
        assert!(matches!(result, Err(HswError::InvalidParameter(_))));

        let result = HswIndex::new(HswConfig::default().with_log_base(0.5));
        assert!(matches!(result, Err(HswError::InvalidParameter(_))));
    }

    #[test]
    fn test_query_before_build() {
        let index = HswIndex::new(HswConfig::default()).unwrap();
        assert!(!index.is_built());
        assert!(matches!(index.query(&[0.0]), Err(HswError::EmptyIndex(_))));
        assert!(matches!(index.snapshot(), Err(HswError::EmptyIndex(_))));
    }

    #[test]
    fn test_failed_build_keeps_previous_graph() {
        let index = built_handle(4);
        let before = index.snapshot().unwrap();

        let tiny = Dataset::new(line_points(2)).unwrap();
        assert!(index.build(tiny).is_err());

        assert!(index.is_built());
        assert_eq!(index.snapshot().unwrap(), before);
    }

    #[test]
    fn test_clear() {
        let index = built_handle(8);
        assert!(index.is_built());
        index.clear();
        assert!(!index.is_built());
        assert!(matches!(index.query(&[0.1, 0.2, 0.3]), Err(HswError::EmptyIndex(_))));
    }

    #[test]
    fn test_seeded_handles_agree() {
        let a = built_handle(21);
        let b = built_handle(21);
        assert_eq!(a.snapshot().unwrap(), b.snapshot().unwrap());

        for q in [[0.1, 0.5, 0.9], [0.7, 0.7, 0.2], [1.0, 0.0, 0.3]] {
            let ra = a.query(&q);
            let rb = b.query(&q);
            assert_eq!(ra, rb);
        }
    }

    #[test]
    fn test_concurrent_queries() {
        let index = Arc::new(built_handle(13));
        let graph = index.graph().unwrap();
        if graph.level_nodes(graph.n_levels() - 1).is_empty() {
            return;
        }

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let index = Arc::clone(&index);
                thread::spawn(move || {
                    for i in 0..50 {
                        let x = (t * 50 + i) as f32 / 200.0;
                        let result = index.query(&[x, 1.0 - x, 0.5]).unwrap();
                        assert!((result.node_id as usize) < 300);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_rebuild_while_querying() {
        let index = Arc::new(built_handle(31));
        let graph = index.graph().unwrap();

        index
            .build(Dataset::new(uniform_cloud(32, 100, 3)).unwrap())
            .unwrap();

        // Old graph stays usable through the Arc held here
        assert_eq!(graph.len(), 300);
        assert_eq!(index.graph().unwrap().len(), 100);
    }
}
