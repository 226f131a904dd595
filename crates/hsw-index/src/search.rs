//! Greedy multi-level query traversal.

use crate::graph::{Candidate, GraphIndex, NodeId};
use crate::trace::{QueryStep, QueryTrace};
use crate::{HswError, Result};
use hsw_observe::{obs_count, Meter, NoopMeter, QueryEvt, QueryKind, VizEvent};
use hsw_vector::{l2_norm, validate_vector, VectorError};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Result of a nearest-neighbor query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub node_id: NodeId,
    /// Distance from the query to `node_id`.
    pub distance: f32,
}

/// Runs queries against a frozen [`GraphIndex`].
///
/// Holds only a shared reference, so any number of engines may query the
/// same index concurrently.
pub struct QueryEngine<'a> {
    index: &'a GraphIndex,
    meter: Arc<dyn Meter>,
}

impl<'a> QueryEngine<'a> {
    pub fn new(index: &'a GraphIndex) -> Self {
        Self {
            index,
            meter: Arc::new(NoopMeter),
        }
    }

    /// Report query counters and step events to `meter`.
    pub fn with_meter(mut self, meter: Arc<dyn Meter>) -> Self {
        self.meter = meter;
        self
    }

    /// Find an approximate nearest neighbor of `query`.
    ///
    /// `rng` picks the starting node among the top level's members.
    ///
    /// # Errors
    ///
    /// - `Vector(DimensionMismatch)` if `query` has the wrong length
    /// - `Vector(InvalidVector)` if `query` has NaN or infinite components
    /// - `Vector(DegenerateVector)` for a zero query under the cosine metric
    /// - `EmptyIndex` if the top level has no members
    pub fn query<R: Rng + ?Sized>(&self, query: &[f32], rng: &mut R) -> Result<QueryResult> {
        self.search(query, rng, None)
    }

    /// Like [`query`](Self::query), also returning the traversal trace.
    pub fn query_traced<R: Rng + ?Sized>(
        &self,
        query: &[f32],
        rng: &mut R,
    ) -> Result<(QueryResult, QueryTrace)> {
        let mut trace = QueryTrace::new();
        let result = self.search(query, rng, Some(&mut trace))?;
        Ok((result, trace))
    }

    fn search<R: Rng + ?Sized>(
        &self,
        query: &[f32],
        rng: &mut R,
        mut trace: Option<&mut QueryTrace>,
    ) -> Result<QueryResult> {
        let index = self.index;
        let metric = index.metric();

        validate_vector(query, index.dimensions())?;
        if metric.requires_nonzero_norm() && l2_norm(query) == 0.0 {
            return Err(HswError::Vector(VectorError::DegenerateVector(
                "query vector has zero norm".to_string(),
            )));
        }

        let top = index.n_levels() - 1;
        let start = *index.level_nodes(top).choose(rng).ok_or_else(|| {
            HswError::EmptyIndex(format!("top level {} has no members", top))
        })?;

        // Distances computed so far in this query; a node is scored at most once
        let mut scored: HashMap<NodeId, f32> = HashMap::new();
        let start_distance = metric.distance(query, index.vector(start))?;
        scored.insert(start, start_distance);

        if let Some(trace) = trace.as_deref_mut() {
            trace.record_start(start, start_distance);
        }
        self.meter.emit(VizEvent::Query(QueryEvt {
            level: top as u8,
            kind: QueryKind::Start { node: start },
        }));

        let mut current = start;
        let mut best_distance = start_distance;
        let mut hops = 0u32;

        for level in (0..index.n_levels()).rev() {
            loop {
                let fresh: Vec<NodeId> = index
                    .neighbors(level, current)
                    .iter()
                    .copied()
                    .filter(|n| !scored.contains_key(n))
                    .collect();
                if fresh.is_empty() {
                    break;
                }

                let distances =
                    metric.distances(query, fresh.iter().map(|&n| index.vector(n)))?;
                scored.extend(fresh.iter().copied().zip(distances.iter().copied()));

                let Some(candidate) = fresh
                    .iter()
                    .zip(&distances)
                    .map(|(&node_id, &distance)| Candidate { node_id, distance })
                    .min()
                else {
                    break;
                };

                let improved = candidate.distance < best_distance;
                let moved_to = improved.then_some(candidate.node_id);

                tracing::trace!(
                    level,
                    current,
                    candidates = fresh.len(),
                    best = candidate.node_id,
                    improved,
                    "query step"
                );
                self.meter.emit(VizEvent::Query(QueryEvt {
                    level: level as u8,
                    kind: QueryKind::Step {
                        current,
                        candidates: fresh.len() as u32,
                        moved_to,
                    },
                }));
                if let Some(trace) = trace.as_deref_mut() {
                    trace.push(QueryStep {
                        level,
                        current,
                        candidates: fresh,
                        distances,
                        moved_to,
                    });
                }

                if !improved {
                    break;
                }
                current = candidate.node_id;
                best_distance = candidate.distance;
                hops += 1;
            }
        }

        debug_assert_eq!(
            scored.get(&current).map(|d| d.to_bits()),
            Some(best_distance.to_bits())
        );

        obs_count!(self.meter, "hsw_query_total", &[], 1);
        obs_count!(self.meter, "hsw_query_hops", &[], hops);
        obs_count!(self.meter, "hsw_query_distance_evals", &[], scored.len());
        self.meter.emit(VizEvent::Query(QueryEvt {
            level: 0,
            kind: QueryKind::Finish {
                node: current,
                hops,
            },
        }));
        tracing::debug!(
            node = current,
            distance = best_distance,
            hops,
            evaluated = scored.len(),
            "query complete"
        );

        Ok(QueryResult {
            node_id: current,
            distance: best_distance,
        })
    }
}
