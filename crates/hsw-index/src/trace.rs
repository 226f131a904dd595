//! Query traces for visualization.
//!
//! A trace records what the greedy walk looked at. It is filled in as a side
//! effect and never consulted by the walk itself.

use crate::graph::NodeId;
use serde::{Deserialize, Serialize};

/// One greedy expansion: `current` scored `candidates` at `level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryStep {
    pub level: usize,
    pub current: NodeId,
    /// Neighbors of `current` not scored earlier in this query
    pub candidates: Vec<NodeId>,
    /// Distance to the query, parallel to `candidates`
    pub distances: Vec<f32>,
    /// Candidate the walk moved to, if any improved on `current`
    pub moved_to: Option<NodeId>,
}

/// Ordered record of one query's traversal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryTrace {
    /// Node the walk started from
    pub start: Option<NodeId>,
    /// Distance from the query to `start`
    pub start_distance: Option<f32>,
    pub steps: Vec<QueryStep>,
}

impl QueryTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_start(&mut self, node: NodeId, distance: f32) {
        self.start = Some(node);
        self.start_distance = Some(distance);
    }

    pub(crate) fn push(&mut self, step: QueryStep) {
        self.steps.push(step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Nodes the walk stood on, starting node first.
    pub fn path(&self) -> Vec<NodeId> {
        self.start
            .into_iter()
            .chain(self.steps.iter().filter_map(|s| s.moved_to))
            .collect()
    }

    /// Every node whose distance was computed, in scoring order.
    pub fn scored(&self) -> Vec<NodeId> {
        self.start
            .into_iter()
            .chain(self.steps.iter().flat_map(|s| s.candidates.iter().copied()))
            .collect()
    }
}
