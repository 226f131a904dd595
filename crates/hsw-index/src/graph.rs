//! Graph data structures for the HSW index.
//!
//! Each level keeps the nodes present at that level in insertion order, plus
//! an adjacency slot per node id. Slots are preallocated for the whole
//! dataset, so "create the neighbor list if absent" is a slot fill rather
//! than a map insertion.

use crate::dataset::Dataset;
use hsw_vector::DistanceMetric;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Internal node ID (dense, equal to the row index in the dataset).
pub type NodeId = u32;

/// Neighbor list for a node at a specific level.
///
/// The first `outbound` ids are the edges the node chose at its own
/// insertion (closest first, at most `k`). Everything after them is a
/// backlink appended when a later node chose this one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Neighbors {
    ids: Vec<NodeId>,
    outbound: usize,
}

impl Neighbors {
    /// Neighbors consisting of an outbound selection only.
    pub(crate) fn with_outbound(ids: Vec<NodeId>) -> Self {
        let outbound = ids.len();
        Self { ids, outbound }
    }

    /// Append a backlink.
    pub(crate) fn push_backlink(&mut self, id: NodeId) {
        self.ids.push(id);
    }

    /// All neighbor ids: outbound edges first, then backlinks in arrival order.
    pub fn all(&self) -> &[NodeId] {
        &self.ids
    }

    /// Edges chosen at this node's insertion.
    pub fn outbound(&self) -> &[NodeId] {
        &self.ids[..self.outbound]
    }

    /// Edges added by later nodes.
    pub fn backlinks(&self) -> &[NodeId] {
        &self.ids[self.outbound..]
    }

    /// Total number of neighbors.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate over neighbor IDs.
    pub fn iter(&self) -> impl Iterator<Item = &NodeId> {
        self.ids.iter()
    }
}

/// Graph storage for a single level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelGraph {
    /// Members of this level, in insertion order
    nodes: Vec<NodeId>,
    /// Adjacency slot per node id; `None` for nodes absent from this level
    slots: Vec<Option<Neighbors>>,
}

impl LevelGraph {
    /// Create an empty level able to hold `capacity` node ids.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            nodes: Vec::new(),
            slots: vec![None; capacity],
        }
    }

    /// Add `node_id` with its outbound selection, then backlink every
    /// selected neighbor to it.
    ///
    /// Nodes must be added in ascending id order, and every outbound id
    /// must already be a member of this level.
    pub(crate) fn insert_node(&mut self, node_id: NodeId, outbound: Vec<NodeId>) {
        debug_assert!(self.slots[node_id as usize].is_none());

        for &neighbor in &outbound {
            self.slots[neighbor as usize]
                .get_or_insert_with(Neighbors::default)
                .push_backlink(node_id);
        }

        self.nodes.push(node_id);
        self.slots[node_id as usize] = Some(Neighbors::with_outbound(outbound));
    }

    /// Members in insertion order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Get the number of nodes in this level.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if level is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check if a node exists in this level.
    pub fn contains(&self, node_id: NodeId) -> bool {
        self.slot(node_id).is_some()
    }

    /// Get neighbors for a node.
    pub fn neighbors(&self, node_id: NodeId) -> Option<&Neighbors> {
        self.slot(node_id)
    }

    /// Total directed adjacency entries (outbound plus backlinks).
    pub fn edge_count(&self) -> usize {
        self.adjacency().map(|(_, n)| n.len()).sum()
    }

    /// `(node, neighbors)` pairs in ascending node id order.
    pub fn adjacency(&self) -> impl Iterator<Item = (NodeId, &Neighbors)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|n| (id as NodeId, n)))
    }

    fn slot(&self, node_id: NodeId) -> Option<&Neighbors> {
        self.slots.get(node_id as usize).and_then(|s| s.as_ref())
    }
}

/// Candidate neighbor during build or search (node_id, distance).
///
/// Ordered by distance, then by node id so ties resolve to the lower id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Candidate {
    pub node_id: NodeId,
    pub distance: f32,
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.node_id.cmp(&other.node_id))
    }
}

/// A frozen multi-level graph over a dataset.
///
/// Produced by [`IndexBuilder::build`](crate::IndexBuilder::build); read-only
/// afterwards, so it can be shared across threads without locking.
#[derive(Debug, Clone)]
pub struct GraphIndex {
    dataset: Dataset,
    metric: DistanceMetric,
    k: usize,
    log_base: f64,
    /// Level graphs (index 0 = bottom level, highest index = top level)
    levels: Vec<LevelGraph>,
}

impl GraphIndex {
    pub(crate) fn new(
        dataset: Dataset,
        metric: DistanceMetric,
        k: usize,
        log_base: f64,
        n_levels: usize,
    ) -> Self {
        let capacity = dataset.len();
        Self {
            dataset,
            metric,
            k,
            log_base,
            levels: (0..n_levels).map(|_| LevelGraph::new(capacity)).collect(),
        }
    }

    pub(crate) fn level_mut(&mut self, level: usize) -> &mut LevelGraph {
        &mut self.levels[level]
    }

    /// Number of levels.
    pub fn n_levels(&self) -> usize {
        self.levels.len()
    }

    /// Outbound cap used at build time.
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn log_base(&self) -> f64 {
        self.log_base
    }

    /// Number of indexed vectors.
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// Always false; an index is never built from an empty dataset.
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dataset.dimensions()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Vector of node `id`.
    #[inline]
    pub fn vector(&self, id: NodeId) -> &[f32] {
        self.dataset.row(id)
    }

    /// All levels, bottom first.
    pub fn levels(&self) -> &[LevelGraph] {
        &self.levels
    }

    /// Get a reference to a specific level.
    pub fn level(&self, level: usize) -> Option<&LevelGraph> {
        self.levels.get(level)
    }

    /// Members of `level` in insertion order (empty if out of range).
    pub fn level_nodes(&self, level: usize) -> &[NodeId] {
        self.level(level).map(|l| l.nodes()).unwrap_or(&[])
    }

    /// Neighbors of `node_id` at `level` (empty if absent).
    pub fn neighbors(&self, level: usize, node_id: NodeId) -> &[NodeId] {
        self.level(level)
            .and_then(|l| l.neighbors(node_id))
            .map(|n| n.all())
            .unwrap_or(&[])
    }

    /// Number of levels `node_id` belongs to (its membership depth).
    pub fn depth(&self, node_id: NodeId) -> usize {
        self.levels
            .iter()
            .take_while(|l| l.contains(node_id))
            .count()
    }

    /// Plain-data copy of the graph for rendering and serialization.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            metric: self.metric,
            k: self.k,
            log_base: self.log_base,
            dimensions: self.dimensions(),
            len: self.len(),
            levels: self
                .levels
                .iter()
                .enumerate()
                .map(|(level, graph)| LevelSnapshot {
                    level,
                    nodes: graph.nodes().to_vec(),
                    adjacency: graph
                        .adjacency()
                        .map(|(id, n)| (id, n.all().to_vec()))
                        .collect(),
                    outbound: graph
                        .adjacency()
                        .map(|(id, n)| (id, n.outbound().len()))
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Serializable view of a [`GraphIndex`]; maps are ordered so output is stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub metric: DistanceMetric,
    pub k: usize,
    pub log_base: f64,
    pub dimensions: usize,
    pub len: usize,
    pub levels: Vec<LevelSnapshot>,
}

/// One level of a [`GraphSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub level: usize,
    /// Members in insertion order
    pub nodes: Vec<NodeId>,
    /// node -> neighbors (outbound first, then backlinks)
    pub adjacency: BTreeMap<NodeId, Vec<NodeId>>,
    /// node -> length of its outbound prefix
    pub outbound: BTreeMap<NodeId, usize>,
}
