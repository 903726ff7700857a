//! Propagation Context
//!
//! The context holds everything one `propagate()` call needs to remember:
//! the work stack of pending edges, the snapshot taken the first time each
//! node was touched, the baseline a revisit is compared with, and the
//! running consistency flag.
//!
//! # Implementation
//!
//! Rollback snapshots live in an insertion-ordered map so that restoring
//! walks nodes in reverse first-touch order. The context is created fresh
//! for every call and dropped when the call returns; nothing in it outlives
//! a single propagation step.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::edge::EdgeId;
use super::node::NodeId;
use super::snapshot::Snapshot;

/// Per-call traversal state.
#[derive(Debug)]
pub(crate) struct PropagationContext {
    /// Edges waiting to fire. Popped from the end.
    stack: Vec<EdgeId>,

    /// Pre-touch snapshot of every node this call has touched.
    rollback: IndexMap<NodeId, Snapshot>,

    /// Snapshot a revisit is compared against.
    baselines: HashMap<NodeId, Snapshot>,

    /// Cleared when a revisit fails to settle.
    consistent: bool,
}

impl PropagationContext {
    /// Seed a context with the starting edge.
    pub(crate) fn new(start: EdgeId) -> Self {
        Self {
            stack: vec![start],
            rollback: IndexMap::new(),
            baselines: HashMap::new(),
            consistent: true,
        }
    }

    /// Take the next pending edge, if traversal should continue.
    pub(crate) fn next_edge(&mut self) -> Option<EdgeId> {
        if !self.consistent {
            return None;
        }
        self.stack.pop()
    }

    /// Queue edges that fire after the one just processed.
    pub(crate) fn push_edges(&mut self, edges: &[EdgeId]) {
        self.stack.extend_from_slice(edges);
    }

    /// Check whether a node has already been touched in this call.
    pub(crate) fn is_touched(&self, node: NodeId) -> bool {
        self.rollback.contains_key(&node)
    }

    /// Record a node's pre-touch snapshot. The first record wins.
    pub(crate) fn touch(&mut self, snapshot: Snapshot) {
        self.rollback.entry(snapshot.node()).or_insert(snapshot);
    }

    /// Pre-touch snapshot of a node.
    pub(crate) fn pre_touch(&self, node: NodeId) -> Option<&Snapshot> {
        self.rollback.get(&node)
    }

    /// Record the snapshot revisits of a node are compared with.
    pub(crate) fn set_baseline(&mut self, snapshot: Snapshot) {
        self.baselines.insert(snapshot.node(), snapshot);
    }

    /// Baseline for a node, if one was recorded.
    pub(crate) fn baseline(&self, node: NodeId) -> Option<&Snapshot> {
        self.baselines.get(&node)
    }

    /// Mark the propagation as inconsistent. Traversal stops at the next
    /// call to [`next_edge`](Self::next_edge).
    pub(crate) fn mark_inconsistent(&mut self) {
        self.consistent = false;
    }

    pub(crate) fn is_consistent(&self) -> bool {
        self.consistent
    }

    /// Touched nodes in first-touch order.
    pub(crate) fn touched(&self) -> Vec<NodeId> {
        self.rollback.keys().copied().collect()
    }

    /// Consume the context, yielding rollback snapshots newest first.
    pub(crate) fn into_rollback(self) -> impl Iterator<Item = Snapshot> {
        self.rollback.into_values().rev()
    }
}
