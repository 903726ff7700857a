//! Causal Edges
//!
//! An edge is a one-way causal relationship between two nodes. Its
//! [`Edge::effect`] copies values out of the source and into the target's
//! inputs, never the other way round.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::{Node, NodeHandle};

/// Graph-local identifier for an edge, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(usize);

impl EdgeId {
    /// Get the raw index.
    pub fn raw(&self) -> usize {
        self.0
    }
}

impl From<usize> for EdgeId {
    fn from(id: usize) -> Self {
        Self(id)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// A directed causal arrow from one source node to one target node.
///
/// # Self-loops
///
/// When source and target are the same handle, `effect` must drop its read
/// guard on the source before taking the write guard on the target.
pub trait Edge: Send + Sync + 'static {
    /// Node kind the edge reads from.
    type Source: Node;

    /// Node kind whose inputs the edge writes.
    type Target: Node;

    /// The source node.
    fn source(&self) -> &NodeHandle<Self::Source>;

    /// The target node.
    fn target(&self) -> &NodeHandle<Self::Target>;

    /// Transfer values from the source into the target's inputs.
    ///
    /// Returns `false` when the causal relationship does not currently hold
    /// (the source is blocked). The target must then be left untouched.
    fn effect(&self) -> bool;

    /// Apply the effect and, if it applied, update the target.
    fn update(&self) -> bool {
        if !self.effect() {
            return false;
        }
        self.target().write().update()
    }
}
