//! Error types for the propagation engine.
//!
//! Only structural misuse is an error. A node declining to update and a
//! cycle that fails to settle are ordinary outcomes of
//! [`CausalGraph::propagate`](crate::graph::CausalGraph::propagate) and are
//! reported through [`Outcome`](crate::graph::Outcome) instead.

use thiserror::Error;

use crate::graph::{EdgeId, NodeId};

/// Errors raised by graph registration, propagation and configuration.
#[derive(Debug, Error)]
pub enum GraphError {
    /// `propagate()` was called before any edge was registered.
    #[error("cannot propagate a graph with no registered edges")]
    EmptyGraph,

    /// Rollback was handed a snapshot captured from a different node kind.
    #[error("snapshot for node {node} does not hold variables of type {expected}")]
    SnapshotMismatch {
        /// The node being restored.
        node: NodeId,
        /// Type name of the node kind that was expected.
        expected: &'static str,
    },

    /// An edge id that was not issued by this graph.
    #[error("edge {0} is not registered with this graph")]
    UnknownEdge(EdgeId),

    /// A configuration document could not be parsed.
    #[error("invalid propagation config: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GraphError>;
