//! Causal Graph
//!
//! This module implements the graph of causal edges and the propagation
//! engine that walks it.
//!
//! # Overview
//!
//! The graph is a directed graph over edges, not nodes:
//!
//! - Nodes hold simulation state and are shared through [`NodeHandle`]s
//! - Edges transfer values from a source node to a target node
//! - Edge B depends on edge A when A's target is B's source, so B fires
//!   after A
//!
//! When a caller changes the inputs of the starting edge's source and calls
//! [`CausalGraph::propagate`], the change is pushed along dependent edges.
//! Cycles are allowed: reaching an already-touched node is a consistency
//! check, and a failed check rolls every touched node back.
//!
//! # Design Decisions
//!
//! 1. The dependency index is derived edge-by-edge at registration time and
//!    is never rebuilt during a propagation step.
//!
//! 2. Identifiers are graph-local indices, assigned on registration.
//!
//! 3. We record both forward (dependents) and reverse (dependencies) links
//!    so traversal in either direction is a lookup.

mod context;
mod edge;
mod node;
mod scheduler;
mod snapshot;

pub use edge::{Edge, EdgeId};
pub use node::{Node, NodeHandle, NodeId, Variables};
pub use scheduler::{Conflict, Outcome, PropagationReport};

use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::trace;

use crate::config::PropagationConfig;
use crate::error::{GraphError, Result};
use snapshot::{ErasedEdge, ErasedNode};

/// Edge lists are short in practice; most edges have one or two neighbours.
pub(crate) type EdgeList = SmallVec<[EdgeId; 4]>;

/// A registered edge with its resolved endpoints.
struct EdgeEntry {
    edge: Box<dyn ErasedEdge>,
    source: NodeId,
    target: NodeId,
}

/// The causal graph: registered edges, their nodes, and the dependency index.
pub struct CausalGraph {
    /// Edges in registration order. An edge's id is its index.
    edges: Vec<EdgeEntry>,

    /// Nodes in first-seen order. A node's id is its index.
    nodes: Vec<Arc<dyn ErasedNode>>,

    /// Node id by address of the shared allocation.
    identities: HashMap<usize, NodeId>,

    /// Edges that fire after each edge.
    dependents: HashMap<EdgeId, EdgeList>,

    /// Edges each edge fires after.
    dependencies: HashMap<EdgeId, EdgeList>,

    /// The first edge ever registered.
    starting_edge: Option<EdgeId>,

    config: PropagationConfig,
}

impl CausalGraph {
    /// Create an empty graph with the default configuration.
    pub fn new() -> Self {
        Self::with_config(PropagationConfig::default())
    }

    /// Create an empty graph with the given configuration.
    pub fn with_config(config: PropagationConfig) -> Self {
        Self {
            edges: Vec::new(),
            nodes: Vec::new(),
            identities: HashMap::new(),
            dependents: HashMap::new(),
            dependencies: HashMap::new(),
            starting_edge: None,
            config,
        }
    }

    /// Register an edge, and through it, its endpoint nodes.
    ///
    /// The first edge registered becomes the starting edge. The new edge is
    /// compared with every edge already registered to extend the dependency
    /// index in both directions.
    pub fn add_edge<E: Edge>(&mut self, edge: E) -> EdgeId {
        let source = self.register_node(edge.source());
        let target = self.register_node(edge.target());
        let id = EdgeId::from(self.edges.len());

        if self.starting_edge.is_none() {
            self.starting_edge = Some(id);
        }

        for (index, other) in self.edges.iter().enumerate() {
            let other_id = EdgeId::from(index);
            if other.target == source {
                link(&mut self.dependents, &mut self.dependencies, other_id, id);
            }
            if target == other.source {
                link(&mut self.dependents, &mut self.dependencies, id, other_id);
            }
        }
        if source == target {
            link(&mut self.dependents, &mut self.dependencies, id, id);
        }

        trace!(edge = %id, %source, %target, "registered edge");

        self.edges.push(EdgeEntry {
            edge: Box::new(edge),
            source,
            target,
        });
        id
    }

    /// Look up or assign the id of a node.
    fn register_node<N: Node>(&mut self, handle: &NodeHandle<N>) -> NodeId {
        let address = Arc::as_ptr(handle.shared()) as *const () as usize;
        if let Some(&id) = self.identities.get(&address) {
            return id;
        }

        let id = NodeId::from(self.nodes.len());
        let node: Arc<dyn ErasedNode> = handle.shared().clone();
        trace!(node = %id, kind = node.kind(), "registered node");
        self.identities.insert(address, id);
        self.nodes.push(node);
        id
    }

    /// The edge propagation starts from, once any edge is registered.
    pub fn starting_edge(&self) -> Option<EdgeId> {
        self.starting_edge
    }

    /// Number of registered edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of distinct nodes referenced by registered edges.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The graph's configuration.
    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    /// Edges that fire after `edge`, in discovery order.
    pub fn dependents(&self, edge: EdgeId) -> Result<&[EdgeId]> {
        self.check_edge(edge)?;
        Ok(self
            .dependents
            .get(&edge)
            .map(|list| list.as_slice())
            .unwrap_or(&[]))
    }

    /// Edges that `edge` fires after, in discovery order.
    pub fn dependencies(&self, edge: EdgeId) -> Result<&[EdgeId]> {
        self.check_edge(edge)?;
        Ok(self
            .dependencies
            .get(&edge)
            .map(|list| list.as_slice())
            .unwrap_or(&[]))
    }

    /// Source and target of `edge`.
    pub fn edge_endpoints(&self, edge: EdgeId) -> Result<(NodeId, NodeId)> {
        let entry = self.entry(edge)?;
        Ok((entry.source, entry.target))
    }

    /// Id of a node if an edge referencing it has been registered.
    pub fn node_id_of<N: Node>(&self, handle: &NodeHandle<N>) -> Option<NodeId> {
        let address = Arc::as_ptr(handle.shared()) as *const () as usize;
        self.identities.get(&address).copied()
    }

    fn check_edge(&self, edge: EdgeId) -> Result<()> {
        self.entry(edge).map(|_| ())
    }

    fn entry(&self, edge: EdgeId) -> Result<&EdgeEntry> {
        self.edges
            .get(edge.raw())
            .ok_or(GraphError::UnknownEdge(edge))
    }

    fn node(&self, id: NodeId) -> &Arc<dyn ErasedNode> {
        // Node ids are only ever issued by `register_node`.
        &self.nodes[id.raw()]
    }
}

impl Default for CausalGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CausalGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CausalGraph")
            .field("edge_count", &self.edge_count())
            .field("node_count", &self.node_count())
            .field("starting_edge", &self.starting_edge)
            .field("config", &self.config)
            .finish()
    }
}

/// Record that `after` fires after `before`.
fn link(
    dependents: &mut HashMap<EdgeId, EdgeList>,
    dependencies: &mut HashMap<EdgeId, EdgeList>,
    before: EdgeId,
    after: EdgeId,
) {
    dependents.entry(before).or_default().push(after);
    dependencies.entry(after).or_default().push(before);
}
