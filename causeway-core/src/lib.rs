//! Causeway Core
//!
//! This crate provides the propagation engine for causal simulation graphs.
//! It implements:
//!
//! - The node contract (input, state and output variables plus `update`)
//! - The edge contract (a one-way transfer from source to target)
//! - A graph that indexes edge-to-edge dependencies and propagates a change
//!   from its starting edge, settling cycles or rolling back on conflict
//!
//! Concrete node behavior (gears, switches, anything else) lives with the
//! caller and is reached only through the [`Node`] and [`Edge`] traits.
//!
//! # Architecture
//!
//! - `graph`: node and edge contracts, the dependency index, propagation
//! - `config`: how revisits are judged to have settled
//! - `error`: structural misuse errors
//!
//! # Example
//!
//! ```rust
//! use causeway_core::graph::{CausalGraph, Edge, Node, NodeHandle, Variables};
//!
//! #[derive(Default)]
//! struct Lamp {
//!     power: bool,
//!     lit: bool,
//! }
//!
//! impl Node for Lamp {
//!     type State = bool;
//!     type Input = bool;
//!
//!     fn update(&mut self) -> bool {
//!         self.lit = self.power;
//!         true
//!     }
//!
//!     fn state_variables(&self) -> bool { self.lit }
//!     fn input_variables(&self) -> bool { self.power }
//!
//!     fn restore(&mut self, variables: Variables<bool, bool>) {
//!         self.lit = variables.state;
//!         self.power = variables.input;
//!     }
//! }
//!
//! struct Wire(NodeHandle<Lamp>, NodeHandle<Lamp>);
//!
//! impl Edge for Wire {
//!     type Source = Lamp;
//!     type Target = Lamp;
//!
//!     fn source(&self) -> &NodeHandle<Lamp> { &self.0 }
//!     fn target(&self) -> &NodeHandle<Lamp> { &self.1 }
//!
//!     fn effect(&self) -> bool {
//!         let lit = self.0.read().lit;
//!         self.1.write().power = lit;
//!         true
//!     }
//! }
//!
//! let first = NodeHandle::new(Lamp::default());
//! let second = NodeHandle::new(Lamp::default());
//!
//! let mut graph = CausalGraph::new();
//! graph.add_edge(Wire(first.clone(), second.clone()));
//!
//! first.write().power = true;
//! assert!(graph.propagate().unwrap().is_committed());
//! assert!(second.read().lit);
//! ```

pub mod config;
pub mod error;
pub mod graph;

pub use config::{BaselinePolicy, ComparisonPolicy, PropagationConfig};
pub use error::{GraphError, Result};
pub use graph::{
    CausalGraph, Conflict, Edge, EdgeId, Node, NodeHandle, NodeId, Outcome, PropagationReport,
    Variables,
};
