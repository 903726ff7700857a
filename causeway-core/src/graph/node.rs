//! Graph Nodes
//!
//! This module defines the node contract and the shared handle through
//! which nodes are registered with edges and observed by callers.

use std::fmt::{self, Debug};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};

/// Graph-local identifier for a node.
///
/// Assigned by [`CausalGraph`](super::CausalGraph) the first time an edge
/// referencing the node is registered. Ids are dense and start at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Get the raw index.
    pub fn raw(&self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    fn from(id: usize) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Point-in-time copy of a node's observable variables.
///
/// Owned values only: mutating a `Variables` never reaches the node it
/// was captured from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variables<S, I> {
    /// Internal state written by the node's own update.
    pub state: S,
    /// Inputs written by incoming edges or by the caller between steps.
    pub input: I,
}

impl<S, I> Variables<S, I> {
    /// Bundle state and input variables.
    pub fn new(state: S, input: I) -> Self {
        Self { state, input }
    }
}

/// A unit of simulation state.
///
/// Implementations own three partitions of variables: inputs (written by
/// edges or the caller), state (written only inside [`Node::update`]) and
/// outputs (a read-only view, typically over state). Outside of `update`
/// and `restore`, nothing about a node changes.
pub trait Node: Send + Sync + 'static {
    /// Strongly typed view of the node's internal state.
    type State: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// Strongly typed view of the node's input variables.
    type Input: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// Recompute state and outputs from the current inputs.
    ///
    /// Must be idempotent for unchanged inputs. Returns `false` when the
    /// node cannot currently propagate further (for example, it is broken).
    fn update(&mut self) -> bool;

    /// Owned copy of the state variables.
    fn state_variables(&self) -> Self::State;

    /// Owned copy of the input variables.
    fn input_variables(&self) -> Self::Input;

    /// Overwrite state and inputs with a previously captured snapshot.
    ///
    /// Called only when a propagation step is rolled back.
    fn restore(&mut self, variables: Variables<Self::State, Self::Input>);
}

/// Shared handle to a node.
///
/// Cloning a handle shares the node; identity is the shared allocation,
/// never the node's value. Callers set inputs through [`NodeHandle::write`]
/// between propagation steps.
pub struct NodeHandle<N: Node> {
    inner: Arc<RwLock<N>>,
}

impl<N: Node> NodeHandle<N> {
    /// Wrap a node in a new handle.
    pub fn new(node: N) -> Self {
        Self {
            inner: Arc::new(RwLock::new(node)),
        }
    }

    /// Borrow the node immutably.
    pub fn read(&self) -> RwLockReadGuard<'_, N> {
        self.inner.read()
    }

    /// Borrow the node mutably.
    pub fn write(&self) -> RwLockWriteGuard<'_, N> {
        self.inner.write()
    }

    /// Snapshot of state and input variables.
    pub fn variables(&self) -> Variables<N::State, N::Input> {
        let node = self.inner.read();
        Variables::new(node.state_variables(), node.input_variables())
    }

    /// Snapshot of the state variables.
    pub fn state_variables(&self) -> N::State {
        self.inner.read().state_variables()
    }

    /// Snapshot of the input variables.
    pub fn input_variables(&self) -> N::Input {
        self.inner.read().input_variables()
    }

    /// Check whether two handles refer to the same node.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn shared(&self) -> &Arc<RwLock<N>> {
        &self.inner
    }
}

impl<N: Node> Clone for NodeHandle<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<N: Node + Debug> Debug for NodeHandle<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeHandle").field(&*self.inner.read()).finish()
    }
}
