//! Type-erased snapshots and node/edge views.
//!
//! Edges connect nodes of different kinds, so the graph stores them behind
//! object-safe views. Each view is blanket-implemented over the typed
//! contracts; snapshots carry their typed [`Variables`] boxed and compare by
//! downcasting back to the concrete type.

use std::any::{type_name, Any};
use std::fmt::Debug;

use parking_lot::RwLock;

use super::edge::Edge;
use super::node::{Node, NodeId, Variables};
use crate::config::ComparisonPolicy;
use crate::error::{GraphError, Result};

/// Object-safe face of a typed [`Variables`] value.
trait ErasedVariables: Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn matches(&self, other: &dyn ErasedVariables, policy: ComparisonPolicy) -> bool;
}

impl<S, I> ErasedVariables for Variables<S, I>
where
    S: PartialEq + Debug + Send + Sync + 'static,
    I: PartialEq + Debug + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn matches(&self, other: &dyn ErasedVariables, policy: ComparisonPolicy) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Self>() else {
            return false;
        };
        match policy {
            ComparisonPolicy::Full => self == other,
            ComparisonPolicy::StateOnly => self.state == other.state,
        }
    }
}

/// A captured copy of one node's variables.
#[derive(Debug)]
pub(crate) struct Snapshot {
    node: NodeId,
    variables: Box<dyn ErasedVariables>,
}

impl Snapshot {
    fn new<S, I>(node: NodeId, variables: Variables<S, I>) -> Self
    where
        S: PartialEq + Debug + Send + Sync + 'static,
        I: PartialEq + Debug + Send + Sync + 'static,
    {
        Self {
            node,
            variables: Box::new(variables),
        }
    }

    pub(crate) fn node(&self) -> NodeId {
        self.node
    }

    /// Structural comparison under `policy`. Snapshots of different node
    /// kinds never match.
    pub(crate) fn matches(&self, other: &Snapshot, policy: ComparisonPolicy) -> bool {
        self.variables.matches(other.variables.as_ref(), policy)
    }

    fn downcast<S: 'static, I: 'static>(&self) -> Option<&Variables<S, I>> {
        self.variables.as_any().downcast_ref()
    }
}

/// Object-safe view of a registered node.
pub(crate) trait ErasedNode: Send + Sync {
    fn update(&self) -> bool;

    fn capture(&self, id: NodeId) -> Snapshot;

    fn restore(&self, snapshot: &Snapshot) -> Result<()>;

    fn kind(&self) -> &'static str;
}

impl<N: Node> ErasedNode for RwLock<N> {
    fn update(&self) -> bool {
        self.write().update()
    }

    fn capture(&self, id: NodeId) -> Snapshot {
        let node = self.read();
        Snapshot::new(id, Variables::new(node.state_variables(), node.input_variables()))
    }

    fn restore(&self, snapshot: &Snapshot) -> Result<()> {
        let variables = snapshot
            .downcast::<N::State, N::Input>()
            .ok_or(GraphError::SnapshotMismatch {
                node: snapshot.node(),
                expected: type_name::<N>(),
            })?;
        self.write().restore(variables.clone());
        Ok(())
    }

    fn kind(&self) -> &'static str {
        type_name::<N>()
    }
}

/// Object-safe view of a registered edge.
pub(crate) trait ErasedEdge: Send + Sync {
    fn update(&self) -> bool;
}

impl<E: Edge> ErasedEdge for E {
    fn update(&self) -> bool {
        Edge::update(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Dial {
        setting: u8,
        reading: u8,
    }

    impl Node for Dial {
        type State = u8;
        type Input = u8;

        fn update(&mut self) -> bool {
            self.reading = self.setting;
            true
        }

        fn state_variables(&self) -> u8 {
            self.reading
        }

        fn input_variables(&self) -> u8 {
            self.setting
        }

        fn restore(&mut self, variables: Variables<u8, u8>) {
            self.reading = variables.state;
            self.setting = variables.input;
        }
    }

    #[derive(Debug)]
    struct Lamp {
        lit: bool,
    }

    impl Node for Lamp {
        type State = bool;
        type Input = ();

        fn update(&mut self) -> bool {
            true
        }

        fn state_variables(&self) -> bool {
            self.lit
        }

        fn input_variables(&self) {}

        fn restore(&mut self, variables: Variables<bool, ()>) {
            self.lit = variables.state;
        }
    }

    #[test]
    fn comparison_respects_policy() {
        let a = Snapshot::new(NodeId::from(0), Variables::new(1u8, 2u8));
        let b = Snapshot::new(NodeId::from(0), Variables::new(1u8, 3u8));

        assert!(!a.matches(&b, ComparisonPolicy::Full));
        assert!(a.matches(&b, ComparisonPolicy::StateOnly));
        assert!(a.matches(&a, ComparisonPolicy::Full));
    }

    #[test]
    fn different_kinds_never_match() {
        let a = Snapshot::new(NodeId::from(0), Variables::new(true, ()));
        let b = Snapshot::new(NodeId::from(0), Variables::new(1u8, 1u8));
        assert!(!a.matches(&b, ComparisonPolicy::StateOnly));
    }

    #[test]
    fn capture_and_restore_round_trip() {
        let dial = RwLock::new(Dial {
            setting: 4,
            reading: 0,
        });
        let before = dial.capture(NodeId::from(1));

        dial.write().setting = 9;
        assert!(ErasedNode::update(&dial));
        assert!(!dial.capture(NodeId::from(1)).matches(&before, ComparisonPolicy::Full));

        dial.restore(&before).unwrap();
        assert_eq!(dial.read().setting, 4);
        assert_eq!(dial.read().reading, 0);
    }

    #[test]
    fn restore_rejects_foreign_snapshot() {
        let lamp = RwLock::new(Lamp { lit: false });
        let foreign = Snapshot::new(NodeId::from(5), Variables::new(1u8, 1u8));

        let err = lamp.restore(&foreign).unwrap_err();
        assert!(matches!(
            err,
            GraphError::SnapshotMismatch { node, .. } if node == NodeId::from(5)
        ));
        assert!(lamp.kind().ends_with("Lamp"));
    }
}
