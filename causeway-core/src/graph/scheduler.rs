//! Propagation Scheduler
//!
//! The scheduler walks the causal graph after a caller has changed the
//! inputs of the starting edge's source node.
//!
//! # Algorithm
//!
//! A depth-first walk driven by an explicit stack of edges:
//!
//! 1. Snapshot the starting edge's source node and update it
//! 2. Seed the stack with the starting edge
//! 3. Pop an edge and look at its target:
//!    - Untouched target: snapshot it, fire the edge, and if the edge
//!      applied, push every edge that fires after it
//!    - Touched target: a cycle (or a second path) has closed. Fire the
//!      edge again and compare the target with its baseline. A match
//!      settles the branch; a mismatch stops the walk
//! 4. If the walk stopped on a mismatch, restore every touched node to the
//!    snapshot taken before this call first touched it
//!
//! A declining edge or node only ends its own branch. It is not a conflict
//! and never causes a rollback.
//!
//! The walk is not a topological sort. When a node has several
//! predecessors, results can depend on registration order.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::context::PropagationContext;
use super::edge::EdgeId;
use super::node::NodeId;
use super::snapshot::Snapshot;
use super::CausalGraph;
use crate::config::BaselinePolicy;
use crate::error::{GraphError, Result};

/// How a propagation step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every touched node keeps its new variables.
    Committed,

    /// A revisit failed to settle; every touched node was restored.
    RolledBack,
}

impl Outcome {
    /// `true` for [`Outcome::Committed`].
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed)
    }
}

/// The revisit that failed to settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Edge that closed the cycle.
    pub edge: EdgeId,
    /// Node whose variables disagreed with its baseline.
    pub node: NodeId,
}

/// What one propagation step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationReport {
    /// Final outcome.
    pub outcome: Outcome,

    /// Nodes touched by the step, in first-touch order.
    pub touched: Vec<NodeId>,

    /// Number of edges popped and fired, revisits included.
    pub edges_fired: usize,

    /// Whether the starting edge's source node declined its update.
    pub leader_declined: bool,

    /// Edges whose effect or target update declined on a first visit.
    pub declined: Vec<EdgeId>,

    /// Edges whose revisit settled.
    pub settled: Vec<EdgeId>,

    /// The revisit that caused a rollback.
    pub conflict: Option<Conflict>,
}

impl PropagationReport {
    fn new() -> Self {
        Self {
            outcome: Outcome::Committed,
            touched: Vec::new(),
            edges_fired: 0,
            leader_declined: false,
            declined: Vec::new(),
            settled: Vec::new(),
            conflict: None,
        }
    }

    /// `true` if the step committed.
    pub fn is_committed(&self) -> bool {
        self.outcome.is_committed()
    }

    /// Render the report as JSON, for logs.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl CausalGraph {
    /// Propagate the caller's input change through the graph.
    ///
    /// Returns [`Outcome::Committed`] when the walk finished without an
    /// inconsistent revisit and [`Outcome::RolledBack`] otherwise. Calling
    /// this on a graph with no edges is an error.
    pub fn propagate(&mut self) -> Result<Outcome> {
        self.propagate_report().map(|report| report.outcome)
    }

    /// Like [`propagate`](Self::propagate), returning the full report.
    pub fn propagate_report(&mut self) -> Result<PropagationReport> {
        let start = self.starting_edge.ok_or(GraphError::EmptyGraph)?;
        let mut ctx = PropagationContext::new(start);
        let mut report = PropagationReport::new();

        debug!(
            start = %start,
            edges = self.edge_count(),
            nodes = self.node_count(),
            "propagation started"
        );

        let leader = self.edges[start.raw()].source;
        ctx.touch(self.capture(leader));
        if !self.node(leader).update() {
            trace!(node = %leader, "leading node declined update");
            report.leader_declined = true;
        }
        self.record_baseline(&mut ctx, leader);

        while let Some(edge) = ctx.next_edge() {
            let entry = &self.edges[edge.raw()];
            let target = entry.target;
            report.edges_fired += 1;

            if !ctx.is_touched(target) {
                ctx.touch(self.capture(target));
                let applied = entry.edge.update();
                self.record_baseline(&mut ctx, target);

                if applied {
                    trace!(edge = %edge, node = %target, "edge fired");
                    if let Some(next) = self.dependents.get(&edge) {
                        ctx.push_edges(next);
                    }
                } else {
                    trace!(edge = %edge, node = %target, "edge declined, branch ends");
                    report.declined.push(edge);
                }
                continue;
            }

            entry.edge.update();
            let current = self.capture(target);
            let baseline = match self.config.baseline {
                BaselinePolicy::Settled => ctx.baseline(target),
                BaselinePolicy::PreTouch => ctx.pre_touch(target),
            };
            let settled = baseline
                .map(|baseline| current.matches(baseline, self.config.comparison))
                .unwrap_or(false);

            if settled {
                trace!(edge = %edge, node = %target, "revisit settled");
                report.settled.push(edge);
            } else {
                warn!(edge = %edge, node = %target, "revisit disagrees with baseline");
                report.conflict = Some(Conflict { edge, node: target });
                ctx.mark_inconsistent();
            }
        }

        report.touched = ctx.touched();
        if ctx.is_consistent() {
            debug!(
                touched = report.touched.len(),
                fired = report.edges_fired,
                "propagation committed"
            );
            return Ok(report);
        }

        self.rollback(ctx)?;
        report.outcome = Outcome::RolledBack;
        debug!(touched = report.touched.len(), "propagation rolled back");
        Ok(report)
    }

    fn capture(&self, node: NodeId) -> Snapshot {
        self.node(node).capture(node)
    }

    fn record_baseline(&self, ctx: &mut PropagationContext, node: NodeId) {
        if self.config.baseline == BaselinePolicy::Settled {
            ctx.set_baseline(self.capture(node));
        }
    }

    /// Restore every touched node, newest first. A failed restore does not
    /// stop the remaining ones; the first failure is returned.
    fn rollback(&self, ctx: PropagationContext) -> Result<()> {
        let mut first_error = None;
        for snapshot in ctx.into_rollback() {
            let node = snapshot.node();
            if let Err(err) = self.node(node).restore(&snapshot) {
                warn!(node = %node, error = %err, "rollback could not restore node");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
