//! What a flow run produced.

use std::collections::{BTreeMap, BTreeSet};

use lf_core::{NodeId, Real, SignalValue};
use lf_graph::NodeKind;
use serde::Serialize;

/// How the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The work queue emptied.
    Completed,
    /// `max_global_iterations` node executions were reached.
    GlobalIterationLimit,
    Cancelled,
}

/// One node execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    /// 1-based execution counter.
    pub iteration: usize,
    pub node: NodeId,
    pub kind: NodeKind,
    pub inputs: Vec<Real>,
    pub output: SignalValue,
    pub branch: usize,
    /// Set when evaluation failed and a zero was substituted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Evaluation failure recorded against a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeFailure {
    pub node: NodeId,
    pub iteration: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowReport {
    pub results: Vec<StepRecord>,
    /// Executed node ids in order; repeats show loop iterations.
    pub path: Vec<NodeId>,
    /// Last output of every executed node.
    pub final_values: BTreeMap<NodeId, SignalValue>,
    /// Per-port outputs of routers: the active branch carries the value,
    /// every other branch is cleared to `NoSignal`.
    pub branch_outputs: BTreeMap<NodeId, Vec<SignalValue>>,
    /// Revisits detected within the loop window, per node.
    pub loop_counts: BTreeMap<NodeId, usize>,
    /// Nodes that hit `max_loop_iterations` and were no longer executed.
    pub loop_limited: BTreeSet<NodeId>,
    pub errors: Vec<NodeFailure>,
    /// Merge nodes whose parents never all produced a value.
    pub blocked: Vec<NodeId>,
    pub iterations: usize,
    pub termination: Termination,
}

impl FlowReport {
    pub(crate) fn new() -> Self {
        Self {
            results: Vec::new(),
            path: Vec::new(),
            final_values: BTreeMap::new(),
            branch_outputs: BTreeMap::new(),
            loop_counts: BTreeMap::new(),
            loop_limited: BTreeSet::new(),
            errors: Vec::new(),
            blocked: Vec::new(),
            iterations: 0,
            termination: Termination::Completed,
        }
    }

    pub fn value(&self, id: &str) -> Option<SignalValue> {
        self.final_values.get(&NodeId::new(id)).copied()
    }

    /// Scalar output of `id`, if it ran and was not cleared.
    pub fn scalar(&self, id: &str) -> Option<Real> {
        self.value(id).and_then(|v| v.as_scalar_opt())
    }

    pub fn executions_of(&self, id: &str) -> usize {
        self.path.iter().filter(|n| n.as_str() == id).count()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn completed(&self) -> bool {
        self.termination == Termination::Completed
    }
}
