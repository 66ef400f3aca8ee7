//! Work-queue traversal of a logic graph.

use std::collections::{HashMap, HashSet, VecDeque};

use lf_core::{NodeId, Real, SignalValue};
use lf_fuzzy::FuzzyGateEvaluator;
use lf_gates::{CompiledExpr, GateError, GateEvaluator};
use lf_graph::{ConnectionType, Graph, Node, NodeKind};
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::config::FlowConfig;
use crate::error::{FlowError, FlowResult, NodeError};
use crate::eval::{self, Evaluators};
use crate::report::{FlowReport, NodeFailure, StepRecord, Termination};

/// Propagates signals from a start node through a graph.
///
/// The engine owns its evaluators and any externally supplied node inputs;
/// everything else (queue, history, loop counters, computed values) lives
/// only for the duration of one [`execute_flow`](Self::execute_flow) call.
///
/// Termination does not depend on the graph being acyclic: every run is
/// bounded by `max_global_iterations`, and nodes revisited too often within
/// the loop window stop being executed.
#[derive(Debug, Clone)]
pub struct SignalFlowEngine {
    config: FlowConfig,
    gates: GateEvaluator,
    fuzzy: FuzzyGateEvaluator,
    external_inputs: HashMap<NodeId, Vec<Real>>,
    cancel: CancellationToken,
}

impl Default for SignalFlowEngine {
    fn default() -> Self {
        Self::new(FlowConfig::default())
    }
}

impl SignalFlowEngine {
    pub fn new(config: FlowConfig) -> Self {
        Self::with_evaluators(config, GateEvaluator::new(), FuzzyGateEvaluator::new())
    }

    pub fn with_evaluators(
        config: FlowConfig,
        gates: GateEvaluator,
        fuzzy: FuzzyGateEvaluator,
    ) -> Self {
        Self {
            config,
            gates,
            fuzzy,
            external_inputs: HashMap::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn gates(&self) -> &GateEvaluator {
        &self.gates
    }

    /// For registering truth-table gates between runs.
    pub fn gates_mut(&mut self) -> &mut GateEvaluator {
        &mut self.gates
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Values appended to a node's inputs on every run until cleared.
    pub fn set_external_input(&mut self, id: impl Into<NodeId>, values: Vec<Real>) {
        self.external_inputs.insert(id.into(), values);
    }

    pub fn clear_external_inputs(&mut self) {
        self.external_inputs.clear();
    }

    /// Run one traversal from `start`, feeding it `initial_input`.
    ///
    /// Only a missing start node or an invalid configuration is an error;
    /// per-node failures, blocked merges and limit hits are in the report.
    pub fn execute_flow(
        &self,
        graph: &Graph,
        start: &NodeId,
        initial_input: &[Real],
    ) -> FlowResult<FlowReport> {
        self.config.validate()?;
        if !graph.contains_node(start) {
            return Err(FlowError::UnknownStartNode { id: start.clone() });
        }

        let report = Pass::new(graph, start, initial_input).run(self);
        info!(
            start = %start,
            iterations = report.iterations,
            termination = ?report.termination,
            errors = report.errors.len(),
            blocked = report.blocked.len(),
            "flow finished"
        );
        Ok(report)
    }
}

/// Transient state of one run.
struct Pass<'a> {
    graph: &'a Graph,
    start: &'a NodeId,
    initial: &'a [Real],
    queue: VecDeque<NodeId>,
    pending: HashSet<NodeId>,
    executed: HashSet<NodeId>,
    history: VecDeque<NodeId>,
    values: HashMap<NodeId, SignalValue>,
    branches: HashMap<NodeId, usize>,
    compiled: HashMap<NodeId, Result<CompiledExpr, GateError>>,
    /// Consecutive merge deferrals since the last execution.
    stalled: usize,
    report: FlowReport,
}

impl<'a> Pass<'a> {
    fn new(graph: &'a Graph, start: &'a NodeId, initial: &'a [Real]) -> Self {
        Self {
            graph,
            start,
            initial,
            queue: VecDeque::new(),
            pending: HashSet::new(),
            executed: HashSet::new(),
            history: VecDeque::new(),
            values: HashMap::new(),
            branches: HashMap::new(),
            compiled: HashMap::new(),
            stalled: 0,
            report: FlowReport::new(),
        }
    }

    fn run(mut self, engine: &SignalFlowEngine) -> FlowReport {
        let config = engine.config;
        let evaluators = Evaluators {
            gates: &engine.gates,
            fuzzy: &engine.fuzzy,
        };
        let graph = self.graph;
        self.enqueue(self.start.clone());

        while !self.queue.is_empty() {
            if engine.cancel.is_cancelled() {
                warn!(iterations = self.report.iterations, "flow cancelled");
                self.report.termination = Termination::Cancelled;
                break;
            }
            if self.report.iterations >= config.max_global_iterations {
                warn!(
                    limit = config.max_global_iterations,
                    queued = self.queue.len(),
                    "global iteration limit reached"
                );
                self.report.termination = Termination::GlobalIterationLimit;
                break;
            }

            let Some(id) = self.queue.pop_front() else {
                break;
            };
            self.pending.remove(&id);
            let Some(node) = graph.node(&id) else {
                continue;
            };

            if node.kind == NodeKind::Merge && !self.merge_ready(node) {
                self.defer(id);
                continue;
            }
            if self.over_loop_limit(&id, &config) {
                continue;
            }
            self.execute(node, &evaluators, &engine.external_inputs, &config);
        }
        self.report
    }

    fn enqueue(&mut self, id: NodeId) {
        if self.graph.contains_node(&id) && self.pending.insert(id.clone()) {
            self.queue.push_back(id);
        }
    }

    /// Every non-feedback parent must have produced a value this run.
    fn merge_ready(&self, node: &Node) -> bool {
        let graph = self.graph;
        graph
            .incoming(&node.id)
            .filter(|c| c.kind != ConnectionType::Feedback)
            .all(|c| self.values.contains_key(&c.from))
            && graph
                .branch_parents(&node.id)
                .all(|p| self.values.contains_key(&p.id))
    }

    /// Put a waiting merge back; once nothing but waiting merges is left,
    /// drain them all as blocked.
    fn defer(&mut self, id: NodeId) {
        self.stalled += 1;
        self.pending.insert(id.clone());
        self.queue.push_back(id);
        if self.stalled > self.queue.len() {
            for id in self.queue.drain(..) {
                warn!(node = %id, "merge barrier never satisfied");
                self.report.blocked.push(id);
            }
            self.pending.clear();
        }
    }

    fn over_loop_limit(&mut self, id: &NodeId, config: &FlowConfig) -> bool {
        if self.history.contains(id) {
            *self.report.loop_counts.entry(id.clone()).or_insert(0) += 1;
        }
        let count = self.report.loop_counts.get(id).copied().unwrap_or(0);
        if count <= config.max_loop_iterations {
            return false;
        }
        if self.report.loop_limited.insert(id.clone()) {
            warn!(node = %id, count, "loop limit reached, node will not run again");
        }
        true
    }

    fn gather_inputs(&self, node: &Node, external: &HashMap<NodeId, Vec<Real>>) -> Vec<Real> {
        let graph = self.graph;
        let mut incoming: Vec<_> = graph.incoming(&node.id).collect();
        incoming.sort_by_key(|c| c.to_port);

        let mut inputs = Vec::new();
        let mut fed_by = HashSet::new();
        for conn in incoming {
            let Some(value) = self.values.get(&conn.from).and_then(SignalValue::as_scalar_opt) else {
                continue;
            };
            let from_router = graph
                .node(&conn.from)
                .is_some_and(|p| p.kind == NodeKind::Router);
            if from_router && self.branches.get(&conn.from) != Some(&conn.from_port) {
                continue;
            }
            if !conn.passes(value) {
                continue;
            }
            fed_by.insert(&conn.from);
            inputs.push(value);
        }

        for parent in graph.branch_parents(&node.id) {
            if fed_by.contains(&parent.id) {
                continue;
            }
            let routed_here = self
                .branches
                .get(&parent.id)
                .and_then(|&b| parent.child_by_branch.get(b))
                .and_then(Option::as_ref)
                == Some(&node.id);
            if !routed_here {
                continue;
            }
            if let Some(value) = self.values.get(&parent.id).and_then(SignalValue::as_scalar_opt) {
                inputs.push(value);
            }
        }

        if let Some(values) = external.get(&node.id) {
            inputs.extend_from_slice(values);
        }
        if &node.id == self.start {
            inputs.extend_from_slice(self.initial);
        }
        inputs
    }

    fn compiled_for(&mut self, node: &Node) -> Result<Option<&CompiledExpr>, GateError> {
        let Some(source) = node.custom_function.as_deref() else {
            return Ok(None);
        };
        self.compiled
            .entry(node.id.clone())
            .or_insert_with(|| CompiledExpr::compile(source))
            .as_ref()
            .map(Some)
            .map_err(Clone::clone)
    }

    fn execute(
        &mut self,
        node: &'a Node,
        evaluators: &Evaluators<'_>,
        external: &HashMap<NodeId, Vec<Real>>,
        config: &FlowConfig,
    ) {
        let id = &node.id;
        let rerun = self.executed.contains(id);
        let inputs = self.gather_inputs(node, external);
        let outcome = match self.compiled_for(node) {
            Ok(compiled) => eval::evaluate(node, &inputs, compiled, evaluators),
            Err(e) => Err(NodeError::from(e)),
        };

        self.stalled = 0;
        self.report.iterations += 1;
        let iteration = self.report.iterations;

        let (value, error) = match outcome {
            Ok(value) => (value, None),
            Err(e) => {
                warn!(node = %id, error = %e, "node evaluation failed, substituting 0");
                self.report.errors.push(NodeFailure {
                    node: id.clone(),
                    iteration,
                    message: e.to_string(),
                });
                (0.0, Some(e.to_string()))
            }
        };
        let branch = eval::branch_index(node, value);
        let output = SignalValue::Scalar(value);
        debug!(node = %id, kind = %node.kind, iteration, value, branch, rerun, "node evaluated");

        if node.kind == NodeKind::Router {
            let lanes = node.branch_count().max(node.child_by_branch.len());
            let outputs = (0..lanes)
                .map(|lane| if lane == branch { output } else { SignalValue::NoSignal })
                .collect();
            self.report.branch_outputs.insert(id.clone(), outputs);
        }

        self.values.insert(id.clone(), output);
        self.branches.insert(id.clone(), branch);
        self.executed.insert(id.clone());
        self.history.push_back(id.clone());
        while self.history.len() > config.loop_detection_window {
            self.history.pop_front();
        }
        self.report.path.push(id.clone());
        self.report.final_values.insert(id.clone(), output);
        self.report.results.push(StepRecord {
            iteration,
            node: id.clone(),
            kind: node.kind,
            inputs,
            output,
            branch,
            error,
        });

        if node.kind == NodeKind::Terminal {
            return;
        }
        let (forward, backward) = self.successors(node, branch, value);
        for next in forward {
            if rerun || !self.executed.contains(&next) {
                self.enqueue(next);
            }
        }
        for next in backward {
            self.enqueue(next);
        }
    }

    /// `(forward, backward)` successors for the chosen branch.
    fn successors(&self, node: &Node, branch: usize, value: Real) -> (Vec<NodeId>, Vec<NodeId>) {
        let mut forward = Vec::new();
        let mut backward = Vec::new();

        let routed_child = node.child_by_branch.get(branch).cloned().flatten();
        let is_router = node.kind == NodeKind::Router;
        for conn in self.graph.outgoing(&node.id) {
            if (is_router && conn.from_port != branch) || !conn.passes(value) {
                continue;
            }
            match conn.kind {
                ConnectionType::Feedback => backward.push(conn.to.clone()),
                _ if routed_child.is_some() => {}
                ConnectionType::Normal | ConnectionType::Bypass => forward.push(conn.to.clone()),
                ConnectionType::Conditional if conn.from_port == branch => {
                    forward.push(conn.to.clone())
                }
                ConnectionType::Conditional => {}
            }
        }
        if let Some(child) = routed_child {
            forward.push(child);
        }
        if let Some(target) = node.skip_target() {
            forward.push(target.clone());
        }
        if let Some(target) = node.backward_target() {
            backward.push(target.clone());
        }
        (forward, backward)
    }
}
