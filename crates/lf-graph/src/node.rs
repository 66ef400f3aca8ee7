//! Node model: kinds, ports, parameters and successor routing.

use std::collections::HashSet;
use std::fmt;

use lf_core::{NodeId, Real, ValidationError};
use lf_gates::{CompiledExpr, GateOp, GateParams, MAX_TRUTH_VALUE, TruthTable};
use serde::{Deserialize, Serialize};

/// Node kinds; each selects an evaluation strategy in the flow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    LogicGate,
    FuzzyGate,
    Threshold,
    MultiValued,
    Router,
    Merge,
    Process,
    Decision,
    Terminal,
}

impl NodeKind {
    pub const ALL: [NodeKind; 9] = [
        Self::LogicGate,
        Self::FuzzyGate,
        Self::Threshold,
        Self::MultiValued,
        Self::Router,
        Self::Merge,
        Self::Process,
        Self::Decision,
        Self::Terminal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::LogicGate => "logic_gate",
            Self::FuzzyGate => "fuzzy_gate",
            Self::Threshold => "threshold",
            Self::MultiValued => "multi_valued",
            Self::Router => "router",
            Self::Merge => "merge",
            Self::Process => "process",
            Self::Decision => "decision",
            Self::Terminal => "terminal",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// One input or output position on a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDescriptor {
    pub id: String,
    pub index: usize,
}

impl PortDescriptor {
    pub fn new(id: impl Into<String>, index: usize) -> Self {
        Self {
            id: id.into(),
            index,
        }
    }
}

/// How `loop_target` is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionMode {
    #[default]
    Forward,
    /// Feedback edge to an earlier node; always re-enqueued.
    Backward,
    /// Jump ahead, bypassing intermediate nodes.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    And,
    Or,
    Sum,
    #[default]
    Average,
    Max,
    Min,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcessTransform {
    Multiply {
        factor: Real,
    },
    Add {
        offset: Real,
    },
    Modulo {
        divisor: Real,
    },
    Clamp {
        min: Real,
        max: Real,
    },
    #[default]
    Passthrough,
}

/// Named configuration. Only the fields relevant to the node's kind are read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lambda: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<Real>>,
    /// Membership at or above which a fuzzy gate takes branch 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzzy_threshold: Option<Real>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_strategy: Option<MergeStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<ProcessTransform>,
}

pub const DEFAULT_FUZZY_THRESHOLD: Real = 0.5;
pub const DEFAULT_OUTPUT_COUNT: usize = 2;
/// Widest router a document may declare.
pub const MAX_OUTPUT_COUNT: usize = 256;

impl NodeParameters {
    pub fn gate_params(&self) -> GateParams {
        GateParams {
            k: self.k,
            max_value: self.max_value,
        }
    }

    pub fn fuzzy_threshold(&self) -> Real {
        self.fuzzy_threshold.unwrap_or(DEFAULT_FUZZY_THRESHOLD)
    }

    /// Declared router width, capped at [`MAX_OUTPUT_COUNT`].
    pub fn output_count(&self) -> usize {
        self.output_count
            .unwrap_or(DEFAULT_OUTPUT_COUNT)
            .min(MAX_OUTPUT_COUNT)
    }

    pub fn merge_strategy(&self) -> MergeStrategy {
        self.merge_strategy.unwrap_or_default()
    }

    pub fn transform(&self) -> ProcessTransform {
        self.transform.unwrap_or_default()
    }

    fn validate_into(&self, err: &mut ValidationError, node: &NodeId) {
        let finite_or_absent = |v: Option<Real>| v.is_none_or(Real::is_finite);
        if let Some(t) = self.fuzzy_threshold {
            err.check((0.0..=1.0).contains(&t), || {
                format!("node '{node}': fuzzyThreshold must lie in [0, 1], got {t}")
            });
        }
        if let Some(count) = self.output_count {
            err.check((1..=MAX_OUTPUT_COUNT).contains(&count), || {
                format!("node '{node}': outputCount must lie in [1, {MAX_OUTPUT_COUNT}], got {count}")
            });
        }
        if let Some(max) = self.max_value {
            err.check((1.0..=MAX_TRUTH_VALUE).contains(&max), || {
                format!("node '{node}': maxValue must lie in [1, {MAX_TRUTH_VALUE}], got {max}")
            });
        }
        err.check(
            finite_or_absent(self.gamma) && self.gamma.is_none_or(|g| g >= 0.0),
            || format!("node '{node}': gamma must be non-negative"),
        );
        err.check(
            finite_or_absent(self.lambda) && self.lambda.is_none_or(|l| l > -1.0),
            || format!("node '{node}': lambda must be greater than -1"),
        );
        err.check(
            finite_or_absent(self.w) && self.w.is_none_or(|w| w > 0.0),
            || format!("node '{node}': w must be positive"),
        );
        if let Some(weights) = &self.weights {
            err.check(weights.iter().all(|w| w.is_finite() && *w >= 0.0), || {
                format!("node '{node}': weights must be finite and non-negative")
            });
        }
        match self.transform {
            Some(ProcessTransform::Clamp { min, max }) => {
                err.check(min <= max, || {
                    format!("node '{node}': clamp requires min <= max ({min} > {max})")
                });
            }
            Some(ProcessTransform::Modulo { divisor }) => {
                err.check(divisor.is_finite() && divisor != 0.0, || {
                    format!("node '{node}': modulo divisor must be finite and non-zero")
                });
            }
            Some(ProcessTransform::Multiply { factor: v } | ProcessTransform::Add { offset: v }) => {
                err.check(v.is_finite(), || {
                    format!("node '{node}': transform operand must be finite")
                });
            }
            Some(ProcessTransform::Passthrough) | None => {}
        }
    }
}

/// A unit of computation in the logic graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub input_ports: Vec<PortDescriptor>,
    #[serde(default)]
    pub output_ports: Vec<PortDescriptor>,
    #[serde(default)]
    pub parameters: NodeParameters,
    /// Overrides `operator` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truth_table: Option<TruthTable>,
    /// Sandboxed expression; overrides both `truth_table` and `operator`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_function: Option<String>,
    /// Successor per branch index; `None` leaves the branch unwired.
    #[serde(default)]
    pub child_by_branch: Vec<Option<NodeId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_mode: Option<ConnectionMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_target: Option<NodeId>,
}

fn ports(prefix: &str, count: usize) -> Vec<PortDescriptor> {
    (0..count)
        .map(|i| PortDescriptor::new(format!("{prefix}{i}"), i))
        .collect()
}

impl Node {
    pub fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            operator: String::new(),
            input_ports: Vec::new(),
            output_ports: Vec::new(),
            parameters: NodeParameters::default(),
            truth_table: None,
            custom_function: None,
            child_by_branch: Vec::new(),
            connection_mode: None,
            loop_target: None,
        }
    }

    pub fn gate(id: impl Into<NodeId>, operator: impl Into<String>) -> Self {
        Self::new(id, NodeKind::LogicGate).with_operator(operator)
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = operator.into();
        self
    }

    /// Declare `inputs` / `outputs` ports named `in0…` / `out0…`.
    pub fn with_ports(mut self, inputs: usize, outputs: usize) -> Self {
        self.input_ports = ports("in", inputs);
        self.output_ports = ports("out", outputs);
        self
    }

    pub fn with_parameters(mut self, parameters: NodeParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_truth_table(mut self, table: TruthTable) -> Self {
        self.truth_table = Some(table);
        self
    }

    pub fn with_custom_function(mut self, source: impl Into<String>) -> Self {
        self.custom_function = Some(source.into());
        self
    }

    pub fn with_children<I, T>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = Option<T>>,
        T: Into<NodeId>,
    {
        self.child_by_branch = children.into_iter().map(|c| c.map(Into::into)).collect();
        self
    }

    pub fn with_loop(mut self, target: impl Into<NodeId>, mode: ConnectionMode) -> Self {
        self.loop_target = Some(target.into());
        self.connection_mode = Some(mode);
        self
    }

    pub fn connection_mode(&self) -> ConnectionMode {
        self.connection_mode.unwrap_or_default()
    }

    /// `loop_target` when wired as a feedback edge.
    pub fn backward_target(&self) -> Option<&NodeId> {
        self.loop_target
            .as_ref()
            .filter(|_| self.connection_mode() == ConnectionMode::Backward)
    }

    /// `loop_target` when wired as a skip edge.
    pub fn skip_target(&self) -> Option<&NodeId> {
        self.loop_target
            .as_ref()
            .filter(|_| self.connection_mode() == ConnectionMode::Skip)
    }

    pub fn children(&self) -> impl Iterator<Item = &NodeId> {
        self.child_by_branch.iter().flatten()
    }

    /// Number of distinct branch indices this node can produce.
    pub fn branch_count(&self) -> usize {
        let gate_params = self.parameters.gate_params();
        match self.kind {
            NodeKind::LogicGate => GateOp::parse(&self.operator)
                .map_or(2, |op| op.output_levels(&gate_params)),
            NodeKind::MultiValued => match GateOp::parse(&self.operator) {
                Some(op) => op.output_levels(&gate_params),
                None => gate_params.bounded_max_value_or(1.0) as usize + 1,
            },
            NodeKind::Threshold | NodeKind::FuzzyGate | NodeKind::Decision => 2,
            NodeKind::Router => self.parameters.output_count(),
            NodeKind::Merge | NodeKind::Process => 1,
            NodeKind::Terminal => 0,
        }
    }

    /// Self-contained checks; references to other nodes are checked by the graph.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut err = ValidationError::new();
        let id = &self.id;
        err.check(!id.is_blank(), || "node id must not be empty".into());

        for (side, ports) in [("input", &self.input_ports), ("output", &self.output_ports)] {
            let mut seen = HashSet::new();
            for port in ports {
                err.check(seen.insert(port.id.as_str()), || {
                    format!("node '{id}': duplicate {side} port id '{}'", port.id)
                });
            }
            err.check(ports.iter().enumerate().all(|(i, p)| p.index == i), || {
                format!("node '{id}': {side} port indices must be contiguous from 0")
            });
        }

        if !self.child_by_branch.is_empty() {
            let expected = self.branch_count();
            err.check(self.child_by_branch.len() == expected, || {
                format!(
                    "node '{id}': childByBranch has {} entries, {} kind expects {expected}",
                    self.child_by_branch.len(),
                    self.kind
                )
            });
        }

        let mode = self.connection_mode();
        err.check(mode == ConnectionMode::Forward || self.loop_target.is_some(), || {
            format!("node '{id}': {mode:?} connection mode requires a loopTarget")
        });

        self.parameters.validate_into(&mut err, id);

        if let Some(table) = &self.truth_table {
            if let Err(e) = table.validate() {
                for v in e.violations {
                    err.push(format!("node '{id}': {v}"));
                }
            }
        }
        if let Some(source) = &self.custom_function {
            if let Err(e) = CompiledExpr::compile(source) {
                err.push(format!("node '{id}': customFunction rejected: {e}"));
            }
        }
        err.into_result()
    }

    pub(crate) fn declares_inputs(&self) -> bool {
        !self.input_ports.is_empty()
    }

    pub(crate) fn declares_outputs(&self) -> bool {
        !self.output_ports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_counts_by_kind() {
        assert_eq!(Node::gate("a", "and").branch_count(), 2);
        assert_eq!(Node::gate("c", "comparator").branch_count(), 3);
        let post = Node::new("p", NodeKind::MultiValued).with_operator("post_not");
        assert_eq!(post.branch_count(), 3);
        let router = Node::new("r", NodeKind::Router).with_parameters(NodeParameters {
            output_count: Some(4),
            ..Default::default()
        });
        assert_eq!(router.branch_count(), 4);
        assert_eq!(Node::new("m", NodeKind::Merge).branch_count(), 1);
        assert_eq!(Node::new("t", NodeKind::Terminal).branch_count(), 0);
    }

    #[test]
    fn extreme_widths_are_rejected_and_bounded() {
        let wide_router = Node::new("r", NodeKind::Router).with_parameters(NodeParameters {
            output_count: Some(1_000_000_000),
            ..Default::default()
        });
        let err = wide_router.validate().unwrap_err();
        assert!(err.violations[0].contains("outputCount"), "{err}");
        assert_eq!(wide_router.branch_count(), MAX_OUTPUT_COUNT);

        for max in [1e300, 5e9, 256.0, Real::NAN] {
            let node = Node::new("m", NodeKind::MultiValued)
                .with_operator("lukasiewicz_and")
                .with_parameters(NodeParameters {
                    max_value: Some(max),
                    ..Default::default()
                });
            assert!(node.validate().is_err(), "maxValue {max} accepted");
            assert!(node.branch_count() <= MAX_TRUTH_VALUE as usize + 1);
        }

        let widest = Node::new("m", NodeKind::MultiValued).with_parameters(NodeParameters {
            max_value: Some(MAX_TRUTH_VALUE),
            ..Default::default()
        });
        assert!(widest.validate().is_ok());
        assert_eq!(widest.branch_count(), 256);
    }

    #[test]
    fn child_list_length_must_match_branches() {
        let ok = Node::gate("a", "and").with_children([Some("b"), None]);
        assert!(ok.validate().is_ok());
        let bad = Node::gate("a", "and").with_children([Some("b")]);
        let err = bad.validate().unwrap_err();
        assert!(err.violations[0].contains("childByBranch"));
    }

    #[test]
    fn collects_every_violation() {
        let node = Node::new("", NodeKind::Process)
            .with_parameters(NodeParameters {
                fuzzy_threshold: Some(1.5),
                transform: Some(ProcessTransform::Clamp { min: 2.0, max: 1.0 }),
                ..Default::default()
            })
            .with_custom_function("in0 +");
        let mut node = node;
        node.connection_mode = Some(ConnectionMode::Backward);
        let err = node.validate().unwrap_err();
        assert_eq!(err.violations.len(), 5, "{err}");
    }

    #[test]
    fn port_indices_must_be_contiguous() {
        let mut node = Node::gate("a", "and").with_ports(2, 1);
        assert!(node.validate().is_ok());
        node.input_ports[1].index = 5;
        assert!(node.validate().is_err());
    }

    #[test]
    fn loop_helpers() {
        let node = Node::gate("a", "or").with_loop("b", ConnectionMode::Backward);
        assert_eq!(node.backward_target().map(NodeId::as_str), Some("b"));
        assert!(node.skip_target().is_none());
    }

    #[test]
    fn json_field_names() {
        let node = Node::new("f", NodeKind::FuzzyGate)
            .with_operator("fuzzy_and")
            .with_parameters(NodeParameters {
                fuzzy_threshold: Some(0.7),
                ..Default::default()
            })
            .with_children([None, Some("g")]);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "fuzzy_gate");
        assert_eq!(json["parameters"]["fuzzyThreshold"], 0.7);
        assert_eq!(json["childByBranch"][1], "g");
        assert!(json["childByBranch"][0].is_null());
        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }
}
