//! Per-node evaluation: kind dispatch, merge folds, process transforms and
//! branch selection.

use lf_core::{Real, ensure_finite, from_bool, truthy};
use lf_fuzzy::{FuzzyGateEvaluator, FuzzyGateParams};
use lf_gates::{CompiledExpr, GateEvaluator};
use lf_graph::{MergeStrategy, Node, NodeKind, NodeParameters, ProcessTransform};

use crate::error::NodeError;

/// Collaborators a node may dispatch to.
pub(crate) struct Evaluators<'a> {
    pub gates: &'a GateEvaluator,
    pub fuzzy: &'a FuzzyGateEvaluator,
}

fn fuzzy_params(params: &NodeParameters) -> FuzzyGateParams {
    FuzzyGateParams {
        gamma: params.gamma,
        lambda: params.lambda,
        w: params.w,
        weights: params.weights.clone(),
    }
}

fn first(inputs: &[Real]) -> Real {
    inputs.first().copied().unwrap_or(0.0)
}

pub fn merge(strategy: MergeStrategy, values: &[Real]) -> Real {
    if values.is_empty() {
        return 0.0;
    }
    match strategy {
        MergeStrategy::And => from_bool(values.iter().all(|&v| truthy(v))),
        MergeStrategy::Or => from_bool(values.iter().any(|&v| truthy(v))),
        MergeStrategy::Sum => values.iter().sum(),
        MergeStrategy::Average => values.iter().sum::<Real>() / values.len() as Real,
        MergeStrategy::Max => values.iter().copied().fold(Real::NEG_INFINITY, Real::max),
        MergeStrategy::Min => values.iter().copied().fold(Real::INFINITY, Real::min),
    }
}

pub fn transform(transform: ProcessTransform, value: Real) -> Real {
    match transform {
        ProcessTransform::Multiply { factor } => value * factor,
        ProcessTransform::Add { offset } => value + offset,
        ProcessTransform::Modulo { divisor } => value % divisor,
        ProcessTransform::Clamp { min, max } => value.max(min).min(max),
        ProcessTransform::Passthrough => value,
    }
}

/// Compute a node's output from its gathered inputs.
///
/// For gate-like kinds and decisions a custom function wins over a truth
/// table, which wins over the operator.
pub(crate) fn evaluate(
    node: &Node,
    inputs: &[Real],
    compiled: Option<&CompiledExpr>,
    evaluators: &Evaluators<'_>,
) -> Result<Real, NodeError> {
    let overridable = matches!(
        node.kind,
        NodeKind::LogicGate
            | NodeKind::FuzzyGate
            | NodeKind::Threshold
            | NodeKind::MultiValued
            | NodeKind::Decision
            | NodeKind::Router
    );
    if overridable {
        if let Some(expr) = compiled {
            return finite(expr.evaluate(inputs)?);
        }
        if let Some(table) = &node.truth_table {
            let pattern: Vec<bool> = inputs.iter().map(|&v| truthy(v)).collect();
            return Ok(from_bool(table.lookup(&pattern)));
        }
    }

    let value = match node.kind {
        NodeKind::LogicGate | NodeKind::Threshold | NodeKind::MultiValued => {
            let params = node.parameters.gate_params();
            evaluators.gates.evaluate(&node.operator, inputs, &params)?
        }
        NodeKind::FuzzyGate => {
            evaluators
                .fuzzy
                .evaluate(&node.operator, inputs, &fuzzy_params(&node.parameters))
        }
        NodeKind::Decision | NodeKind::Router if !node.operator.is_empty() => {
            let params = node.parameters.gate_params();
            evaluators.gates.evaluate(&node.operator, inputs, &params)?
        }
        NodeKind::Decision => from_bool(truthy(first(inputs))),
        NodeKind::Router | NodeKind::Terminal => first(inputs),
        NodeKind::Merge => merge(node.parameters.merge_strategy(), inputs),
        NodeKind::Process => transform(node.parameters.transform(), first(inputs)),
    };
    finite(value)
}

fn finite(value: Real) -> Result<Real, NodeError> {
    Ok(ensure_finite(value, "node output")?)
}

/// Branch index selected by `value`, clamped to the node's successor list.
pub fn branch_index(node: &Node, value: Real) -> usize {
    let raw = match node.kind {
        NodeKind::FuzzyGate => usize::from(value >= node.parameters.fuzzy_threshold()),
        NodeKind::Decision => usize::from(truthy(value)),
        NodeKind::Router => {
            let count = node.parameters.output_count().max(1) as Real;
            if value.is_finite() {
                value.floor().rem_euclid(count) as usize
            } else {
                0
            }
        }
        _ if value.is_finite() && value > 0.0 => value.round() as usize,
        _ => 0,
    };
    let slots = node.branch_count().max(node.child_by_branch.len());
    raw.min(slots.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_gates::{GateError, TruthTable};

    fn run(node: &Node, inputs: &[Real]) -> Result<Real, NodeError> {
        let gates = GateEvaluator::new();
        let fuzzy = FuzzyGateEvaluator::new();
        let compiled = node
            .custom_function
            .as_deref()
            .map(|src| CompiledExpr::compile(src).unwrap());
        evaluate(
            node,
            inputs,
            compiled.as_ref(),
            &Evaluators {
                gates: &gates,
                fuzzy: &fuzzy,
            },
        )
    }

    fn with(kind: NodeKind, params: NodeParameters) -> Node {
        Node::new("n", kind).with_parameters(params)
    }

    #[test]
    fn merge_strategies() {
        let v = [1.0, 0.0, 3.0];
        assert_eq!(merge(MergeStrategy::And, &v), 0.0);
        assert_eq!(merge(MergeStrategy::Or, &v), 1.0);
        assert_eq!(merge(MergeStrategy::Sum, &v), 4.0);
        assert!((merge(MergeStrategy::Average, &v) - 4.0 / 3.0).abs() < 1e-12);
        assert_eq!(merge(MergeStrategy::Max, &v), 3.0);
        assert_eq!(merge(MergeStrategy::Min, &v), 0.0);
        assert_eq!(merge(MergeStrategy::Max, &[]), 0.0);
    }

    #[test]
    fn transforms() {
        assert_eq!(transform(ProcessTransform::Multiply { factor: 3.0 }, 2.0), 6.0);
        assert_eq!(transform(ProcessTransform::Add { offset: -1.0 }, 2.0), 1.0);
        assert_eq!(transform(ProcessTransform::Modulo { divisor: 4.0 }, 10.0), 2.0);
        assert_eq!(transform(ProcessTransform::Clamp { min: 0.0, max: 1.0 }, 7.0), 1.0);
        assert_eq!(transform(ProcessTransform::Passthrough, 7.0), 7.0);
    }

    #[test]
    fn precedence_custom_then_table_then_operator() {
        let base = Node::gate("n", "and");
        assert_eq!(run(&base, &[1.0, 0.0]).unwrap(), 0.0);

        let tabled = base.clone().with_truth_table(TruthTable::from([("10", true)]));
        assert_eq!(run(&tabled, &[1.0, 0.0]).unwrap(), 1.0);

        let custom = tabled.with_custom_function("in0 * 10 + in1");
        assert_eq!(run(&custom, &[1.0, 0.0]).unwrap(), 10.0);
    }

    #[test]
    fn unknown_operator_is_an_error() {
        let err = run(&Node::gate("n", "teleport"), &[1.0]).unwrap_err();
        assert!(matches!(err, NodeError::Gate(GateError::UnknownGate { .. })));
    }

    #[test]
    fn fuzzy_gate_is_permissive() {
        let node = Node::new("f", NodeKind::FuzzyGate).with_operator("fuzzy_mystery");
        assert_eq!(run(&node, &[0.3, 0.9]).unwrap(), 0.3);
    }

    #[test]
    fn decision_without_operator_reads_truthiness() {
        let node = Node::new("d", NodeKind::Decision);
        assert_eq!(run(&node, &[0.2]).unwrap(), 1.0);
        assert_eq!(run(&node, &[]).unwrap(), 0.0);
    }

    #[test]
    fn non_finite_results_are_errors() {
        let node = Node::gate("n", "and").with_custom_function("sqrt(in0 - 10)");
        assert!(run(&node, &[1.0]).is_err());
    }

    #[test]
    fn branch_selection() {
        let fuzzy = with(
            NodeKind::FuzzyGate,
            NodeParameters {
                fuzzy_threshold: Some(0.7),
                ..Default::default()
            },
        );
        assert_eq!(branch_index(&fuzzy, 0.69), 0);
        assert_eq!(branch_index(&fuzzy, 0.7), 1);

        let router = with(
            NodeKind::Router,
            NodeParameters {
                output_count: Some(3),
                ..Default::default()
            },
        );
        assert_eq!(branch_index(&router, 4.9), 1);
        assert_eq!(branch_index(&router, -1.0), 2);

        let comparator = Node::gate("c", "comparator");
        assert_eq!(branch_index(&comparator, 2.0), 2);
        assert_eq!(branch_index(&Node::gate("g", "and"), 7.0), 1);
        assert_eq!(branch_index(&Node::gate("g", "and"), Real::NAN), 0);
        assert_eq!(branch_index(&Node::new("t", NodeKind::Terminal), 3.0), 0);
    }
}
