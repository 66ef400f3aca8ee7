//! Strict gate evaluation entry point.

use std::collections::BTreeMap;

use lf_core::{Real, from_bool, truthy};
use serde::{Deserialize, Serialize};

use crate::error::{GateError, GateResult};
use crate::op::{GateFamily, GateOp};
use crate::truth_table::{CustomGate, TruthTable, TruthTableRow, create_custom_gate};

/// Largest input count accepted by [`GateEvaluator::generate_truth_table`].
pub const MAX_TRUTH_TABLE_INPUTS: usize = 16;

/// Largest `maxValue` a multi-valued operator accepts (256 truth levels).
pub const MAX_TRUTH_VALUE: Real = 255.0;

/// Numeric configuration read by parameterized operators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateParams {
    /// Count for THRESHOLD / EXACTLY / AT_MOST (default 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<u32>,
    /// Highest truth value for multi-valued operators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Real>,
}

impl GateParams {
    pub fn with_k(k: u32) -> Self {
        Self {
            k: Some(k),
            ..Self::default()
        }
    }

    pub fn with_max_value(max_value: Real) -> Self {
        Self {
            max_value: Some(max_value),
            ..Self::default()
        }
    }

    pub fn k_or_default(&self) -> u32 {
        self.k.unwrap_or(1)
    }

    pub fn max_value_or(&self, default: Real) -> Real {
        self.max_value.unwrap_or(default)
    }

    /// `max_value_or` forced into `[1, MAX_TRUTH_VALUE]`, for level counts.
    pub fn bounded_max_value_or(&self, default: Real) -> Real {
        let max = self.max_value_or(default);
        if max.is_nan() { default } else { max.clamp(1.0, MAX_TRUTH_VALUE) }
    }
}

/// Evaluates catalog operators and registered truth-table gates.
///
/// The catalog itself is stateless; the evaluator only owns the registry of
/// named custom gates, which are consulted before an operator is rejected.
#[derive(Debug, Clone, Default)]
pub struct GateEvaluator {
    custom: BTreeMap<String, CustomGate>,
}

impl GateEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `name` evaluate through `table`. Catalog names cannot be shadowed.
    pub fn register_truth_table(
        &mut self,
        name: impl Into<String>,
        table: TruthTable,
    ) -> GateResult<()> {
        let name = name.into();
        if GateOp::parse(&name).is_some() {
            return Err(GateError::InvalidParameter {
                what: format!("'{name}' is a built-in operator"),
            });
        }
        table.validate().map_err(|err| GateError::InvalidParameter {
            what: err.to_string(),
        })?;
        tracing::debug!(gate = %name, rows = table.len(), "registered truth-table gate");
        self.custom.insert(name, create_custom_gate(table));
        Ok(())
    }

    /// True when `operator` is a catalog operator or a registered gate.
    pub fn is_known(&self, operator: &str) -> bool {
        GateOp::parse(operator).is_some() || self.custom.contains_key(operator)
    }

    /// Evaluate `operator` by name.
    pub fn evaluate(&self, operator: &str, inputs: &[Real], params: &GateParams) -> GateResult<Real> {
        if let Some(op) = GateOp::parse(operator) {
            return self.evaluate_op(op, inputs, params);
        }
        match self.custom.get(operator) {
            Some(gate) => Ok(from_bool(gate.evaluate(inputs))),
            None => Err(GateError::UnknownGate {
                operator: operator.to_string(),
            }),
        }
    }

    pub fn evaluate_op(&self, op: GateOp, inputs: &[Real], params: &GateParams) -> GateResult<Real> {
        if inputs.len() < op.min_arity() {
            return Err(GateError::Arity {
                operator: op.name().to_string(),
                minimum: op.min_arity(),
                actual: inputs.len(),
            });
        }
        match params.max_value {
            Some(max)
                if op.family() == GateFamily::MultiValued
                    && !(1.0..=MAX_TRUTH_VALUE).contains(&max) =>
            {
                return Err(GateError::InvalidParameter {
                    what: format!(
                        "{}: maxValue must lie in [1, {MAX_TRUTH_VALUE}], got {max}",
                        op.name()
                    ),
                });
            }
            _ => {}
        }
        Ok((op.kernel())(inputs, params))
    }

    /// Boolean convenience wrapper: inputs as bools, result read as truthy.
    pub fn evaluate_bools(
        &self,
        operator: &str,
        inputs: &[bool],
        params: &GateParams,
    ) -> GateResult<bool> {
        let values: Vec<Real> = inputs.iter().map(|&b| from_bool(b)).collect();
        self.evaluate(operator, &values, params).map(truthy)
    }

    /// Enumerate all `2^input_count` boolean patterns, first input as the
    /// most significant bit.
    pub fn generate_truth_table(
        &self,
        operator: &str,
        input_count: usize,
        params: &GateParams,
    ) -> GateResult<Vec<TruthTableRow>> {
        if input_count > MAX_TRUTH_TABLE_INPUTS {
            return Err(GateError::InvalidParameter {
                what: format!(
                    "truth table with {input_count} inputs exceeds {MAX_TRUTH_TABLE_INPUTS}"
                ),
            });
        }

        (0..1_usize << input_count)
            .map(|row| {
                let inputs: Vec<bool> = (0..input_count)
                    .map(|bit| row & (1 << (input_count - 1 - bit)) != 0)
                    .collect();
                let values: Vec<Real> = inputs.iter().map(|&b| from_bool(b)).collect();
                let output = self.evaluate(operator, &values, params)?;
                Ok(TruthTableRow { inputs, output })
            })
            .collect()
    }
}
