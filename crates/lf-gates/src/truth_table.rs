//! Explicit truth tables and the custom gates built from them.

use std::collections::BTreeMap;

use lf_core::{Real, ValidationError, truthy};
use serde::{Deserialize, Serialize};

/// Mapping from a binary input pattern (e.g. `"101"`) to an output.
///
/// Keys are the ordered inputs read as bits, first input first. Patterns
/// that are not listed evaluate to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TruthTable(BTreeMap<String, bool>);

impl TruthTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binary key for an input pattern.
    pub fn key_for(pattern: &[bool]) -> String {
        pattern.iter().map(|&b| if b { '1' } else { '0' }).collect()
    }

    pub fn insert(&mut self, pattern: &[bool], output: bool) {
        self.0.insert(Self::key_for(pattern), output);
    }

    pub fn with_row(mut self, pattern: &[bool], output: bool) -> Self {
        self.insert(pattern, output);
        self
    }

    pub fn lookup(&self, pattern: &[bool]) -> bool {
        self.0.get(&Self::key_for(pattern)).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Every key must be a non-empty string of `0`/`1`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut err = ValidationError::new();
        for key in self.0.keys() {
            err.check(
                !key.is_empty() && key.chars().all(|c| c == '0' || c == '1'),
                || format!("truth table key '{key}' is not a binary pattern"),
            );
        }
        err.into_result()
    }
}

impl<const N: usize> From<[(&str, bool); N]> for TruthTable {
    fn from(rows: [(&str, bool); N]) -> Self {
        Self(rows.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

/// Gate whose behavior is a lookup into a [`TruthTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomGate {
    table: TruthTable,
}

impl CustomGate {
    pub fn evaluate(&self, inputs: &[Real]) -> bool {
        let pattern: Vec<bool> = inputs.iter().map(|&v| truthy(v)).collect();
        self.table.lookup(&pattern)
    }

    pub fn table(&self) -> &TruthTable {
        &self.table
    }
}

/// Build a lookup gate; missing patterns evaluate to `false`.
pub fn create_custom_gate(table: TruthTable) -> CustomGate {
    CustomGate { table }
}

/// One row of a generated truth table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthTableRow {
    pub inputs: Vec<bool>,
    pub output: Real,
}
