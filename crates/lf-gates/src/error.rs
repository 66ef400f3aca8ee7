//! Error types for gate evaluation.

use thiserror::Error;

/// Result type for gate operations.
pub type GateResult<T> = Result<T, GateError>;

/// Errors raised by the strict gate catalog.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GateError {
    /// Operator is neither in the catalog nor a registered custom gate.
    #[error("Unknown gate operator: {operator}")]
    UnknownGate { operator: String },

    /// Fewer inputs than the operator needs.
    #[error("Gate {operator} needs at least {minimum} input(s), got {actual}")]
    Arity {
        operator: String,
        minimum: usize,
        actual: usize,
    },

    /// Parameter outside the range the operator accepts.
    #[error("Invalid gate parameter: {what}")]
    InvalidParameter { what: String },

    /// Custom-function expression failed to parse or evaluate.
    #[error("Expression error: {what}")]
    Expression { what: String },
}

impl GateError {
    pub(crate) fn expression(what: impl Into<String>) -> Self {
        Self::Expression { what: what.into() }
    }
}
