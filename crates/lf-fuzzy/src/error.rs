//! Error types for the fuzzy engine.

use lf_core::ValidationError;
use thiserror::Error;

/// Result type for fuzzy operations.
pub type FuzzyResult<T> = Result<T, FuzzyError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FuzzyError {
    /// Malformed membership parameters, weights or inference configuration.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unknown linguistic variable: {name}")]
    UnknownVariable { name: String },

    #[error("Unknown term '{term}' for variable '{variable}'")]
    UnknownTerm { variable: String, term: String },

    #[error("Unknown fuzzy gate: {name}")]
    UnknownGate { name: String },

    #[error("No value supplied for input variable '{name}'")]
    MissingInput { name: String },
}
