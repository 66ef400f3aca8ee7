//! Error types for the flow engine.

use lf_core::{LfError, NodeId, ValidationError};
use lf_gates::GateError;
use thiserror::Error;

pub type FlowResult<T> = Result<T, FlowError>;

/// Failures that stop a run before it starts.
///
/// Problems met while traversing are recorded in the
/// [`FlowReport`](crate::FlowReport) instead.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Start node not found: {id}")]
    UnknownStartNode { id: NodeId },

    #[error("Invalid flow configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a single node could not be evaluated.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NodeError {
    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Numeric(#[from] LfError),
}
