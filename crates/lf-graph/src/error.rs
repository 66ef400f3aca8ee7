//! Graph error types.

use lf_core::{ConnectionId, NodeId, ValidationError};
use thiserror::Error;

pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Debug, Error)]
pub enum GraphError {
    /// Every invariant the rejected mutation would have broken.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Node not found: {id}")]
    NodeNotFound { id: NodeId },

    #[error("Connection not found: {id}")]
    ConnectionNotFound { id: ConnectionId },

    /// Input is not a graph document at all (as opposed to bad records in one).
    #[error("Invalid graph document: {what}")]
    Document { what: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphError {
    /// Violations when this is a validation failure, otherwise empty.
    pub fn violations(&self) -> &[String] {
        match self {
            Self::Validation(e) => &e.violations,
            _ => &[],
        }
    }
}
