//! lf-core: stable foundation for logicflow.
//!
//! Contains:
//! - ids (stable string handles for nodes and connections)
//! - numeric (Real + tolerances + truthiness helpers)
//! - signal (values carried between nodes)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod signal;

// Re-exports: nice ergonomics for downstream crates
pub use error::{LfError, LfResult, ValidationError};
pub use ids::*;
pub use numeric::*;
pub use signal::SignalValue;
