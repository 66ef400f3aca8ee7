//! lf-flow: signal propagation over logic graphs.
//!
//! [`SignalFlowEngine::execute_flow`] walks a [`lf_graph::Graph`] from a
//! start node with a FIFO work queue. Each dequeued node gathers the outputs
//! of its already-computed parents, is evaluated according to its kind
//! (crisp gates through [`lf_gates::GateEvaluator`], fuzzy gates through
//! [`lf_fuzzy::FuzzyGateEvaluator`], merge/process/router/decision logic
//! here) and enqueues successors chosen by its branch index.
//!
//! Runs always terminate: a global execution cap and per-node loop limits
//! bound every traversal, cyclic or not.

pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod report;

pub use cancel::CancellationToken;
pub use config::FlowConfig;
pub use engine::SignalFlowEngine;
pub use error::{FlowError, FlowResult, NodeError};
pub use report::{FlowReport, NodeFailure, StepRecord, Termination};
