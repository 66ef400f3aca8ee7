//! lf-graph: graph model for logicflow.
//!
//! Provides:
//! - Nodes, ports and connections in an id-keyed arena ([`Graph`])
//! - All-violation validation on every mutation
//! - Best-effort JSON import and lossless export
//! - Change events over `std::sync::mpsc`
//! - Cycle enumeration and topological ordering ([`CycleAnalyzer`])
//!
//! # Example
//!
//! ```
//! use lf_graph::{Connection, CycleAnalyzer, Graph, Node};
//!
//! let mut graph = Graph::new();
//! graph.add_node(Node::gate("a", "and")).unwrap();
//! graph.add_node(Node::gate("b", "not")).unwrap();
//! graph.add_connection(Connection::new("a", "b")).unwrap();
//!
//! let order = CycleAnalyzer::new(&graph).topological_sort().unwrap();
//! assert_eq!(order[0].as_str(), "a");
//! ```

pub mod connection;
pub mod cycles;
pub mod error;
pub mod event;
pub mod graph;
pub mod json;
pub mod node;
pub(crate) mod validate;

pub use connection::{Connection, ConnectionType};
pub use cycles::{Cycle, CycleAnalyzer, LoopComplexity};
pub use error::{GraphError, GraphResult};
pub use event::GraphEvent;
pub use graph::{Graph, PortDirection};
pub use json::{GraphDocument, ImportReport, RecordKind, SkippedRecord};
pub use node::{
    ConnectionMode, MAX_OUTPUT_COUNT, MergeStrategy, Node, NodeKind, NodeParameters,
    PortDescriptor, ProcessTransform,
};
