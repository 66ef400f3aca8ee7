//! Invariant checks behind every graph mutation.
//!
//! Each check collects all violations so a rejected edit can be reported in
//! full. Nothing here mutates the graph.

use lf_core::{ConnectionId, ValidationError};

use crate::connection::{Connection, ConnectionType};
use crate::graph::Graph;
use crate::node::Node;

pub(crate) fn check_new_node(graph: &Graph, node: &Node) -> Result<(), ValidationError> {
    let mut err = node.validate().err().unwrap_or_default();
    err.check(!graph.contains_node(&node.id), || {
        format!("node '{}' already exists", node.id)
    });
    err.into_result()
}

/// An update must not strand an incident connection on a port that disappears.
pub(crate) fn check_node_update(graph: &Graph, node: &Node) -> Result<(), ValidationError> {
    let mut err = node.validate().err().unwrap_or_default();
    for conn in graph.outgoing(&node.id) {
        err.check(
            !node.declares_outputs() || conn.from_port < node.output_ports.len(),
            || {
                format!(
                    "connection '{}' uses output port {} which node '{}' no longer declares",
                    conn.id, conn.from_port, node.id
                )
            },
        );
    }
    for conn in graph.incoming(&node.id) {
        err.check(
            !node.declares_inputs() || conn.to_port < node.input_ports.len(),
            || {
                format!(
                    "connection '{}' uses input port {} which node '{}' no longer declares",
                    conn.id, conn.to_port, node.id
                )
            },
        );
    }
    err.into_result()
}

/// `replacing` names the connection being updated, which may keep its own id.
pub(crate) fn check_connection(
    graph: &Graph,
    conn: &Connection,
    replacing: Option<&ConnectionId>,
) -> Result<(), ValidationError> {
    let mut err = ValidationError::new();
    let id = &conn.id;
    err.check(!id.is_blank(), || "connection id must not be empty".into());
    err.check(
        replacing == Some(id) || graph.connection(id).is_none(),
        || format!("connection '{id}' already exists"),
    );

    match graph.node(&conn.from) {
        None => err.push(format!("connection '{id}': source node '{}' does not exist", conn.from)),
        Some(from) => err.check(
            !from.declares_outputs() || conn.from_port < from.output_ports.len(),
            || {
                format!(
                    "connection '{id}': node '{}' has no output port {}",
                    conn.from, conn.from_port
                )
            },
        ),
    }
    match graph.node(&conn.to) {
        None => err.push(format!("connection '{id}': target node '{}' does not exist", conn.to)),
        Some(to) => err.check(
            !to.declares_inputs() || conn.to_port < to.input_ports.len(),
            || {
                format!(
                    "connection '{id}': node '{}' has no input port {}",
                    conn.to, conn.to_port
                )
            },
        ),
    }

    err.check(conn.from != conn.to || conn.kind == ConnectionType::Feedback, || {
        format!("connection '{id}': self-connection on '{}' must be feedback", conn.from)
    });
    err.check(conn.weight.is_finite(), || {
        format!("connection '{id}': weight must be finite")
    });
    err.check(conn.threshold.is_none_or(f64::is_finite), || {
        format!("connection '{id}': threshold must be finite")
    });
    err.into_result()
}

/// Another connection with the same endpoints, ignoring `conn` itself.
pub(crate) fn find_duplicate<'g>(graph: &'g Graph, conn: &Connection) -> Option<&'g Connection> {
    graph
        .connections()
        .find(|c| c.id != conn.id && c.endpoints() == conn.endpoints())
}

/// Whole-graph audit, including handles to nodes that are not present.
pub(crate) fn check_graph(graph: &Graph) -> Result<(), ValidationError> {
    let mut err = ValidationError::new();
    for node in graph.nodes() {
        if let Err(e) = node.validate() {
            err.extend(e);
        }
        for child in node.children() {
            err.check(graph.contains_node(child), || {
                format!("node '{}': child '{child}' does not exist", node.id)
            });
        }
        if let Some(target) = &node.loop_target {
            err.check(graph.contains_node(target), || {
                format!("node '{}': loopTarget '{target}' does not exist", node.id)
            });
        }
    }
    for conn in graph.connections() {
        if let Err(e) = check_connection(graph, conn, Some(&conn.id)) {
            err.extend(e);
        }
    }
    err.into_result()
}
