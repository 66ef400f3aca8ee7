//! The graph arena: nodes and connections keyed by stable ids.

use std::collections::HashMap;
use std::sync::mpsc::Receiver;

use indexmap::IndexMap;
use lf_core::{ConnectionId, NodeId, ValidationError};
use tracing::{debug, warn};

use crate::connection::Connection;
use crate::error::{GraphError, GraphResult};
use crate::event::{EventBus, GraphEvent};
use crate::node::{Node, NodeKind};
use crate::validate;

/// Which side of a node a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    Input,
    Output,
}

type PortKey = (NodeId, PortDirection, usize);

/// Logic graph.
///
/// The single owner of nodes and connections. Nodes refer to each other only
/// through [`NodeId`] handles, and all mutation goes through methods that
/// validate first and keep the derived port counts in step. Iteration order
/// is insertion order.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: IndexMap<NodeId, Node>,
    connections: IndexMap<ConnectionId, Connection>,
    port_counts: HashMap<PortKey, usize>,
    events: EventBus,
}

impl Clone for Graph {
    /// Clones carry the topology but not the subscribers.
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            connections: self.connections.clone(),
            port_counts: self.port_counts.clone(),
            events: EventBus::default(),
        }
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive an event for every successful mutation from now on.
    pub fn subscribe(&mut self) -> Receiver<GraphEvent> {
        self.events.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }

    // ---------------------------------------------------------------- queries

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(move |n| n.kind == kind)
    }

    pub fn incoming<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.values().filter(move |c| &c.to == id)
    }

    pub fn outgoing<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.values().filter(move |c| &c.from == id)
    }

    /// Connections attached to one port of a node.
    pub fn connections_at_port<'a>(
        &'a self,
        id: &'a NodeId,
        direction: PortDirection,
        index: usize,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.values().filter(move |c| match direction {
            PortDirection::Input => &c.to == id && c.to_port == index,
            PortDirection::Output => &c.from == id && c.from_port == index,
        })
    }

    /// Derived handle count for one port, kept current by every mutation.
    pub fn port_connection_count(&self, id: &NodeId, direction: PortDirection, index: usize) -> usize {
        self.port_counts
            .get(&(id.clone(), direction, index))
            .copied()
            .unwrap_or(0)
    }

    /// Nodes that list `id` among their branch children.
    pub fn branch_parents<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes
            .values()
            .filter(move |n| n.children().any(|c| c == id))
    }

    /// Audit the whole graph, including dangling branch and loop handles.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::check_graph(self)
    }

    // -------------------------------------------------------------- mutations

    pub fn add_node(&mut self, node: Node) -> GraphResult<&Node> {
        validate::check_new_node(self, &node)?;
        let id = node.id.clone();
        let (index, _) = self.nodes.insert_full(id.clone(), node);
        debug!(node = %id, "node added");
        self.events.emit(GraphEvent::NodeAdded(id));
        Ok(&self.nodes[index])
    }

    /// Replace the node with the same id.
    pub fn update_node(&mut self, node: Node) -> GraphResult<&Node> {
        if !self.contains_node(&node.id) {
            return Err(GraphError::NodeNotFound { id: node.id });
        }
        validate::check_node_update(self, &node)?;
        let id = node.id.clone();
        let (index, _) = self.nodes.insert_full(id.clone(), node);
        self.events.emit(GraphEvent::NodeUpdated(id));
        Ok(&self.nodes[index])
    }

    /// Remove a node, its incident connections, and every handle other nodes
    /// hold to it.
    pub fn remove_node(&mut self, id: &NodeId) -> GraphResult<Node> {
        if !self.contains_node(id) {
            return Err(GraphError::NodeNotFound { id: id.clone() });
        }

        let incident: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| &c.from == id || &c.to == id)
            .map(|c| c.id.clone())
            .collect();
        for conn_id in &incident {
            self.detach(conn_id);
        }

        let node = self
            .nodes
            .shift_remove(id)
            .ok_or_else(|| GraphError::NodeNotFound { id: id.clone() })?;

        let mut touched = Vec::new();
        for other in self.nodes.values_mut() {
            let mut changed = false;
            for child in other.child_by_branch.iter_mut() {
                if child.as_ref() == Some(id) {
                    *child = None;
                    changed = true;
                }
            }
            if other.loop_target.as_ref() == Some(id) {
                other.loop_target = None;
                other.connection_mode = None;
                changed = true;
            }
            if changed {
                touched.push(other.id.clone());
            }
        }
        for other in touched {
            self.events.emit(GraphEvent::NodeUpdated(other));
        }

        debug!(node = %id, connections = incident.len(), "node removed");
        self.events.emit(GraphEvent::NodeRemoved(id.clone()));
        Ok(node)
    }

    pub fn add_connection(&mut self, conn: Connection) -> GraphResult<&Connection> {
        validate::check_connection(self, &conn, None)?;
        if let Some(existing) = validate::find_duplicate(self, &conn) {
            warn!(
                connection = %conn.id,
                existing = %existing.id,
                "duplicate connection between {}:{} and {}:{}",
                conn.from, conn.from_port, conn.to, conn.to_port
            );
        }
        self.bump_ports(&conn, true);
        let id = conn.id.clone();
        let (index, _) = self.connections.insert_full(id.clone(), conn);
        self.events.emit(GraphEvent::ConnectionAdded(id));
        Ok(&self.connections[index])
    }

    /// Replace the connection with the same id.
    pub fn update_connection(&mut self, conn: Connection) -> GraphResult<&Connection> {
        let Some(old) = self.connections.get(&conn.id).cloned() else {
            return Err(GraphError::ConnectionNotFound { id: conn.id });
        };
        validate::check_connection(self, &conn, Some(&conn.id))?;
        self.bump_ports(&old, false);
        self.bump_ports(&conn, true);
        let id = conn.id.clone();
        let (index, _) = self.connections.insert_full(id.clone(), conn);
        self.events.emit(GraphEvent::ConnectionUpdated(id));
        Ok(&self.connections[index])
    }

    pub fn remove_connection(&mut self, id: &ConnectionId) -> GraphResult<Connection> {
        self.detach(id)
            .ok_or_else(|| GraphError::ConnectionNotFound { id: id.clone() })
    }

    fn detach(&mut self, id: &ConnectionId) -> Option<Connection> {
        let conn = self.connections.shift_remove(id)?;
        self.bump_ports(&conn, false);
        self.events.emit(GraphEvent::ConnectionRemoved(id.clone()));
        Some(conn)
    }

    fn bump_ports(&mut self, conn: &Connection, attach: bool) {
        for key in [
            (conn.from.clone(), PortDirection::Output, conn.from_port),
            (conn.to.clone(), PortDirection::Input, conn.to_port),
        ] {
            if attach {
                *self.port_counts.entry(key).or_insert(0) += 1;
            } else if let Some(count) = self.port_counts.get_mut(&key) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.port_counts.remove(&key);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionType;
    use crate::node::ConnectionMode;

    fn id(s: &str) -> NodeId {
        NodeId::new(s)
    }

    fn two_gates() -> Graph {
        let mut g = Graph::new();
        g.add_node(Node::gate("a", "and").with_ports(2, 1)).unwrap();
        g.add_node(Node::gate("b", "or").with_ports(2, 1)).unwrap();
        g
    }

    #[test]
    fn duplicate_node_rejected_without_change() {
        let mut g = two_gates();
        let err = g.add_node(Node::gate("a", "xor")).unwrap_err();
        assert!(err.violations()[0].contains("already exists"));
        assert_eq!(g.node(&id("a")).unwrap().operator, "and");
    }

    #[test]
    fn connection_validation_lists_all_problems() {
        let mut g = two_gates();
        let bad = Connection::new("a", "missing").ports(3, 0).with_weight(f64::NAN);
        let err = g.add_connection(bad).unwrap_err();
        assert_eq!(err.violations().len(), 3, "{err}");
        assert_eq!(g.connection_count(), 0);
    }

    #[test]
    fn self_edges_must_be_feedback() {
        let mut g = two_gates();
        assert!(g.add_connection(Connection::new("a", "a")).is_err());
        g.add_connection(Connection::new("a", "a").with_type(ConnectionType::Feedback))
            .unwrap();
    }

    #[test]
    fn duplicate_connection_is_only_a_warning() {
        let mut g = two_gates();
        g.add_connection(Connection::new("a", "b")).unwrap();
        g.add_connection(Connection::new("a", "b")).unwrap();
        assert_eq!(g.connection_count(), 2);
        assert_eq!(g.port_connection_count(&id("b"), PortDirection::Input, 0), 2);
    }

    #[test]
    fn port_counts_follow_mutations() {
        let mut g = two_gates();
        let c = g
            .add_connection(Connection::new("a", "b").with_id("c1").ports(0, 1))
            .unwrap()
            .clone();
        assert_eq!(g.port_connection_count(&id("a"), PortDirection::Output, 0), 1);
        assert_eq!(g.port_connection_count(&id("b"), PortDirection::Input, 1), 1);

        g.update_connection(c.ports(0, 0)).unwrap();
        assert_eq!(g.port_connection_count(&id("b"), PortDirection::Input, 1), 0);
        assert_eq!(g.port_connection_count(&id("b"), PortDirection::Input, 0), 1);
        assert_eq!(g.connections_at_port(&id("b"), PortDirection::Input, 0).count(), 1);

        g.remove_connection(&ConnectionId::new("c1")).unwrap();
        assert_eq!(g.port_connection_count(&id("a"), PortDirection::Output, 0), 0);
    }

    #[test]
    fn remove_node_cascades() {
        let mut g = two_gates();
        g.add_node(
            Node::gate("c", "not")
                .with_children([Some("a"), Some("b")])
                .with_loop("a", ConnectionMode::Backward),
        )
        .unwrap();
        g.add_connection(Connection::new("a", "b")).unwrap();
        g.add_connection(Connection::new("b", "c")).unwrap();

        let removed = g.remove_node(&id("a")).unwrap();
        assert_eq!(removed.id, id("a"));
        assert_eq!(g.connection_count(), 1);
        let c = g.node(&id("c")).unwrap();
        assert_eq!(c.child_by_branch, vec![None, Some(id("b"))]);
        assert!(c.loop_target.is_none());
        assert!(g.validate().is_ok());
        assert!(matches!(
            g.remove_node(&id("a")),
            Err(GraphError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn update_cannot_strand_a_connection() {
        let mut g = two_gates();
        g.add_connection(Connection::new("a", "b").ports(0, 1)).unwrap();
        let shrunk = Node::gate("b", "or").with_ports(1, 1);
        let err = g.update_node(shrunk).unwrap_err();
        assert!(err.violations()[0].contains("input port 1"));
        let renamed = Node::gate("b", "nor").with_ports(2, 1);
        assert_eq!(g.update_node(renamed).unwrap().operator, "nor");
    }

    #[test]
    fn queries() {
        let mut g = two_gates();
        g.add_node(Node::new("t", NodeKind::Terminal)).unwrap();
        g.add_connection(Connection::new("a", "b")).unwrap();
        g.add_connection(Connection::new("b", "t")).unwrap();
        assert_eq!(g.nodes_of_kind(NodeKind::LogicGate).count(), 2);
        assert_eq!(g.incoming(&id("b")).count(), 1);
        assert_eq!(g.outgoing(&id("b")).next().unwrap().to, id("t"));
        let ids: Vec<_> = g.node_ids().map(NodeId::as_str).collect();
        assert_eq!(ids, vec!["a", "b", "t"]);
    }

    #[test]
    fn subscribers_see_mutations() {
        let mut g = Graph::new();
        let rx = g.subscribe();
        g.add_node(Node::gate("a", "and")).unwrap();
        g.add_node(Node::gate("b", "and")).unwrap();
        let c = g.add_connection(Connection::new("a", "b").with_id("c")).unwrap().id.clone();
        g.remove_node(&id("b")).unwrap();
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                GraphEvent::NodeAdded(id("a")),
                GraphEvent::NodeAdded(id("b")),
                GraphEvent::ConnectionAdded(c.clone()),
                GraphEvent::ConnectionRemoved(c),
                GraphEvent::NodeRemoved(id("b")),
            ]
        );
        drop(rx);
        g.add_node(Node::gate("z", "and")).unwrap();
        assert_eq!(g.subscriber_count(), 0);
    }

    #[test]
    fn rejected_mutations_emit_nothing() {
        let mut g = Graph::new();
        let rx = g.subscribe();
        assert!(g.add_connection(Connection::new("x", "y")).is_err());
        assert!(rx.try_recv().is_err());
    }
}
