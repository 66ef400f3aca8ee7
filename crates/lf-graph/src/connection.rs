//! Directed edges between node ports.

use lf_core::{ConnectionId, NodeId, Real};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    #[default]
    Normal,
    /// Fires only when the source's branch index equals `from_port`.
    Conditional,
    /// May close a cycle, including onto its own source node.
    Feedback,
    Bypass,
}

fn default_weight() -> Real {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(default = "ConnectionId::generate")]
    pub id: ConnectionId,
    pub from: NodeId,
    #[serde(default)]
    pub from_port: usize,
    pub to: NodeId,
    #[serde(default)]
    pub to_port: usize,
    /// Carried for editors; not applied to signal values.
    #[serde(default = "default_weight")]
    pub weight: Real,
    /// Values below this are not delivered to `to`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<Real>,
    #[serde(default, rename = "type")]
    pub kind: ConnectionType,
}

impl Connection {
    /// Normal edge from output port 0 to input port 0 with a fresh id.
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            id: ConnectionId::generate(),
            from: from.into(),
            from_port: 0,
            to: to.into(),
            to_port: 0,
            weight: default_weight(),
            threshold: None,
            kind: ConnectionType::Normal,
        }
    }

    pub fn with_id(mut self, id: impl Into<ConnectionId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn ports(mut self, from_port: usize, to_port: usize) -> Self {
        self.from_port = from_port;
        self.to_port = to_port;
        self
    }

    pub fn with_type(mut self, kind: ConnectionType) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_weight(mut self, weight: Real) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_threshold(mut self, threshold: Real) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn is_feedback(&self) -> bool {
        self.kind == ConnectionType::Feedback
    }

    /// `(from, from_port, to, to_port)`; two connections sharing it are duplicates.
    pub fn endpoints(&self) -> (&NodeId, usize, &NodeId, usize) {
        (&self.from, self.from_port, &self.to, self.to_port)
    }

    /// Whether `value` passes this connection's threshold, if any.
    pub fn passes(&self, value: Real) -> bool {
        self.threshold.is_none_or(|t| value >= t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_from_minimal_json() {
        let c: Connection = serde_json::from_str(r#"{"from":"a","to":"b"}"#).unwrap();
        assert!(!c.id.is_blank());
        assert_eq!(c.weight, 1.0);
        assert_eq!(c.kind, ConnectionType::Normal);
        assert_eq!((c.from_port, c.to_port), (0, 0));
    }

    #[test]
    fn type_field_is_named_type() {
        let c = Connection::new("a", "b")
            .with_id("c1")
            .with_type(ConnectionType::Feedback);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["type"], "feedback");
        assert_eq!(json["fromPort"], 0);
    }

    #[test]
    fn threshold_gate() {
        let c = Connection::new("a", "b").with_threshold(0.5);
        assert!(c.passes(0.5));
        assert!(!c.passes(0.49));
        assert!(Connection::new("a", "b").passes(-10.0));
    }
}
