//! Graph document import/export.
//!
//! Export is lossless. Import is best-effort: a record that fails to parse
//! or validate is skipped and listed in the [`ImportReport`], and the rest of
//! the document still loads. Nodes are imported before connections so edge
//! order in the document does not matter.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::connection::Connection;
use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use crate::node::Node;

/// Serialized graph shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Node,
    Connection,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => f.write_str("node"),
            Self::Connection => f.write_str("connection"),
        }
    }
}

/// A record left out of an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub kind: RecordKind,
    /// Position within its array in the document.
    pub index: usize,
    pub id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub nodes_imported: usize,
    pub connections_imported: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

impl Graph {
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            nodes: self.nodes().cloned().collect(),
            connections: self.connections().cloned().collect(),
        }
    }

    pub fn to_json(&self) -> GraphResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Load every valid record from a graph document.
    ///
    /// Fails only when the text is not JSON or not an object.
    pub fn from_json(text: &str) -> GraphResult<(Graph, ImportReport)> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> GraphResult<(Graph, ImportReport)> {
        let Value::Object(mut doc) = value else {
            return Err(GraphError::Document {
                what: "top level must be an object".into(),
            });
        };
        let mut graph = Graph::new();
        let mut report = ImportReport::default();

        for (index, record) in records(doc.remove("nodes"), RecordKind::Node, &mut report) {
            let id = record_id(&record);
            let outcome = serde_json::from_value::<Node>(record)
                .map_err(|e| e.to_string())
                .and_then(|node| graph.add_node(node).map(|_| ()).map_err(|e| e.to_string()));
            match outcome {
                Ok(()) => report.nodes_imported += 1,
                Err(reason) => skip(&mut report, RecordKind::Node, index, id, reason),
            }
        }

        for (index, record) in records(doc.remove("connections"), RecordKind::Connection, &mut report) {
            let id = record_id(&record);
            let outcome = serde_json::from_value::<Connection>(record)
                .map_err(|e| e.to_string())
                .and_then(|c| graph.add_connection(c).map(|_| ()).map_err(|e| e.to_string()));
            match outcome {
                Ok(()) => report.connections_imported += 1,
                Err(reason) => skip(&mut report, RecordKind::Connection, index, id, reason),
            }
        }

        info!(
            nodes = report.nodes_imported,
            connections = report.connections_imported,
            skipped = report.skipped.len(),
            "graph imported"
        );
        Ok((graph, report))
    }
}

/// Elements of a record array; a present but non-array section is itself skipped.
fn records(section: Option<Value>, kind: RecordKind, report: &mut ImportReport) -> Vec<(usize, Value)> {
    match section {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.into_iter().enumerate().collect(),
        Some(_) => {
            skip(report, kind, 0, None, format!("{kind} section is not an array"));
            Vec::new()
        }
    }
}

fn record_id(record: &Value) -> Option<String> {
    record.get("id").and_then(Value::as_str).map(str::to_string)
}

fn skip(report: &mut ImportReport, kind: RecordKind, index: usize, id: Option<String>, reason: String) {
    warn!(%kind, index, id = id.as_deref().unwrap_or("?"), %reason, "skipping record");
    report.skipped.push(SkippedRecord {
        kind,
        index,
        id,
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_records_are_skipped() {
        let text = r#"{
            "nodes": [
                {"id": "a", "kind": "logic_gate", "operator": "and"},
                {"id": "b", "kind": "not_a_kind"},
                {"id": "a", "kind": "terminal"},
                {"id": "t", "kind": "terminal"}
            ],
            "connections": [
                {"id": "c1", "from": "a", "to": "t"},
                {"id": "c2", "from": "a", "to": "ghost"},
                {"id": "c3", "to": "t"}
            ]
        }"#;
        let (graph, report) = Graph::from_json(text).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.connection_count(), 1);
        assert_eq!(report.nodes_imported, 2);
        assert_eq!(report.connections_imported, 1);
        let skipped: Vec<_> = report
            .skipped
            .iter()
            .map(|s| (s.kind, s.index, s.id.as_deref()))
            .collect();
        assert_eq!(
            skipped,
            vec![
                (RecordKind::Node, 1, Some("b")),
                (RecordKind::Node, 2, Some("a")),
                (RecordKind::Connection, 1, Some("c2")),
                (RecordKind::Connection, 2, Some("c3")),
            ]
        );
    }

    #[test]
    fn non_object_is_a_hard_error() {
        assert!(matches!(Graph::from_json("[1, 2]"), Err(GraphError::Document { .. })));
        assert!(matches!(Graph::from_json("{nope"), Err(GraphError::Json(_))));
    }

    #[test]
    fn missing_sections_load_empty() {
        let (graph, report) = Graph::from_json("{}").unwrap();
        assert!(graph.is_empty());
        assert!(report.is_clean());
        let (_, report) = Graph::from_json(r#"{"nodes": 5}"#).unwrap();
        assert_eq!(report.skipped.len(), 1);
    }
}
