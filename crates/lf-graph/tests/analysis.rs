use std::collections::HashSet;

use lf_core::NodeId;
use lf_gates::TruthTable;
use lf_graph::{
    Connection, ConnectionMode, ConnectionType, CycleAnalyzer, Graph, MergeStrategy, Node,
    NodeKind, NodeParameters, ProcessTransform,
};
use proptest::prelude::*;

fn pos(order: &[NodeId], id: &str) -> usize {
    order.iter().position(|n| n.as_str() == id).unwrap()
}

#[test]
fn three_node_cycle_through_branches_and_loop_target() {
    let mut g = Graph::new();
    g.add_node(Node::gate("A", "or").with_children([Some("B"), Some("B")]))
        .unwrap();
    g.add_node(Node::gate("B", "or").with_children([Some("C"), Some("C")]))
        .unwrap();
    g.add_node(Node::gate("C", "or").with_loop("A", ConnectionMode::Backward))
        .unwrap();

    let analyzer = CycleAnalyzer::new(&g);
    let cycles = analyzer.find_cycles();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].len(), 3);
    for id in ["A", "B", "C"] {
        assert!(cycles[0].contains(&NodeId::new(id)));
    }
    assert!(analyzer.topological_sort().is_none());
}

#[test]
fn diamond_orders_sources_before_sinks() {
    let mut g = Graph::new();
    for id in ["A", "B", "C", "D"] {
        g.add_node(Node::gate(id, "and")).unwrap();
    }
    for (from, to) in [("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")] {
        g.add_connection(Connection::new(from, to)).unwrap();
    }
    let order = CycleAnalyzer::new(&g).topological_sort().unwrap();
    assert_eq!(order.len(), 4);
    assert!(pos(&order, "A") < pos(&order, "B"));
    assert!(pos(&order, "A") < pos(&order, "C"));
    assert!(pos(&order, "B") < pos(&order, "D"));
    assert!(pos(&order, "C") < pos(&order, "D"));
}

#[test]
fn json_round_trip_preserves_everything() {
    let mut g = Graph::new();
    g.add_node(
        Node::gate("in", "threshold")
            .with_ports(3, 1)
            .with_parameters(NodeParameters {
                k: Some(2),
                ..Default::default()
            })
            .with_children([Some("mix"), None]),
    )
    .unwrap();
    g.add_node(
        Node::new("mix", NodeKind::Merge).with_parameters(NodeParameters {
            merge_strategy: Some(MergeStrategy::Max),
            ..Default::default()
        }),
    )
    .unwrap();
    g.add_node(
        Node::new("scale", NodeKind::Process)
            .with_parameters(NodeParameters {
                transform: Some(ProcessTransform::Clamp { min: 0.0, max: 4.0 }),
                ..Default::default()
            })
            .with_loop("in", ConnectionMode::Backward),
    )
    .unwrap();
    g.add_node(
        Node::gate("custom", "and")
            .with_truth_table(TruthTable::from([("11", true), ("00", true)]))
            .with_custom_function("max(in0, in1) > 0.5"),
    )
    .unwrap();
    g.add_connection(
        Connection::new("mix", "scale")
            .with_id("c1")
            .with_weight(0.25)
            .with_threshold(0.1),
    )
    .unwrap();
    g.add_connection(
        Connection::new("scale", "scale")
            .with_id("c2")
            .with_type(ConnectionType::Feedback),
    )
    .unwrap();

    let text = g.to_json().unwrap();
    let (back, report) = Graph::from_json(&text).unwrap();
    assert!(report.is_clean(), "{report:?}");
    assert_eq!(back.to_document(), g.to_document());

    let ids: HashSet<_> = back.node_ids().cloned().collect();
    assert_eq!(ids, g.node_ids().cloned().collect::<HashSet<_>>());
    let c1 = back.connection(&"c1".into()).unwrap();
    assert_eq!((c1.from.as_str(), c1.to.as_str()), ("mix", "scale"));
    assert_eq!(c1.threshold, Some(0.1));
}

#[test]
fn whole_graph_audit_reports_dangling_handles() {
    let mut g = Graph::new();
    g.add_node(Node::gate("a", "and").with_children([Some("later"), None]))
        .unwrap();
    let err = g.validate().unwrap_err();
    assert!(err.violations[0].contains("later"));
    g.add_node(Node::new("later", NodeKind::Terminal)).unwrap();
    assert!(g.validate().is_ok());
}

/// Random DAG: edges only go from a lower to a higher index.
fn dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2usize..12).prop_flat_map(|n| {
        let edge = (0..n, 0..n).prop_filter_map("forward edges only", |(a, b)| {
            (a < b).then_some((a, b))
        });
        (Just(n), prop::collection::vec(edge, 0..30))
    })
}

proptest! {
    #[test]
    fn topological_order_respects_every_edge((n, edges) in dag()) {
        let mut g = Graph::new();
        for i in 0..n {
            g.add_node(Node::gate(format!("n{i}"), "or")).unwrap();
        }
        for (a, b) in &edges {
            g.add_connection(Connection::new(format!("n{a}"), format!("n{b}"))).unwrap();
        }
        let analyzer = CycleAnalyzer::new(&g);
        let order = analyzer.topological_sort().unwrap();
        prop_assert_eq!(order.len(), n);
        for (a, b) in &edges {
            let (pos_a, pos_b) = (pos(&order, &format!("n{a}")), pos(&order, &format!("n{b}")));
            prop_assert!(pos_a < pos_b);
        }
        prop_assert!(analyzer.find_cycles().is_empty());
    }

    #[test]
    fn closing_edge_always_creates_a_cycle((n, edges) in dag()) {
        let mut g = Graph::new();
        for i in 0..n {
            g.add_node(Node::gate(format!("n{i}"), "or")).unwrap();
        }
        for i in 1..n {
            g.add_connection(Connection::new(format!("n{}", i - 1), format!("n{i}"))).unwrap();
        }
        for (a, b) in &edges {
            g.add_connection(Connection::new(format!("n{a}"), format!("n{b}"))).unwrap();
        }
        g.add_connection(
            Connection::new(format!("n{}", n - 1), "n0").with_type(ConnectionType::Feedback),
        )
        .unwrap();
        let analyzer = CycleAnalyzer::new(&g);
        prop_assert!(analyzer.topological_sort().is_none());
        prop_assert!(!analyzer.find_cycles().is_empty());
    }
}
