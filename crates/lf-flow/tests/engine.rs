use lf_core::{NodeId, Real, SignalValue};
use lf_flow::{FlowConfig, FlowError, SignalFlowEngine, Termination};
use lf_gates::{MAX_TRUTH_VALUE, TruthTable};
use lf_graph::{
    Connection, ConnectionMode, ConnectionType, Graph, MAX_OUTPUT_COUNT, Node, NodeKind,
    NodeParameters,
};
use proptest::prelude::*;

fn chain(ids: &[&str], op: &str) -> Graph {
    let mut graph = Graph::new();
    for id in ids {
        graph.add_node(Node::gate(*id, op)).unwrap();
    }
    for pair in ids.windows(2) {
        graph.add_connection(Connection::new(pair[0], pair[1])).unwrap();
    }
    graph
}

fn run(graph: &Graph, start: &str, input: &[Real]) -> lf_flow::FlowReport {
    SignalFlowEngine::default()
        .execute_flow(graph, &NodeId::from(start), input)
        .unwrap()
}

fn order(report: &lf_flow::FlowReport) -> Vec<&str> {
    report.path.iter().map(NodeId::as_str).collect()
}

#[test]
fn straight_line_propagation() {
    let mut graph = chain(&["a", "b"], "and");
    graph.add_node(Node::new("out", NodeKind::Terminal)).unwrap();
    graph.update_node(Node::gate("b", "not")).unwrap();
    graph.add_connection(Connection::new("b", "out")).unwrap();

    let report = run(&graph, "a", &[1.0, 1.0]);
    assert_eq!(order(&report), ["a", "b", "out"]);
    assert_eq!(report.scalar("a"), Some(1.0));
    assert_eq!(report.scalar("b"), Some(0.0));
    assert_eq!(report.scalar("out"), Some(0.0));
    assert_eq!(report.termination, Termination::Completed);
    assert!(!report.has_errors());
}

#[test]
fn unknown_start_node_is_an_error() {
    let graph = chain(&["a"], "or");
    let err = SignalFlowEngine::default()
        .execute_flow(&graph, &NodeId::from("nope"), &[])
        .unwrap_err();
    assert!(matches!(err, FlowError::UnknownStartNode { id } if id.as_str() == "nope"));
}

#[test]
fn backward_loop_is_cut_by_the_loop_limit() {
    let mut graph = chain(&["a", "b"], "or");
    graph
        .update_node(Node::gate("b", "or").with_loop("a", ConnectionMode::Backward))
        .unwrap();

    let report = run(&graph, "a", &[1.0]);
    assert_eq!(report.termination, Termination::Completed);
    assert!(report.loop_limited.contains(&NodeId::from("a")));
    assert_eq!(report.loop_counts[&NodeId::from("a")], 101);
    assert_eq!(report.executions_of("a"), 101);
    assert!(report.iterations < FlowConfig::default().max_global_iterations);
}

#[test]
fn long_cycle_stops_at_the_global_cap() {
    let ids: Vec<String> = (0..12).map(|i| format!("n{i}")).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let mut graph = chain(&refs, "or");
    graph
        .add_connection(Connection::new("n11", "n0").with_type(ConnectionType::Feedback))
        .unwrap();

    let engine = SignalFlowEngine::new(FlowConfig {
        max_global_iterations: 50,
        ..FlowConfig::default()
    });
    let report = engine.execute_flow(&graph, &NodeId::from("n0"), &[1.0]).unwrap();

    assert_eq!(report.termination, Termination::GlobalIterationLimit);
    assert_eq!(report.iterations, 50);
    assert!(report.loop_limited.is_empty());
    assert_eq!(report.executions_of("n0"), 5);
}

#[test]
fn failing_node_records_an_error_and_propagates_zero() {
    let graph = chain(&["a", "b"], "or");
    let mut graph = graph;
    graph.update_node(Node::gate("a", "imply")).unwrap();

    let report = run(&graph, "a", &[1.0]);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].node.as_str(), "a");
    assert!(report.results[0].error.is_some());
    assert_eq!(report.scalar("a"), Some(0.0));
    assert_eq!(report.results[1].inputs, vec![0.0]);
    assert_eq!(report.termination, Termination::Completed);
}

#[test]
fn router_activates_one_port_and_clears_the_rest() {
    let mut graph = Graph::new();
    graph
        .add_node(
            Node::new("r", NodeKind::Router)
                .with_ports(1, 3)
                .with_parameters(NodeParameters {
                    output_count: Some(3),
                    ..Default::default()
                }),
        )
        .unwrap();
    for (port, id) in ["x", "y", "z"].into_iter().enumerate() {
        graph.add_node(Node::new(id, NodeKind::Terminal)).unwrap();
        graph
            .add_connection(Connection::new("r", id).ports(port, 0))
            .unwrap();
    }

    let report = run(&graph, "r", &[1.7]);
    assert_eq!(order(&report), ["r", "y"]);
    assert_eq!(report.scalar("y"), Some(1.7));
    assert_eq!(
        report.branch_outputs[&NodeId::from("r")],
        vec![SignalValue::NoSignal, SignalValue::Scalar(1.7), SignalValue::NoSignal]
    );
}

#[test]
fn fuzzy_node_branches_on_its_threshold() {
    let mut graph = Graph::new();
    graph
        .add_node(
            Node::new("f", NodeKind::FuzzyGate)
                .with_operator("fuzzy_and")
                .with_children([Some("low"), Some("high")]),
        )
        .unwrap();
    graph.add_node(Node::new("low", NodeKind::Terminal)).unwrap();
    graph.add_node(Node::new("high", NodeKind::Terminal)).unwrap();

    let report = run(&graph, "f", &[0.8, 0.6]);
    assert_eq!(report.scalar("f"), Some(0.6));
    assert_eq!(order(&report), ["f", "high"]);

    let report = run(&graph, "f", &[0.8, 0.2]);
    assert_eq!(order(&report), ["f", "low"]);
}

#[test]
fn conditional_and_thresholded_connections() {
    let mut graph = Graph::new();
    for id in ["s", "on_true", "on_false", "gated"] {
        graph.add_node(Node::gate(id, "or")).unwrap();
    }
    graph
        .add_connection(
            Connection::new("s", "on_true")
                .ports(1, 0)
                .with_type(ConnectionType::Conditional),
        )
        .unwrap();
    graph
        .add_connection(Connection::new("s", "on_false").with_type(ConnectionType::Conditional))
        .unwrap();
    graph
        .add_connection(Connection::new("s", "gated").with_threshold(0.5))
        .unwrap();

    let report = run(&graph, "s", &[1.0]);
    assert_eq!(order(&report), ["s", "on_true", "gated"]);

    let report = run(&graph, "s", &[0.0]);
    assert_eq!(order(&report), ["s", "on_false"]);
}

#[test]
fn skip_target_runs_alongside_regular_successors() {
    let mut graph = chain(&["a", "b"], "or");
    graph.add_node(Node::gate("c", "or")).unwrap();
    graph
        .update_node(Node::gate("a", "or").with_loop("c", ConnectionMode::Skip))
        .unwrap();

    let report = run(&graph, "a", &[1.0]);
    assert_eq!(order(&report), ["a", "b", "c"]);
}

#[test]
fn truth_tables_and_external_inputs() {
    let inhibit = TruthTable::new()
        .with_row(&[true, false], true)
        .with_row(&[true, true], false);

    let mut graph = chain(&["a", "b"], "or");
    graph.update_node(Node::gate("a", "inhibit")).unwrap();

    let mut engine = SignalFlowEngine::default();
    engine.gates_mut().register_truth_table("inhibit", inhibit).unwrap();
    engine.set_external_input("b", vec![0.25]);

    let report = engine.execute_flow(&graph, &NodeId::from("a"), &[1.0, 0.0]).unwrap();
    assert_eq!(report.scalar("a"), Some(1.0));
    assert_eq!(report.results[1].inputs, vec![1.0, 0.25]);

    engine.clear_external_inputs();
    let report = engine.execute_flow(&graph, &NodeId::from("a"), &[1.0, 1.0]).unwrap();
    assert_eq!(report.scalar("a"), Some(0.0));
    assert_eq!(report.results[1].inputs, vec![0.0]);
}

#[test]
fn oversized_parameters_never_reach_the_engine() {
    let mut graph = Graph::new();
    let huge_levels = Node::new("m", NodeKind::MultiValued)
        .with_operator("lukasiewicz_and")
        .with_parameters(NodeParameters {
            max_value: Some(1e300),
            ..Default::default()
        });
    assert!(graph.add_node(huge_levels).is_err());
    let huge_router = Node::new("r", NodeKind::Router).with_parameters(NodeParameters {
        output_count: Some(1_000_000_000),
        ..Default::default()
    });
    assert!(graph.add_node(huge_router).is_err());
    assert!(graph.is_empty());
}

#[test]
fn widest_accepted_parameters_run_cleanly() {
    let mut graph = Graph::new();
    graph
        .add_node(
            Node::new("p", NodeKind::MultiValued)
                .with_operator("post_not")
                .with_parameters(NodeParameters {
                    max_value: Some(MAX_TRUTH_VALUE),
                    ..Default::default()
                }),
        )
        .unwrap();
    graph
        .add_node(
            Node::new("r", NodeKind::Router).with_parameters(NodeParameters {
                output_count: Some(MAX_OUTPUT_COUNT),
                ..Default::default()
            }),
        )
        .unwrap();
    graph.add_connection(Connection::new("p", "r")).unwrap();

    let report = run(&graph, "p", &[MAX_TRUTH_VALUE]);
    assert!(!report.has_errors());
    assert_eq!(report.scalar("p"), Some(0.0));
    assert_eq!(report.branch_outputs[&NodeId::from("r")].len(), MAX_OUTPUT_COUNT);

    let engine = SignalFlowEngine::default();
    let report = engine
        .execute_flow(&chain(&["w"], "decoder"), &NodeId::from("w"), &[1.0; 12])
        .unwrap();
    assert!(!report.has_errors());
    assert_eq!(report.scalar("w"), Some(2.0_f64.powi(1023)));
}

#[test]
fn runs_do_not_share_state() {
    let mut graph = chain(&["a", "b"], "xor");
    graph
        .update_node(Node::gate("b", "xor").with_loop("a", ConnectionMode::Backward))
        .unwrap();

    let engine = SignalFlowEngine::default();
    let first = engine.execute_flow(&graph, &NodeId::from("a"), &[1.0]).unwrap();
    let second = engine.execute_flow(&graph, &NodeId::from("a"), &[1.0]).unwrap();
    assert_eq!(first, second);
}

#[test]
fn cancellation_stops_before_the_next_node() {
    let graph = chain(&["a", "b", "c"], "or");
    let engine = SignalFlowEngine::default();
    let token = engine.cancellation_token();

    token.cancel();
    let report = engine.execute_flow(&graph, &NodeId::from("a"), &[1.0]).unwrap();
    assert_eq!(report.termination, Termination::Cancelled);
    assert_eq!(report.iterations, 0);

    token.reset();
    let report = engine.execute_flow(&graph, &NodeId::from("a"), &[1.0]).unwrap();
    assert!(report.completed());
    assert_eq!(report.iterations, 3);
}

mod proptests {
    use super::*;

    const OPS: [&str; 6] = ["and", "or", "xor", "not", "nand", "majority"];

    fn arb_graph() -> impl Strategy<Value = Graph> {
        (2usize..9).prop_flat_map(|n| {
            (
                prop::collection::vec(0..OPS.len(), n),
                prop::collection::vec((0..n, 0..n, any::<bool>()), 0..3 * n),
            )
                .prop_map(move |(ops, edges)| {
                    let mut graph = Graph::new();
                    for (i, op) in ops.into_iter().enumerate() {
                        graph.add_node(Node::gate(format!("n{i}"), OPS[op])).unwrap();
                    }
                    for (from, to, feedback) in edges {
                        let kind = if feedback || from == to {
                            ConnectionType::Feedback
                        } else {
                            ConnectionType::Normal
                        };
                        let conn = Connection::new(format!("n{from}"), format!("n{to}"))
                            .with_type(kind);
                        let _ = graph.add_connection(conn);
                    }
                    graph
                })
        })
    }

    proptest! {
        #[test]
        fn every_run_terminates_within_the_cap(
            graph in arb_graph(),
            input in prop::collection::vec(0.0..1.0f64, 0..3),
        ) {
            let config = FlowConfig {
                max_loop_iterations: 5,
                max_global_iterations: 200,
                loop_detection_window: 4,
            };
            let report = SignalFlowEngine::new(config)
                .execute_flow(&graph, &NodeId::from("n0"), &input)
                .unwrap();
            prop_assert!(report.iterations <= config.max_global_iterations);
            prop_assert_eq!(report.results.len(), report.iterations);
            prop_assert!(report.termination != Termination::Cancelled);
        }
    }
}
