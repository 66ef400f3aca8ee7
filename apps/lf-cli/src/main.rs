use clap::{Parser, Subcommand};
use lf_core::{NodeId, Real, SignalValue, ValidationError};
use lf_flow::{FlowConfig, FlowError, SignalFlowEngine};
use lf_fuzzy::{FuzzyError, FuzzyInferenceSystem};
use lf_gates::{GateError, GateEvaluator, GateParams};
use lf_graph::{CycleAnalyzer, Graph, GraphError, LoopComplexity};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lf-cli")]
#[command(about = "LogicFlow CLI - logic and fuzzy-logic graph evaluation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a graph document and check its invariants
    Validate {
        /// Graph document (JSON or YAML)
        graph_path: PathBuf,
    },
    /// List the directed cycles of a graph
    Cycles {
        graph_path: PathBuf,
    },
    /// Print a topological order, if the graph is acyclic
    Topo {
        graph_path: PathBuf,
    },
    /// Propagate signals through a graph
    Run {
        graph_path: PathBuf,
        /// Node to start from
        #[arg(long)]
        start: String,
        /// Initial input values for the start node
        #[arg(long = "input", num_args = 1.., allow_negative_numbers = true)]
        inputs: Vec<Real>,
        /// Engine limits (YAML or JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Enumerate every binary input pattern of a gate
    TruthTable {
        /// Gate operator, e.g. xor or majority
        operator: String,
        /// Number of inputs
        inputs: usize,
        /// k for threshold-family gates
        #[arg(long)]
        k: Option<u32>,
        /// Highest truth value for multi-valued gates
        #[arg(long)]
        max_value: Option<Real>,
    },
    /// Run a fuzzy inference system on crisp inputs
    Infer {
        /// Inference system definition (YAML or JSON)
        system_path: PathBuf,
        /// Crisp inputs as name=value
        #[arg(long = "input", value_parser = parse_assignment)]
        inputs: Vec<(String, Real)>,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Fuzzy(#[from] FuzzyError),
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

type CliResult<T> = Result<T, CliError>;

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { graph_path } => cmd_validate(&graph_path),
        Commands::Cycles { graph_path } => cmd_cycles(&graph_path),
        Commands::Topo { graph_path } => cmd_topo(&graph_path),
        Commands::Run {
            graph_path,
            start,
            inputs,
            config,
            json,
        } => cmd_run(&graph_path, &start, &inputs, config.as_deref(), json),
        Commands::TruthTable {
            operator,
            inputs,
            k,
            max_value,
        } => cmd_truth_table(&operator, inputs, GateParams { k, max_value }),
        Commands::Infer {
            system_path,
            inputs,
        } => cmd_infer(&system_path, inputs),
    }
}

fn parse_assignment(s: &str) -> Result<(String, Real), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    let value: Real = value
        .trim()
        .parse()
        .map_err(|e| format!("bad value for '{name}': {e}"))?;
    Ok((name.trim().to_string(), value))
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

fn load_graph(path: &Path) -> CliResult<Graph> {
    let text = std::fs::read_to_string(path)?;
    let value: serde_json::Value = if is_yaml(path) {
        serde_yaml::from_str(&text)?
    } else {
        serde_json::from_str(&text)?
    };
    let (graph, report) = Graph::from_value(value)?;
    for skipped in &report.skipped {
        println!(
            "  skipped {} #{}{}: {}",
            skipped.kind,
            skipped.index,
            skipped
                .id
                .as_deref()
                .map(|id| format!(" ({id})"))
                .unwrap_or_default(),
            skipped.reason
        );
    }
    tracing::info!(
        nodes = report.nodes_imported,
        connections = report.connections_imported,
        skipped = report.skipped.len(),
        "graph imported"
    );
    Ok(graph)
}

fn cmd_validate(graph_path: &Path) -> CliResult<()> {
    println!("Validating graph: {}", graph_path.display());
    let graph = load_graph(graph_path)?;
    graph.validate()?;
    println!(
        "✓ Graph is valid ({} nodes, {} connections)",
        graph.node_count(),
        graph.connection_count()
    );
    Ok(())
}

fn cmd_cycles(graph_path: &Path) -> CliResult<()> {
    let graph = load_graph(graph_path)?;
    let analyzer = CycleAnalyzer::new(&graph);
    let cycles = analyzer.find_cycles();
    if cycles.is_empty() {
        println!("No cycles found");
        return Ok(());
    }

    println!("Cycles:");
    for cycle in &cycles {
        let path: Vec<String> = cycle.closed_path().iter().map(ToString::to_string).collect();
        println!("  {}", path.join(" -> "));
    }
    println!("{}", loop_summary(&analyzer.analyze_loop_complexity()));
    Ok(())
}

fn loop_summary(summary: &LoopComplexity) -> String {
    format!(
        "{} simple, {} nested, longest {} nodes, {} nodes in loops",
        summary.simple.len(),
        summary.nested.len(),
        summary.max_length,
        summary.nodes_in_loops.len()
    )
}

fn cmd_topo(graph_path: &Path) -> CliResult<()> {
    let graph = load_graph(graph_path)?;
    match CycleAnalyzer::new(&graph).topological_sort() {
        Some(order) => {
            for (i, id) in order.iter().enumerate() {
                println!("{:>4}  {}", i + 1, id);
            }
        }
        None => println!("Graph has cycles; no topological order exists"),
    }
    Ok(())
}

fn cmd_run(
    graph_path: &Path,
    start: &str,
    inputs: &[Real],
    config_path: Option<&Path>,
    json: bool,
) -> CliResult<()> {
    let graph = load_graph(graph_path)?;
    let config = match config_path {
        Some(path) => FlowConfig::load(path)?,
        None => FlowConfig::default(),
    };
    let engine = SignalFlowEngine::new(config);
    let report = engine.execute_flow(&graph, &NodeId::from(start), inputs)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Executed {} nodes ({:?})", report.iterations, report.termination);
    for step in &report.results {
        let marker = if step.error.is_some() { " !" } else { "" };
        println!(
            "{:>5}  {:<20} {:<12} -> {} [branch {}]{}",
            step.iteration,
            step.node,
            step.kind,
            format_signal(step.output),
            step.branch,
            marker
        );
    }
    if !report.final_values.is_empty() {
        println!("Final values:");
        for (id, value) in &report.final_values {
            println!("  {id} = {}", format_signal(*value));
        }
    }
    for failure in &report.errors {
        println!("✗ {} (iteration {}): {}", failure.node, failure.iteration, failure.message);
    }
    for id in &report.blocked {
        println!("⚠ merge '{id}' never received all inputs");
    }
    for id in &report.loop_limited {
        println!("⚠ '{id}' hit the loop limit");
    }
    Ok(())
}

fn format_signal(value: SignalValue) -> String {
    match value {
        SignalValue::Scalar(v) => format!("{v:.4}"),
        SignalValue::NoSignal => "-".to_string(),
    }
}

fn cmd_truth_table(operator: &str, inputs: usize, params: GateParams) -> CliResult<()> {
    let rows = GateEvaluator::new().generate_truth_table(operator, inputs, &params)?;
    for row in rows {
        let bits: String = row
            .inputs
            .iter()
            .map(|&b| if b { '1' } else { '0' })
            .collect();
        println!("{bits}  {}", row.output);
    }
    Ok(())
}

fn cmd_infer(system_path: &Path, inputs: Vec<(String, Real)>) -> CliResult<()> {
    let text = std::fs::read_to_string(system_path)?;
    let system: FuzzyInferenceSystem = if is_yaml(system_path) {
        serde_yaml::from_str(&text)?
    } else {
        serde_json::from_str(&text)?
    };
    system.validate()?;

    let values: HashMap<String, Real> = inputs.into_iter().collect();
    let outcome = system.infer(&values)?;
    for (i, strength) in outcome.rule_activations.iter().enumerate() {
        println!("  rule {:>2}: {strength:.4}", i + 1);
    }
    for (name, value) in &outcome.outputs {
        println!("{name} = {value:.4}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_graph::{Connection, Node};

    fn triangle() -> Graph {
        let mut graph = Graph::new();
        for id in ["a", "b", "c"] {
            graph.add_node(Node::gate(id, "or")).unwrap();
        }
        for (from, to) in [("a", "b"), ("b", "c"), ("c", "a")] {
            graph.add_connection(Connection::new(from, to)).unwrap();
        }
        graph
    }

    #[test]
    fn cycles_subcommand_parses() {
        let cli = Cli::try_parse_from(["lf-cli", "cycles", "graph.json"]).unwrap();
        assert!(matches!(cli.command, Commands::Cycles { graph_path } if graph_path == Path::new("graph.json")));
    }

    #[test]
    fn loop_summary_counts_cycles() {
        let graph = triangle();
        let summary = CycleAnalyzer::new(&graph).analyze_loop_complexity();
        assert_eq!(
            loop_summary(&summary),
            "0 simple, 1 nested, longest 3 nodes, 3 nodes in loops"
        );
    }

    #[test]
    fn cycles_runs_on_a_saved_graph() {
        let path = std::env::temp_dir().join(format!("lf-cli-cycles-{}.json", std::process::id()));
        std::fs::write(&path, triangle().to_json().unwrap()).unwrap();
        let outcome = cmd_cycles(&path);
        std::fs::remove_file(&path).unwrap();
        outcome.unwrap();
    }
}
