//! Unit tests for argument parsing, command execution, and rendering.

use super::commands::{run_split, summarise_split};
use super::{
    Cli, CliError, Command, EdgeTrainModeArg, ExecutionSummary, SplitCommand, SplitSummary,
    TaskArg, render_summary, run_cli,
};

use clap::Parser;
use graphsplit_core::{Graph, GraphDatasetBuilder, SplitError, SplitRequest, Task};
use graphsplit_test_support::tracing::RecordingLayer;
use rstest::{fixture, rstest};
use tracing::Level;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn parse(args: &[&str]) -> SplitCommand {
    let argv = ["graphsplit", "split"].into_iter().chain(args.iter().copied());
    match Cli::try_parse_from(argv) {
        Ok(Cli {
            command: Command::Split(split),
        }) => split,
        Err(err) => panic!("arguments must parse: {err}"),
    }
}

#[fixture]
fn dense() -> SplitCommand {
    parse(&["--tiers", "50", "--edge-probability", "0.5", "--seed", "3"])
}

#[rstest]
fn defaults_match_core_constants() {
    let command = parse(&[]);
    assert_eq!(command.tiers, vec![32]);
    assert_eq!(command.task, TaskArg::Node);
    assert_eq!(command.edge_train_mode, EdgeTrainModeArg::All);
    assert!((command.edge_message_ratio - 0.8).abs() < f64::EPSILON);
    assert!((command.negative_ratio - 1.0).abs() < f64::EPSILON);
    assert!(command.ratios.is_none());
    assert!(!command.inductive);
}

#[rstest]
fn list_arguments_split_on_commas() {
    let command = parse(&["--tiers", "10,20,40", "--ratios", "0.7,0.3", "--task", "link-pred"]);
    assert_eq!(command.tiers, vec![10, 20, 40]);
    assert_eq!(command.ratios, Some(vec![0.7, 0.3]));
    assert_eq!(command.task, TaskArg::LinkPred);
}

#[rstest]
fn clap_rejects_unknown_tasks() {
    let result = Cli::try_parse_from(["graphsplit", "split", "--task", "cluster"]);
    assert!(result.is_err());
}

#[rstest]
fn node_split_reports_per_split_targets(dense: SplitCommand) -> TestResult {
    let summary = run_split(dense)?;
    assert_eq!(summary.task, Task::Node);
    let nodes: Vec<usize> = summary.splits.iter().map(|split| split.node_targets).collect();
    assert_eq!(nodes, vec![38, 5, 7]);
    assert!(summary.splits.iter().all(|split| split.graphs == 1));
    Ok(())
}

#[rstest]
fn link_prediction_reports_matching_negatives(mut dense: SplitCommand) -> TestResult {
    dense.task = TaskArg::LinkPred;
    let summary = run_split(dense)?;
    for split in &summary.splits {
        assert_eq!(split.edge_targets, split.negative_edges);
        assert!(split.edge_targets > 0);
    }
    Ok(())
}

#[rstest]
fn inductive_split_distributes_generated_graphs(mut dense: SplitCommand) -> TestResult {
    dense.task = TaskArg::Graph;
    dense.inductive = true;
    dense.graphs = Some(10);
    let summary = run_split(dense)?;
    assert!(!summary.transductive);
    let graphs: Vec<usize> = summary.splits.iter().map(|split| split.graphs).collect();
    assert_eq!(graphs, vec![6, 1, 3]);
    Ok(())
}

#[rstest]
fn graph_task_requires_inductive_splits(mut dense: SplitCommand) {
    dense.task = TaskArg::Graph;
    let err = run_split(dense).expect_err("graph task is inductive only");
    assert!(matches!(err, CliError::Split(SplitError::UnsupportedTask { .. })));
    assert_eq!(err.codes(), (Some("SPLIT_UNSUPPORTED_TASK"), None));
}

#[rstest]
fn invalid_generator_parameters_are_reported(mut dense: SplitCommand) {
    dense.edge_probability = 1.5;
    let err = run_split(dense).expect_err("probability out of range");
    assert!(matches!(err, CliError::Generator(_)));
    assert_eq!(err.codes(), (None, Some("GENERATOR_INVALID_PARAMETERS")));
}

#[rstest]
fn invalid_ratios_are_reported(mut dense: SplitCommand) {
    dense.ratios = Some(vec![0.5, 0.6]);
    let err = run_split(dense).expect_err("ratios must sum to one");
    assert_eq!(err.codes().0, Some("SPLIT_INVALID_CONFIGURATION"));
}

#[rstest]
fn run_cli_records_command_spans(dense: SplitCommand) -> TestResult {
    let cli = Cli {
        command: Command::Split(dense),
    };
    let (layer, summary) = RecordingLayer::capture(|| run_cli(cli));
    summary?;
    let run = layer.span_named("cli.run").expect("cli.run span must exist");
    assert_eq!(run.fields.get("command"), Some(&"split".to_owned()));
    let split = layer.span_named("cli.split").expect("cli.split span must exist");
    assert_eq!(split.fields.get("task"), Some(&"node".to_owned()));
    assert_eq!(split.fields.get("inductive"), Some(&"false".to_owned()));
    assert!(layer.span_named("dataset.split").is_some());
    assert!(
        layer
            .events_at(Level::INFO)
            .iter()
            .any(|event| event.message() == Some("split completed"))
    );
    Ok(())
}

#[rstest]
fn summaries_count_every_graph_in_a_split() -> TestResult {
    let graphs = (0..2).map(|_| Graph::new(10, vec![(0, 1)], false));
    let dataset = GraphDatasetBuilder::new().build(graphs.collect::<Result<Vec<_>, _>>()?)?;
    let splits = dataset.split(&SplitRequest::new())?;
    let summary = summarise_split(&splits[0]);
    assert_eq!(
        summary,
        SplitSummary {
            graphs: 2,
            node_targets: 12,
            edge_targets: 4,
            negative_edges: 0,
        }
    );
    Ok(())
}

#[rstest]
fn render_summary_outputs_one_row_per_split() -> TestResult {
    let summary = ExecutionSummary {
        generator: "demo".into(),
        task: Task::LinkPred,
        transductive: false,
        splits: vec![
            SplitSummary {
                graphs: 6,
                node_targets: 0,
                edge_targets: 40,
                negative_edges: 40,
            },
            SplitSummary {
                graphs: 1,
                ..SplitSummary::default()
            },
        ],
    };
    let mut buffer = Vec::new();
    render_summary(&summary, &mut buffer)?;
    let text = String::from_utf8(buffer)?;
    assert!(text.contains("generator: demo"));
    assert!(text.contains("task: link_pred (inductive)"));
    assert!(text.contains("0\t6\t0\t40\t40"));
    assert!(text.contains("1\t1\t0\t0\t0"));
    Ok(())
}
