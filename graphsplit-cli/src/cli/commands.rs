//! Command implementations and argument parsing for the graphsplit CLI.

use std::io::{self, Write};

use clap::{Args, Parser, Subcommand, ValueEnum};
use graphsplit_core::{
    AnyGraph, DEFAULT_EDGE_MESSAGE_RATIO, DEFAULT_NEGATIVE_SAMPLING_RATIO, EdgeTrainMode,
    GeneratorError, GraphDataset, GraphDatasetBuilder, RandomGraphGenerator, SplitError,
    SplitRequest, Task,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

const DEFAULT_TIER: usize = 32;
const DEFAULT_EDGE_PROBABILITY: f64 = 0.1;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "graphsplit", about = "Split generated graph datasets for learning tasks.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate random graphs and split them.
    Split(SplitCommand),
}

/// Options accepted by the `split` command.
#[derive(Debug, Args, Clone)]
pub struct SplitCommand {
    /// Node-count tiers the generator draws from.
    #[arg(long, value_delimiter = ',', default_values_t = [DEFAULT_TIER])]
    pub tiers: Vec<usize>,

    /// Probability that any node pair is linked.
    #[arg(long, default_value_t = DEFAULT_EDGE_PROBABILITY)]
    pub edge_probability: f64,

    /// Graphs drawn per split (defaults to one per tier).
    #[arg(long)]
    pub graphs: Option<usize>,

    /// Seed shared by the generator and the splitter.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Learning task to split for.
    #[arg(long, value_enum, default_value_t = TaskArg::Node)]
    pub task: TaskArg,

    /// Split ratios, two or three values summing to one.
    #[arg(long, value_delimiter = ',')]
    pub ratios: Option<Vec<f64>>,

    /// Assign whole graphs to splits instead of splitting each graph.
    #[arg(long)]
    pub inductive: bool,

    /// How link prediction uses its training edges.
    #[arg(long, value_enum, default_value_t = EdgeTrainModeArg::All)]
    pub edge_train_mode: EdgeTrainModeArg,

    /// Fraction of training edges kept as message edges in disjoint mode.
    #[arg(long, default_value_t = DEFAULT_EDGE_MESSAGE_RATIO)]
    pub edge_message_ratio: f64,

    /// Negatives drawn per positive link prediction target.
    #[arg(long, default_value_t = DEFAULT_NEGATIVE_SAMPLING_RATIO)]
    pub negative_ratio: f64,

    /// Generate directed graphs.
    #[arg(long)]
    pub directed: bool,

    /// Partition in generation order.
    #[arg(long)]
    pub no_shuffle: bool,

    /// Node classes to label generated nodes with.
    #[arg(long, default_value_t = 0)]
    pub node_classes: usize,

    /// Graph classes to label generated graphs with.
    #[arg(long, default_value_t = 0)]
    pub graph_classes: usize,
}

/// Task names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TaskArg {
    /// Node classification.
    Node,
    /// Edge classification.
    Edge,
    /// Link prediction with sampled negatives.
    LinkPred,
    /// Graph classification.
    Graph,
}

impl From<TaskArg> for Task {
    fn from(value: TaskArg) -> Self {
        match value {
            TaskArg::Node => Self::Node,
            TaskArg::Edge => Self::Edge,
            TaskArg::LinkPred => Self::LinkPred,
            TaskArg::Graph => Self::Graph,
        }
    }
}

/// Link prediction training modes accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EdgeTrainModeArg {
    /// Train edges are both structure and supervision.
    All,
    /// Train edges divide into message and supervision sets.
    Disjoint,
}

impl From<EdgeTrainModeArg> for EdgeTrainMode {
    fn from(value: EdgeTrainModeArg) -> Self {
        match value {
            EdgeTrainModeArg::All => Self::All,
            EdgeTrainModeArg::Disjoint => Self::Disjoint,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The generator rejected its parameters.
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    /// Building or splitting the dataset failed.
    #[error(transparent)]
    Split(#[from] SplitError),
}

impl CliError {
    /// Stable split and generator codes for structured error reports.
    #[must_use]
    pub fn codes(&self) -> (Option<&'static str>, Option<&'static str>) {
        match self {
            Self::Generator(err) => (None, Some(err.code().as_str())),
            Self::Split(err) => (
                Some(err.code().as_str()),
                err.generator_code().map(|code| code.as_str()),
            ),
        }
    }
}

/// Target totals for one output split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitSummary {
    /// Graphs held by the split.
    pub graphs: usize,
    /// Node-level targets across the split's graphs.
    pub node_targets: usize,
    /// Positive edge-level target columns.
    pub edge_targets: usize,
    /// Sampled negative target columns.
    pub negative_edges: usize,
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name reported by the generator.
    pub generator: String,
    /// Task the dataset was split for.
    pub task: Task,
    /// Whether each graph was split individually.
    pub transductive: bool,
    /// One entry per output split, in split order.
    pub splits: Vec<SplitSummary>,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when generation or splitting fails.
///
/// # Examples
/// ```
/// # use clap::Parser;
/// # use graphsplit_cli::cli::{Cli, run_cli};
/// #
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let cli = Cli::try_parse_from([
///     "graphsplit", "split", "--tiers", "30", "--edge-probability", "0.3", "--task", "edge",
/// ])?;
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.splits.len(), 3);
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Split(split) => {
            Span::current().record("command", field::display("split"));
            run_split(split)
        }
    }
}

#[instrument(
    name = "cli.split",
    err,
    skip(command),
    fields(task = field::Empty, inductive = command.inductive, tiers = ?command.tiers),
)]
pub(super) fn run_split(command: SplitCommand) -> Result<ExecutionSummary, CliError> {
    let task = Task::from(command.task);
    Span::current().record("task", field::display(task));

    let dataset = build_dataset(&command)?;
    let mut request = SplitRequest::new().with_transductive(!command.inductive);
    if let Some(ratios) = command.ratios.clone() {
        request = request.with_ratios(ratios);
    }
    let splits = dataset.split(&request)?;
    let summary = ExecutionSummary {
        generator: generator_name(&command),
        task,
        transductive: request.is_transductive(),
        splits: splits.iter().map(summarise_split).collect(),
    };
    info!(
        splits = summary.splits.len(),
        graphs = summary.splits.iter().map(|split| split.graphs).sum::<usize>(),
        "split completed"
    );
    Ok(summary)
}

fn build_dataset(command: &SplitCommand) -> Result<GraphDataset, CliError> {
    let mut generator =
        RandomGraphGenerator::new(command.tiers.clone(), command.edge_probability, command.seed)?
            .with_name(generator_name(command))
            .with_directed(command.directed)
            .with_node_classes(command.node_classes)
            .with_graph_classes(command.graph_classes);
    if let Some(graphs) = command.graphs {
        generator = generator.with_cycle_len(graphs);
    }
    Ok(GraphDatasetBuilder::new()
        .with_task(command.task.into())
        .with_edge_train_mode(command.edge_train_mode.into())
        .with_edge_message_ratio(command.edge_message_ratio)
        .with_edge_negative_sampling_ratio(command.negative_ratio)
        .with_seed(command.seed)
        .with_shuffle(!command.no_shuffle)
        .build_with_generator(generator)?)
}

fn generator_name(command: &SplitCommand) -> String {
    let kind = if command.directed { "directed" } else { "undirected" };
    format!("random-{kind}")
}

pub(super) fn summarise_split(split: &GraphDataset) -> SplitSummary {
    split
        .graphs()
        .unwrap_or_default()
        .iter()
        .fold(SplitSummary::default(), |mut total, graph| {
            let (nodes, edges, negatives) = targets(graph);
            total.graphs += 1;
            total.node_targets += nodes;
            total.edge_targets += edges;
            total.negative_edges += negatives;
            total
        })
}

fn targets(graph: &AnyGraph) -> (usize, usize, usize) {
    match graph {
        AnyGraph::Homogeneous(graph) => (
            graph.node_label_index().len(),
            graph.positive_count(),
            graph.negative_edges().len(),
        ),
        AnyGraph::Heterogeneous(graph) => {
            let index = graph.edge_label_index();
            let negatives: usize = graph.negative_edges().values().map(Vec::len).sum();
            let columns: usize = index.values().map(|index| index.len()).sum();
            (
                graph.node_label_index().values().map(Vec::len).sum(),
                columns - negatives,
                negatives,
            )
        }
    }
}

/// Renders `summary` to `writer` as a header followed by one row per split.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use graphsplit_cli::cli::{ExecutionSummary, SplitSummary, render_summary};
/// # use graphsplit_core::Task;
/// #
/// # fn main() -> std::io::Result<()> {
/// let summary = ExecutionSummary {
///     generator: "demo".into(),
///     task: Task::Node,
///     transductive: true,
///     splits: vec![SplitSummary { graphs: 1, node_targets: 6, ..SplitSummary::default() }],
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert!(String::from_utf8_lossy(&buffer).contains("0\t1\t6\t0\t0"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let mode = if summary.transductive {
        "transductive"
    } else {
        "inductive"
    };
    writeln!(writer, "generator: {}", summary.generator)?;
    writeln!(writer, "task: {} ({mode})", summary.task)?;
    writeln!(writer, "split\tgraphs\tnodes\tedges\tnegatives")?;
    for (index, split) in summary.splits.iter().enumerate() {
        writeln!(
            writer,
            "{index}\t{}\t{}\t{}\t{}",
            split.graphs, split.node_targets, split.edge_targets, split.negative_edges
        )?;
    }
    Ok(())
}
