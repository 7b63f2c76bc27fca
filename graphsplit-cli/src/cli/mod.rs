//! Command-line interface for splitting generated graph datasets.
//!
//! The `split` command draws random graphs through a generator-backed
//! dataset, splits them for the chosen task, and reports per-split totals.

mod commands;

pub use commands::{
    Cli, CliError, Command, EdgeTrainModeArg, ExecutionSummary, SplitCommand, SplitSummary,
    TaskArg, render_summary, run_cli,
};

#[cfg(test)]
mod tests;
