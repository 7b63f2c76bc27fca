//! `graphsplit` binary.
//!
//! Generates a synthetic dataset, splits it, and prints one summary row per
//! split. Exits non-zero with the failure's stable code in the log.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use graphsplit_cli::{
    cli::{Cli, CliError, ExecutionSummary, render_summary, run_cli},
    logging::{self, LoggingError},
};
use tracing::{error, field};

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log_failure(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let summary = run_cli(cli).context("split command failed")?;
    write_summary(&summary)
}

fn write_summary(summary: &ExecutionSummary) -> Result<()> {
    let mut out = BufWriter::new(io::stdout().lock());
    render_summary(summary, &mut out).context("failed to render summary")?;
    out.flush().context("failed to flush stdout")
}

fn log_failure(err: &anyhow::Error) {
    let (code, generator_code) = err
        .downcast_ref::<CliError>()
        .map_or((None, None), CliError::codes);
    error!(
        error = %err,
        code = code.map(field::display),
        generator_code = generator_code.map(field::display),
        "graphsplit failed"
    );
}

#[expect(
    clippy::print_stderr,
    reason = "no subscriber exists yet to carry the diagnostic"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("graphsplit: logging setup failed: {err}");
}
