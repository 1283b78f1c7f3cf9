//! Command-line orchestration for estimation tasks.
//!
//! The binary takes a configuration file and an optional task id,
//! runs the estimation task, and prints the final parameter vector to
//! stdout. Convergence checks, standard errors from pooled tasks, and
//! goodness-of-fit all happen downstream on the files the task writes.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use tangle_core::{EstimConfig, EstimError, EstimationTask, TaskSummary};
use thiserror::Error;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "tangle",
    about = "Estimate directed ERGM parameters by equilibrium expectation."
)]
pub struct Cli {
    /// Path to the estimation configuration file.
    pub config: PathBuf,

    /// Task id: tags the output files and decorrelates the random stream,
    /// so independent tasks can run as parallel processes.
    #[arg(default_value_t = 0)]
    pub task: u32,
}

/// Errors surfaced while executing the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration, input, or output failure in the estimation core.
    #[error(transparent)]
    Core(#[from] EstimError),
}

impl CliError {
    /// Stable machine-readable code of the underlying failure.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Core(err) => err.code(),
        }
    }
}

/// Executes the command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when the configuration cannot be parsed or the
/// estimation task fails.
pub fn run_cli(cli: Cli) -> Result<TaskSummary, CliError> {
    let config = EstimConfig::parse_file(&cli.config).map_err(EstimError::from)?;
    let summary = EstimationTask::new(config, cli.task).run()?;
    Ok(summary)
}

/// Renders the final parameter vector to `writer`, one effect per line.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &TaskSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(
        writer,
        "nodes: {}  arcs: {}  seed sweeps: {}",
        summary.n, summary.arc_count, summary.seed_iterations
    )?;
    for (name, value) in summary.effect_names.iter().zip(&summary.theta) {
        writeln!(writer, "{name}\t{value}")?;
    }
    Ok(())
}
