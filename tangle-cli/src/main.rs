//! CLI entry point for running one estimation task.
//!
//! Parses arguments with clap, runs the task, prints the final parameter
//! vector to stdout, and maps failures to a non-zero exit code. Logging
//! is initialised first so every later step can emit structured
//! diagnostics via `tracing`.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use tangle_cli::{
    cli::{Cli, CliError, render_summary, run_cli},
    logging::{self, LoggingError},
};

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let summary = run_cli(cli).context("estimation task failed")?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_summary(&summary, &mut writer).context("failed to render summary")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        // Surface the stable error code when the failure originated in
        // the estimation core, however deep the context chain.
        let code = err
            .chain()
            .find_map(|cause| {
                let cause: &(dyn std::error::Error + 'static) = cause;
                cause.downcast_ref::<CliError>().map(CliError::code)
            });
        error!(error = %err, code = ?code, "estimation failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Emit a fallback diagnostic to stderr when tracing initialisation fails.
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}
