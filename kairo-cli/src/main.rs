//! `kairo` binary.
//!
//! Runs one `simulate` or `sweep` command and prints its report. A failure is
//! logged once with its stage and error code, and the exit status names the
//! stage (see [`FailureStage::exit_status`]).
//!
//! [`FailureStage::exit_status`]: kairo_cli::cli::FailureStage::exit_status

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::error;

use kairo_cli::{
    cli::{Cli, Failure, render_summary, run_cli},
    logging::{self, LoggingError},
};

fn execute(cli: Cli) -> anyhow::Result<()> {
    let summary = run_cli(cli)?;
    let mut out = BufWriter::new(io::stdout().lock());
    render_summary(&summary, &mut out).context("failed to write report")?;
    out.flush().context("failed to flush report")
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    let Err(err) = execute(cli) else {
        return ExitCode::SUCCESS;
    };
    let failure = Failure::classify(&err);
    error!(
        stage = failure.stage().as_str(),
        code = failure.code(),
        error = failure.message(),
        "kairo command failed"
    );
    failure.exit_code()
}

#[expect(
    clippy::print_stderr,
    reason = "tracing is unavailable until logging initialises"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("kairo: cannot initialise logging: {err}");
}
