//! Command-line interface orchestration for kairo.
//!
//! `simulate` runs one disruption scenario against a JSON road graph;
//! `sweep` runs repeated experiments over scenarios and severities and
//! summarises them.

mod commands;
mod failure;
mod render;

pub use commands::{
    CentralityArg, Cli, CliError, Command, EngineArgs, ExecutionSummary, OutputFormat, Report,
    ScenarioArg, SimulateCommand, SimulationReport, SweepCommand, SweepReport, run_cli,
};
pub use failure::{Failure, FailureStage};
pub use render::render_summary;

#[cfg(test)]
mod test_helpers;
