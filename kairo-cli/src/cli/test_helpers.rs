//! Small helpers shared across CLI tests.
//!
//! The tests write graph and hazard documents to temporary directories and
//! drive the commands through clap, as a user would.

use std::fs;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use tempfile::TempDir;

use super::{Cli, CliError, ExecutionSummary, run_cli};

/// Two-way chain `0 - 1 - 2 - 3 - 4 - 5` along the x axis. The forward
/// edge `2 -> 3` is a bridge, `0 - 1` is a primary road in both directions
/// and `4 - 5` a secondary road.
pub(super) const CHAIN_GRAPH: &str = r#"{
    "nodes": [
        {"id": 0, "x": 0, "y": 0}, {"id": 1, "x": 1, "y": 0}, {"id": 2, "x": 2, "y": 0},
        {"id": 3, "x": 3, "y": 0}, {"id": 4, "x": 4, "y": 0}, {"id": 5, "x": 5, "y": 0}
    ],
    "edges": [
        {"u": 0, "v": 1, "length": 1.0, "highway": "primary"},
        {"u": 1, "v": 0, "length": 1.0, "highway": "primary"},
        {"u": 1, "v": 2, "length": 1.0},
        {"u": 2, "v": 1, "length": 1.0},
        {"u": 2, "v": 3, "length": 1.0, "bridge": "yes"},
        {"u": 3, "v": 2, "length": 1.0},
        {"u": 3, "v": 4, "length": 1.0},
        {"u": 4, "v": 3, "length": 1.0},
        {"u": 4, "v": 5, "length": 1.0, "highway": "secondary"},
        {"u": 5, "v": 4, "length": 1.0, "highway": "secondary"}
    ]
}"#;

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn write_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

/// Parses `args` (without the binary name) and runs the command.
pub(super) fn run_args(args: &[&str]) -> Result<ExecutionSummary, CliError> {
    let cli = match Cli::try_parse_from(std::iter::once("kairo").chain(args.iter().copied())) {
        Ok(cli) => cli,
        Err(err) => panic!("arguments must parse: {err}"),
    };
    run_cli(cli)
}

pub(super) fn run_args_expecting_error(args: &[&str], panic_msg: &str) -> CliError {
    match run_args(args) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
