//! Command implementations and argument parsing for the kairo CLI.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use kairo_core::{
    DEFAULT_CENTRALITY_SOURCES, DEFAULT_PAIRS, DEFAULT_PENALTY_RATIO, DEFAULT_SWEEP_PAIRS,
    DEFAULT_SWEEP_RUNS, DEFAULT_SWEEP_SEED, DEFAULT_SWEEP_SEVERITIES, Engine, EngineBuilder,
    ExecutionStrategy, HazardZones, KairoError, MajorRoadPolicy, RemovalFloor, RoadGraph,
    RunRecord, Scenario, ScenarioKind, Severity, SimulationResult, SweepPlan, SweepSummary,
    summarise,
};
use kairo_providers_json::{JsonProviderError, graph_from_reader, hazard_from_reader};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "kairo",
    about = "Simulate road-network disruptions and their effect on travel."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run one scenario at one severity and report the disruption metrics.
    Simulate(SimulateCommand),
    /// Run repeated experiments over scenarios and severities.
    Sweep(SweepCommand),
}

/// Options accepted by the `simulate` command.
#[derive(Debug, Args, Clone)]
pub struct SimulateCommand {
    /// Path to the JSON road graph.
    pub graph: PathBuf,

    /// Disruption scenario to apply.
    #[arg(long, value_enum)]
    pub scenario: ScenarioArg,

    /// Fraction of candidate edges (or ranked links) to remove, in `[0, 1]`.
    #[arg(long)]
    pub severity: f64,

    /// Seed for edge selection and pair sampling; omit for a fresh draw.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Origin-destination pairs to sample.
    #[arg(long, default_value_t = DEFAULT_PAIRS)]
    pub pairs: usize,

    /// Engine options shared with `sweep`.
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Report format written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Options accepted by the `sweep` command.
#[derive(Debug, Args, Clone)]
pub struct SweepCommand {
    /// Path to the JSON road graph.
    pub graph: PathBuf,

    /// Scenarios to run; repeat the flag for several. Defaults to all.
    #[arg(long = "scenario", value_enum)]
    pub scenarios: Vec<ScenarioArg>,

    /// Severities to run; repeat the flag for several.
    #[arg(long = "severity")]
    pub severities: Vec<f64>,

    /// Runs per scenario and severity.
    #[arg(long, default_value_t = DEFAULT_SWEEP_RUNS)]
    pub runs: usize,

    /// Seed of the master generator that derives the run seeds.
    #[arg(long, default_value_t = DEFAULT_SWEEP_SEED)]
    pub seed: u64,

    /// Origin-destination pairs to sample per run.
    #[arg(long, default_value_t = DEFAULT_SWEEP_PAIRS)]
    pub pairs: usize,

    /// Run settings on the rayon thread pool.
    #[arg(long)]
    pub parallel: bool,

    /// Engine options shared with `simulate`.
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Report format written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Engine tuning flags common to every command.
#[derive(Debug, Args, Clone)]
pub struct EngineArgs {
    /// Ratio assigned to trips the disruption disconnects.
    #[arg(long = "penalty", default_value_t = DEFAULT_PENALTY_RATIO)]
    pub penalty_ratio: f64,

    /// JSON hazard zones used by `highway_flood`.
    #[arg(long)]
    pub hazard: Option<PathBuf>,

    /// Edge-betweenness computation used by `targeted_attack`.
    #[arg(long, value_enum, default_value_t = CentralityArg::Approximate)]
    pub centrality: CentralityArg,

    /// Sampled source nodes for approximate centrality.
    #[arg(long = "centrality-sources", default_value_t = DEFAULT_CENTRALITY_SOURCES.get())]
    pub centrality_sources: usize,

    /// Seed for the approximate centrality source sample.
    #[arg(long = "centrality-seed", default_value_t = 0)]
    pub centrality_seed: u64,

    /// Treat secondary roads as major roads in the flood fallback.
    #[arg(long = "include-secondary")]
    pub include_secondary: bool,

    /// Allow severities that round down to zero edges to remove nothing.
    #[arg(long = "no-removal-floor")]
    pub no_removal_floor: bool,
}

/// Scenario names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum ScenarioArg {
    /// Remove bridge edges.
    BridgeCollapse,
    /// Remove tunnel edges.
    TunnelClosure,
    /// Remove flooded edges, or major roads without hazard zones.
    HighwayFlood,
    /// Remove the most central links.
    TargetedAttack,
    /// Remove edges uniformly at random.
    RandomFailure,
}

impl From<ScenarioArg> for ScenarioKind {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::BridgeCollapse => Self::BridgeCollapse,
            ScenarioArg::TunnelClosure => Self::TunnelClosure,
            ScenarioArg::HighwayFlood => Self::HighwayFlood,
            ScenarioArg::TargetedAttack => Self::TargetedAttack,
            ScenarioArg::RandomFailure => Self::RandomFailure,
        }
    }
}

/// Centrality modes accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CentralityArg {
    /// Brandes accumulation from every node.
    Exact,
    /// Brandes accumulation from a seeded sample of nodes.
    Approximate,
}

/// Report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines.
    Text,
    /// A single pretty-printed JSON document.
    Json,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while opening an input document.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Graph or hazard ingestion failed.
    #[error(transparent)]
    Provider(#[from] JsonProviderError),
    /// Engine configuration or execution failed.
    #[error(transparent)]
    Core(#[from] KairoError),
}

impl CliError {
    /// Stable code of the underlying library error, when there is one.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::Io { .. } => None,
            Self::Provider(err) => Some(err.code().as_str()),
            Self::Core(err) => Some(err.code().as_str()),
        }
    }
}

/// Result of a `simulate` command.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    /// Name of the graph (the file stem).
    pub graph: String,
    /// Scenario that ran.
    pub scenario: ScenarioKind,
    /// Severity it ran at.
    pub severity: Severity,
    /// Seed used, if one was supplied.
    pub seed: Option<u64>,
    /// Number of edges the scenario selected.
    pub selected_edges: usize,
    /// Disruption metrics.
    pub result: SimulationResult,
}

/// Result of a `sweep` command.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    /// Name of the graph (the file stem).
    pub graph: String,
    /// One record per run, in plan order.
    pub records: Vec<RunRecord>,
    /// Per-setting means and the most damaging scenario.
    pub summary: SweepSummary,
}

/// Report produced by a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    /// Output of `simulate`.
    Simulation(SimulationReport),
    /// Output of `sweep`.
    Sweep(SweepReport),
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionSummary {
    /// Requested output format.
    pub format: OutputFormat,
    /// Command report.
    pub report: Report,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading inputs, configuring the engine or
/// running the command fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use clap::Parser;
/// # use kairo_cli::cli::{Cli, Report, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(
///     file.path(),
///     r#"{"nodes": [{"id": 0}, {"id": 1}],
///         "edges": [{"u": 0, "v": 1, "length": 1.0, "bridge": "yes"},
///                   {"u": 1, "v": 0, "length": 1.0}]}"#,
/// )?;
/// let path = file.path().to_string_lossy().into_owned();
/// let cli = Cli::try_parse_from([
///     "kairo", "simulate", &path, "--scenario", "bridge_collapse", "--severity", "1", "--seed", "3",
/// ])?;
/// let summary = run_cli(cli)?;
/// let Report::Simulation(report) = summary.report else { panic!("simulate yields a simulation report") };
/// assert_eq!(report.selected_edges, 1);
/// assert!(report.result.avg_ratio() >= 1.0);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Simulate(command) => {
            span.record("command", field::display("simulate"));
            run_simulate(command)
        }
        Command::Sweep(command) => {
            span.record("command", field::display("sweep"));
            run_sweep(command)
        }
    }
}

#[instrument(
    name = "cli.simulate",
    err,
    skip(command),
    fields(graph = %command.graph.display(), scenario = ?command.scenario, severity = command.severity),
)]
pub(super) fn run_simulate(command: SimulateCommand) -> Result<ExecutionSummary, CliError> {
    let SimulateCommand {
        graph: path,
        scenario,
        severity,
        seed,
        pairs,
        engine: engine_args,
        format,
    } = command;
    let severity = Severity::new(severity)?;
    let engine = build_engine(&engine_args, pairs, ExecutionStrategy::Sequential)?;
    let graph = load_road_graph(&path)?;
    let scenario = resolve_scenario(scenario.into(), engine_args.hazard.as_deref())?;

    let outcome = engine.run_scenario(&graph, &scenario, severity, seed)?;
    info!(
        selected = outcome.removed().len(),
        avg_ratio = outcome.result().avg_ratio(),
        "simulate completed"
    );
    Ok(ExecutionSummary {
        format,
        report: Report::Simulation(SimulationReport {
            graph: derive_graph_name(&path),
            scenario: scenario.kind(),
            severity,
            seed,
            selected_edges: outcome.removed().len(),
            result: *outcome.result(),
        }),
    })
}

#[instrument(
    name = "cli.sweep",
    err,
    skip(command),
    fields(graph = %command.graph.display(), runs = command.runs, parallel = command.parallel),
)]
pub(super) fn run_sweep(command: SweepCommand) -> Result<ExecutionSummary, CliError> {
    let SweepCommand {
        graph: path,
        scenarios,
        severities,
        runs,
        seed,
        pairs,
        parallel,
        engine: engine_args,
        format,
    } = command;
    let strategy = if parallel {
        ExecutionStrategy::Parallel
    } else {
        ExecutionStrategy::Sequential
    };
    let engine = build_engine(&engine_args, pairs, strategy)?;
    let severities = if severities.is_empty() {
        DEFAULT_SWEEP_SEVERITIES.to_vec()
    } else {
        severities
    }
    .into_iter()
    .map(Severity::new)
    .collect::<Result<Vec<_>, _>>()?;
    let kinds = if scenarios.is_empty() {
        ScenarioKind::ALL.to_vec()
    } else {
        scenarios.into_iter().map(ScenarioKind::from).collect()
    };
    let graph = load_road_graph(&path)?;
    let scenarios = kinds
        .into_iter()
        .map(|kind| resolve_scenario(kind, engine_args.hazard.as_deref()))
        .collect::<Result<Vec<_>, _>>()?;

    let plan = SweepPlan::default()
        .with_scenarios(scenarios)
        .with_severities(severities)
        .with_runs(runs)
        .with_pairs(pairs)
        .with_seed(Some(seed));
    let records = engine.sweep(&graph, &plan)?;
    let summary = summarise(&records);
    info!(
        records = records.len(),
        settings = summary.settings().len(),
        "sweep completed"
    );
    Ok(ExecutionSummary {
        format,
        report: Report::Sweep(SweepReport {
            graph: derive_graph_name(&path),
            records,
            summary,
        }),
    })
}

pub(super) fn build_engine(
    args: &EngineArgs,
    pairs: usize,
    strategy: ExecutionStrategy,
) -> Result<Engine, CliError> {
    let builder = EngineBuilder::new()
        .with_pairs(pairs)
        .with_penalty_ratio(args.penalty_ratio)
        .with_execution_strategy(strategy)
        .with_major_roads(if args.include_secondary {
            MajorRoadPolicy::IncludeSecondary
        } else {
            MajorRoadPolicy::Primary
        })
        .with_removal_floor(if args.no_removal_floor {
            RemovalFloor::Exact
        } else {
            RemovalFloor::AtLeastOne
        });
    let builder = match args.centrality {
        CentralityArg::Exact => builder.with_exact_centrality(),
        CentralityArg::Approximate => {
            builder.with_approximate_centrality(args.centrality_sources, args.centrality_seed)
        }
    };
    Ok(builder.build()?)
}

fn resolve_scenario(kind: ScenarioKind, hazard: Option<&Path>) -> Result<Scenario, CliError> {
    match (kind, hazard) {
        (ScenarioKind::HighwayFlood, Some(path)) => Ok(Scenario::flood(load_hazard(path)?)),
        _ => Ok(Scenario::from(kind)),
    }
}

#[instrument(name = "cli.load_graph", err, fields(path = %path.display()))]
pub(super) fn load_road_graph(path: &Path) -> Result<RoadGraph, CliError> {
    let graph = graph_from_reader(open_reader(path)?)?;
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "graph loaded"
    );
    Ok(graph)
}

#[instrument(name = "cli.load_hazard", err, fields(path = %path.display()))]
fn load_hazard(path: &Path) -> Result<HazardZones, CliError> {
    Ok(hazard_from_reader(open_reader(path)?)?)
}

fn open_reader(path: &Path) -> Result<BufReader<File>, CliError> {
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

pub(super) fn derive_graph_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|value| value.to_str())
        .map_or_else(|| "graph".to_owned(), ToOwned::to_owned)
}
