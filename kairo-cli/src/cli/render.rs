//! Text and JSON rendering of command reports.

use std::io::{self, Write};

use kairo_core::{RunRecord, SettingSummary, SimulationResult};
use serde::Serialize;

use super::commands::{ExecutionSummary, OutputFormat, Report, SimulationReport, SweepReport};

#[derive(Serialize)]
struct MetricsJson {
    avg_ratio: f64,
    median_ratio: f64,
    pct_disconnected: f64,
    n_removed_edges: usize,
    n_pairs: usize,
}

impl From<&SimulationResult> for MetricsJson {
    fn from(result: &SimulationResult) -> Self {
        Self {
            avg_ratio: result.avg_ratio(),
            median_ratio: result.median_ratio(),
            pct_disconnected: result.pct_disconnected(),
            n_removed_edges: result.n_removed_edges(),
            n_pairs: result.n_pairs(),
        }
    }
}

#[derive(Serialize)]
struct SimulationJson<'a> {
    graph: &'a str,
    scenario: &'static str,
    severity: f64,
    seed: Option<u64>,
    selected_edges: usize,
    #[serde(flatten)]
    metrics: MetricsJson,
}

#[derive(Serialize)]
struct RunJson {
    run: usize,
    run_seed: u64,
    scenario: &'static str,
    severity: f64,
    #[serde(flatten)]
    metrics: MetricsJson,
}

#[derive(Serialize)]
struct SettingJson {
    scenario: &'static str,
    severity: f64,
    runs: usize,
    mean_avg_ratio: f64,
    mean_median_ratio: f64,
    mean_pct_disconnected: f64,
    mean_removed_edges: f64,
}

#[derive(Serialize)]
struct MostDamagingJson {
    scenario: &'static str,
    mean_avg_ratio: f64,
}

#[derive(Serialize)]
struct SweepJson<'a> {
    graph: &'a str,
    runs: Vec<RunJson>,
    settings: Vec<SettingJson>,
    most_damaging: Option<MostDamagingJson>,
}

impl From<&RunRecord> for RunJson {
    fn from(record: &RunRecord) -> Self {
        Self {
            run: record.run(),
            run_seed: record.run_seed(),
            scenario: record.scenario().name(),
            severity: record.severity().get(),
            metrics: record.result().into(),
        }
    }
}

impl From<&SettingSummary> for SettingJson {
    fn from(setting: &SettingSummary) -> Self {
        Self {
            scenario: setting.scenario().name(),
            severity: setting.severity().get(),
            runs: setting.runs(),
            mean_avg_ratio: setting.mean_avg_ratio(),
            mean_median_ratio: setting.mean_median_ratio(),
            mean_pct_disconnected: setting.mean_pct_disconnected(),
            mean_removed_edges: setting.mean_removed_edges(),
        }
    }
}

/// Renders `summary` to `writer` in the format it requested.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use kairo_cli::cli::{ExecutionSummary, OutputFormat, Report, SimulationReport, render_summary};
/// # use kairo_core::{ScenarioKind, Severity, SimulationResult};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary {
///     format: OutputFormat::Text,
///     report: Report::Simulation(SimulationReport {
///         graph: "demo".into(),
///         scenario: ScenarioKind::RandomFailure,
///         severity: Severity::new(0.5)?,
///         seed: Some(1),
///         selected_edges: 0,
///         result: SimulationResult::UNDISTURBED,
///     }),
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert!(String::from_utf8(buffer)?.contains("avg ratio: 1.0000"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match (&summary.report, summary.format) {
        (Report::Simulation(report), OutputFormat::Text) => simulation_text(report, &mut writer),
        (Report::Sweep(report), OutputFormat::Text) => sweep_text(report, &mut writer),
        (Report::Simulation(report), OutputFormat::Json) => {
            json(&simulation_json(report), &mut writer)
        }
        (Report::Sweep(report), OutputFormat::Json) => json(&sweep_json(report), &mut writer),
    }
}

fn simulation_text(report: &SimulationReport, writer: &mut impl Write) -> io::Result<()> {
    let result = &report.result;
    writeln!(writer, "graph: {}", report.graph)?;
    writeln!(writer, "scenario: {}", report.scenario)?;
    writeln!(writer, "severity: {}", report.severity)?;
    match report.seed {
        Some(seed) => writeln!(writer, "seed: {seed}")?,
        None => writeln!(writer, "seed: <entropy>")?,
    }
    writeln!(writer, "selected edges: {}", report.selected_edges)?;
    writeln!(writer, "removed edges: {}", result.n_removed_edges())?;
    writeln!(writer, "avg ratio: {:.4}", result.avg_ratio())?;
    writeln!(writer, "median ratio: {:.4}", result.median_ratio())?;
    writeln!(writer, "pct disconnected: {:.2}", result.pct_disconnected())?;
    writeln!(writer, "pairs: {}", result.n_pairs())
}

fn sweep_text(report: &SweepReport, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "graph: {}", report.graph)?;
    writeln!(
        writer,
        "run\tscenario\tseverity\trun_seed\tremoved\tavg_ratio\tmedian_ratio\tpct_disconnected\tpairs"
    )?;
    for record in &report.records {
        let result = record.result();
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{:.4}\t{:.4}\t{:.2}\t{}",
            record.run(),
            record.scenario(),
            record.severity(),
            record.run_seed(),
            result.n_removed_edges(),
            result.avg_ratio(),
            result.median_ratio(),
            result.pct_disconnected(),
            result.n_pairs(),
        )?;
    }

    writeln!(writer, "summary")?;
    writeln!(
        writer,
        "scenario\tseverity\truns\tmean_avg_ratio\tmean_median_ratio\tmean_pct_disconnected\tmean_removed"
    )?;
    for setting in report.summary.settings() {
        writeln!(
            writer,
            "{}\t{}\t{}\t{:.4}\t{:.4}\t{:.2}\t{:.1}",
            setting.scenario(),
            setting.severity(),
            setting.runs(),
            setting.mean_avg_ratio(),
            setting.mean_median_ratio(),
            setting.mean_pct_disconnected(),
            setting.mean_removed_edges(),
        )?;
    }
    if let Some((scenario, ratio)) = report.summary.most_damaging() {
        writeln!(writer, "most damaging: {scenario} (mean avg ratio {ratio:.4})")?;
    }
    Ok(())
}

fn simulation_json(report: &SimulationReport) -> SimulationJson<'_> {
    SimulationJson {
        graph: &report.graph,
        scenario: report.scenario.name(),
        severity: report.severity.get(),
        seed: report.seed,
        selected_edges: report.selected_edges,
        metrics: (&report.result).into(),
    }
}

fn sweep_json(report: &SweepReport) -> SweepJson<'_> {
    SweepJson {
        graph: &report.graph,
        runs: report.records.iter().map(RunJson::from).collect(),
        settings: report.summary.settings().iter().map(SettingJson::from).collect(),
        most_damaging: report
            .summary
            .most_damaging()
            .map(|(scenario, mean_avg_ratio)| MostDamagingJson {
                scenario: scenario.name(),
                mean_avg_ratio,
            }),
    }
}

fn json(document: &impl Serialize, writer: &mut impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, document)?;
    writeln!(writer)
}
