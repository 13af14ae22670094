//! Repeated runs and scenario × severity sweeps.
//!
//! A sweep repeats every setting `runs` times. Each setting draws its run
//! seeds from a master generator seeded with the plan seed, so a setting's
//! records do not depend on which other settings share the sweep.

use std::collections::BTreeMap;

use rand::Rng;
use rayon::prelude::*;
use tracing::{info, instrument};

use crate::{
    Engine, ExecutionStrategy, Result, RoadGraph, Scenario, ScenarioKind, Severity,
    SimulationResult, error::KairoError, selection::call_rng,
};

/// Exclusive upper bound of derived run seeds.
pub const RUN_SEED_BOUND: u64 = 1_000_000_000;

/// Default severities of a sweep.
pub const DEFAULT_SWEEP_SEVERITIES: [f64; 3] = [0.3, 0.5, 0.7];

/// Default pairs per run of a sweep.
pub const DEFAULT_SWEEP_PAIRS: usize = 30;

/// Default runs per sweep setting.
pub const DEFAULT_SWEEP_RUNS: usize = 5;

/// Default master seed of a sweep.
pub const DEFAULT_SWEEP_SEED: u64 = 42;

/// One run of one scenario at one severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunRecord {
    run: usize,
    run_seed: u64,
    scenario: ScenarioKind,
    severity: Severity,
    result: SimulationResult,
}

impl RunRecord {
    /// Zero-based run index within its setting.
    #[rustfmt::skip]
    #[must_use]
    pub const fn run(&self) -> usize { self.run }

    /// Seed used for both selection and sampling in this run.
    #[rustfmt::skip]
    #[must_use]
    pub const fn run_seed(&self) -> u64 { self.run_seed }

    /// Scenario of the run.
    #[rustfmt::skip]
    #[must_use]
    pub const fn scenario(&self) -> ScenarioKind { self.scenario }

    /// Severity of the run.
    #[rustfmt::skip]
    #[must_use]
    pub const fn severity(&self) -> Severity { self.severity }

    /// Metrics of the run.
    #[rustfmt::skip]
    #[must_use]
    pub const fn result(&self) -> &SimulationResult { &self.result }
}

/// Settings of a scenario × severity sweep.
///
/// # Examples
/// ```
/// use kairo_core::{ScenarioKind, SweepPlan};
///
/// let plan = SweepPlan::default();
/// assert_eq!(plan.scenarios().len(), ScenarioKind::ALL.len());
/// assert_eq!(plan.severities().len(), 3);
/// assert_eq!((plan.runs(), plan.pairs(), plan.seed()), (5, 30, Some(42)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPlan {
    scenarios: Vec<Scenario>,
    severities: Vec<Severity>,
    runs: usize,
    pairs: usize,
    seed: Option<u64>,
}

impl Default for SweepPlan {
    fn default() -> Self {
        Self {
            scenarios: ScenarioKind::ALL.into_iter().map(Scenario::from).collect(),
            severities: DEFAULT_SWEEP_SEVERITIES
                .into_iter()
                .filter_map(|value| Severity::new(value).ok())
                .collect(),
            runs: DEFAULT_SWEEP_RUNS,
            pairs: DEFAULT_SWEEP_PAIRS,
            seed: Some(DEFAULT_SWEEP_SEED),
        }
    }
}

impl SweepPlan {
    /// Replaces the scenarios.
    #[must_use]
    pub fn with_scenarios(mut self, scenarios: Vec<Scenario>) -> Self {
        self.scenarios = scenarios;
        self
    }

    /// Replaces the severities.
    #[must_use]
    pub fn with_severities(mut self, severities: Vec<Severity>) -> Self {
        self.severities = severities;
        self
    }

    /// Sets the runs per setting.
    #[must_use]
    pub const fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    /// Sets the pairs per run.
    #[must_use]
    pub const fn with_pairs(mut self, pairs: usize) -> Self {
        self.pairs = pairs;
        self
    }

    /// Sets the master seed; `None` draws run seeds from OS entropy.
    #[must_use]
    pub const fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Returns the scenarios.
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Returns the severities.
    #[must_use]
    pub fn severities(&self) -> &[Severity] {
        &self.severities
    }

    /// Returns the runs per setting.
    #[rustfmt::skip]
    #[must_use]
    pub const fn runs(&self) -> usize { self.runs }

    /// Returns the pairs per run.
    #[rustfmt::skip]
    #[must_use]
    pub const fn pairs(&self) -> usize { self.pairs }

    /// Returns the master seed.
    #[rustfmt::skip]
    #[must_use]
    pub const fn seed(&self) -> Option<u64> { self.seed }

    fn validate(&self) -> Result<()> {
        if self.scenarios.is_empty() || self.severities.is_empty() {
            return Err(KairoError::EmptySweepPlan);
        }
        if self.runs == 0 {
            return Err(KairoError::InvalidRunCount { got: self.runs });
        }
        if self.pairs == 0 {
            return Err(KairoError::InvalidPairCount { got: self.pairs });
        }
        Ok(())
    }
}

impl Engine {
    /// Runs `scenario` at `severity` `runs` times with derived run seeds.
    ///
    /// # Errors
    /// Returns [`KairoError::InvalidRunCount`] for zero runs and propagates
    /// simulation errors.
    ///
    /// # Examples
    /// ```
    /// use kairo_core::{EdgeAttributes, EngineBuilder, Node, NodeId, RoadGraph, Scenario, Severity};
    ///
    /// let mut graph = RoadGraph::new();
    /// for id in 0..4 {
    ///     graph.add_node(NodeId::new(id), Node::unplaced());
    /// }
    /// for (u, v) in [(0, 1), (1, 2), (2, 3), (3, 0)] {
    ///     graph.add_edge(NodeId::new(u), NodeId::new(v), EdgeAttributes::new(1.0))?;
    /// }
    ///
    /// let engine = EngineBuilder::new().with_pairs(4).build()?;
    /// let records = engine.run_repeated(&graph, &Scenario::RandomFailure, Severity::new(0.25)?, 3, Some(42))?;
    /// assert_eq!(records.len(), 3);
    /// assert!(records.iter().all(|record| record.result().n_removed_edges() == 1));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn run_repeated(
        &self,
        graph: &RoadGraph,
        scenario: &Scenario,
        severity: Severity,
        runs: usize,
        seed: Option<u64>,
    ) -> Result<Vec<RunRecord>> {
        if runs == 0 {
            return Err(KairoError::InvalidRunCount { got: runs });
        }
        self.run_setting(graph, scenario, severity, runs, self.pairs().get(), seed)
    }

    /// Runs every scenario × severity setting of `plan`.
    ///
    /// Records come back in plan order (scenarios outer, severities inner)
    /// under both execution strategies.
    ///
    /// # Errors
    /// Returns [`KairoError::EmptySweepPlan`], [`KairoError::InvalidRunCount`]
    /// or [`KairoError::InvalidPairCount`] for an invalid plan and propagates
    /// simulation errors.
    #[instrument(
        name = "core.sweep",
        err,
        skip(self, graph, plan),
        fields(
            scenarios = plan.scenarios.len(),
            severities = plan.severities.len(),
            runs = plan.runs,
            strategy = ?self.execution_strategy()
        ),
    )]
    pub fn sweep(&self, graph: &RoadGraph, plan: &SweepPlan) -> Result<Vec<RunRecord>> {
        plan.validate()?;
        let settings: Vec<(&Scenario, Severity)> = plan
            .scenarios
            .iter()
            .flat_map(|scenario| plan.severities.iter().map(move |severity| (scenario, *severity)))
            .collect();

        let parallel = self.execution_strategy() == ExecutionStrategy::Parallel;
        if parallel && plan.scenarios.iter().any(|s| s.kind() == ScenarioKind::TargetedAttack) {
            // Filled here, on the calling thread, so no pool worker waits on
            // a ranking another worker is still computing.
            let _ranking = self.centrality(graph);
        }

        let run = |(scenario, severity): &(&Scenario, Severity)| {
            self.run_setting(graph, scenario, *severity, plan.runs, plan.pairs, plan.seed)
        };
        let batches: Vec<Vec<RunRecord>> = match self.execution_strategy() {
            ExecutionStrategy::Sequential => settings.iter().map(run).collect::<Result<_>>()?,
            ExecutionStrategy::Parallel => settings.par_iter().map(run).collect::<Result<_>>()?,
        };

        let records: Vec<RunRecord> = batches.into_iter().flatten().collect();
        info!(records = records.len(), "sweep completed");
        Ok(records)
    }

    fn run_setting(
        &self,
        graph: &RoadGraph,
        scenario: &Scenario,
        severity: Severity,
        runs: usize,
        pairs: usize,
        seed: Option<u64>,
    ) -> Result<Vec<RunRecord>> {
        let mut master = call_rng(seed);
        (0..runs)
            .map(|run| {
                let run_seed = master.gen_range(0..RUN_SEED_BOUND);
                let removed = self.select_edges(graph, scenario, severity, Some(run_seed));
                let result =
                    self.simulate_with(graph, &removed, pairs, self.penalty_ratio(), Some(run_seed))?;
                Ok(RunRecord {
                    run,
                    run_seed,
                    scenario: scenario.kind(),
                    severity,
                    result,
                })
            })
            .collect()
    }
}

/// Mean metrics of one scenario × severity setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingSummary {
    scenario: ScenarioKind,
    severity: Severity,
    runs: usize,
    mean_avg_ratio: f64,
    mean_median_ratio: f64,
    mean_pct_disconnected: f64,
    mean_removed_edges: f64,
}

impl SettingSummary {
    /// Scenario of the setting.
    #[rustfmt::skip]
    #[must_use]
    pub const fn scenario(&self) -> ScenarioKind { self.scenario }

    /// Severity of the setting.
    #[rustfmt::skip]
    #[must_use]
    pub const fn severity(&self) -> Severity { self.severity }

    /// Number of runs averaged.
    #[rustfmt::skip]
    #[must_use]
    pub const fn runs(&self) -> usize { self.runs }

    /// Mean of the runs' average ratios.
    #[rustfmt::skip]
    #[must_use]
    pub const fn mean_avg_ratio(&self) -> f64 { self.mean_avg_ratio }

    /// Mean of the runs' median ratios.
    #[rustfmt::skip]
    #[must_use]
    pub const fn mean_median_ratio(&self) -> f64 { self.mean_median_ratio }

    /// Mean disconnected percentage.
    #[rustfmt::skip]
    #[must_use]
    pub const fn mean_pct_disconnected(&self) -> f64 { self.mean_pct_disconnected }

    /// Mean number of removed edges.
    #[rustfmt::skip]
    #[must_use]
    pub const fn mean_removed_edges(&self) -> f64 { self.mean_removed_edges }
}

/// Per-setting means plus the scenario with the highest mean ratio.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SweepSummary {
    settings: Vec<SettingSummary>,
    most_damaging: Option<(ScenarioKind, f64)>,
}

impl SweepSummary {
    /// Setting summaries in order of first appearance.
    #[must_use]
    pub fn settings(&self) -> &[SettingSummary] {
        &self.settings
    }

    /// Scenario with the highest mean `avg_ratio` across its runs, with that
    /// mean. Ties go to the scenario listed first in [`ScenarioKind::ALL`].
    #[must_use]
    pub const fn most_damaging(&self) -> Option<(ScenarioKind, f64)> {
        self.most_damaging
    }
}

#[derive(Default)]
struct Totals {
    runs: usize,
    avg_ratio: f64,
    median_ratio: f64,
    pct_disconnected: f64,
    removed_edges: usize,
}

impl Totals {
    fn add(&mut self, result: &SimulationResult) {
        self.runs += 1;
        self.avg_ratio += result.avg_ratio();
        self.median_ratio += result.median_ratio();
        self.pct_disconnected += result.pct_disconnected();
        self.removed_edges += result.n_removed_edges();
    }
}

/// Aggregates run records into per-setting means.
///
/// # Examples
/// ```
/// use kairo_core::summarise;
///
/// let summary = summarise(&[]);
/// assert!(summary.settings().is_empty());
/// assert_eq!(summary.most_damaging(), None);
/// ```
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    reason = "run and edge counts stay far below 2^52"
)]
pub fn summarise(records: &[RunRecord]) -> SweepSummary {
    let mut order: Vec<(ScenarioKind, Severity)> = Vec::new();
    let mut per_setting: BTreeMap<(ScenarioKind, u64), Totals> = BTreeMap::new();
    let mut per_scenario: BTreeMap<ScenarioKind, (f64, usize)> = BTreeMap::new();

    for record in records {
        let key = (record.scenario, record.severity.get().to_bits());
        let totals = per_setting.entry(key).or_insert_with(|| {
            order.push((record.scenario, record.severity));
            Totals::default()
        });
        totals.add(&record.result);
        let scenario = per_scenario.entry(record.scenario).or_insert((0.0, 0));
        scenario.0 += record.result.avg_ratio();
        scenario.1 += 1;
    }

    let settings = order
        .into_iter()
        .filter_map(|(scenario, severity)| {
            let totals = per_setting.get(&(scenario, severity.get().to_bits()))?;
            let runs = totals.runs as f64;
            Some(SettingSummary {
                scenario,
                severity,
                runs: totals.runs,
                mean_avg_ratio: totals.avg_ratio / runs,
                mean_median_ratio: totals.median_ratio / runs,
                mean_pct_disconnected: totals.pct_disconnected / runs,
                mean_removed_edges: totals.removed_edges as f64 / runs,
            })
        })
        .collect();

    let most_damaging = per_scenario
        .into_iter()
        .map(|(scenario, (sum, count))| (scenario, sum / count as f64))
        .fold(None, |best: Option<(ScenarioKind, f64)>, candidate| match best {
            Some(current) if current.1 >= candidate.1 => Some(current),
            _ => Some(candidate),
        });

    SweepSummary {
        settings,
        most_damaging,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EngineBuilder, test_utils::grid};

    use rstest::rstest;

    fn severity(value: f64) -> Severity {
        Severity::new(value).expect("severity must be valid")
    }

    fn record(scenario: ScenarioKind, sev: f64, avg: f64, removed: usize) -> RunRecord {
        RunRecord {
            run: 0,
            run_seed: 0,
            scenario,
            severity: severity(sev),
            result: SimulationResult::new(avg, avg, 0.0, removed, 1),
        }
    }

    #[test]
    fn run_seeds_derive_from_master_seed() {
        let engine = EngineBuilder::new().with_pairs(5).build().expect("builder");
        let graph = grid(3, 3);
        let first = engine
            .run_repeated(&graph, &Scenario::RandomFailure, severity(0.3), 4, Some(42))
            .expect("runs must succeed");
        let second = engine
            .run_repeated(&graph, &Scenario::RandomFailure, severity(0.3), 4, Some(42))
            .expect("runs must succeed");
        assert_eq!(first, second);
        assert!(first.iter().all(|record| record.run_seed() < RUN_SEED_BOUND));
        let runs: Vec<usize> = first.iter().map(RunRecord::run).collect();
        assert_eq!(runs, vec![0, 1, 2, 3]);
    }

    #[rstest]
    #[case::no_scenarios(SweepPlan::default().with_scenarios(Vec::new()), KairoError::EmptySweepPlan)]
    #[case::no_severities(SweepPlan::default().with_severities(Vec::new()), KairoError::EmptySweepPlan)]
    #[case::no_runs(SweepPlan::default().with_runs(0), KairoError::InvalidRunCount { got: 0 })]
    #[case::no_pairs(SweepPlan::default().with_pairs(0), KairoError::InvalidPairCount { got: 0 })]
    fn invalid_plans_are_rejected(#[case] plan: SweepPlan, #[case] expected: KairoError) {
        let engine = EngineBuilder::new().build().expect("builder");
        let err = engine.sweep(&grid(2, 2), &plan).expect_err("plan must be rejected");
        assert_eq!(err, expected);
    }

    #[test]
    fn parallel_sweep_matches_sequential() {
        let graph = grid(3, 3);
        let plan = SweepPlan::default()
            .with_scenarios(vec![Scenario::RandomFailure, Scenario::TargetedAttack])
            .with_severities(vec![severity(0.2), severity(0.6)])
            .with_runs(2)
            .with_pairs(6);
        let sequential = EngineBuilder::new()
            .build()
            .expect("builder")
            .sweep(&graph, &plan)
            .expect("sweep");
        let parallel = EngineBuilder::new()
            .with_execution_strategy(ExecutionStrategy::Parallel)
            .build()
            .expect("builder")
            .sweep(&graph, &plan)
            .expect("sweep");
        assert_eq!(sequential.len(), 8);
        assert_eq!(sequential, parallel);
        let order: Vec<ScenarioKind> = sequential.iter().map(RunRecord::scenario).collect();
        assert_eq!(order[..4], [ScenarioKind::RandomFailure; 4]);
    }

    #[test]
    fn parallel_targeted_sweep_fills_cold_cache_once() {
        let graph = grid(6, 6);
        let severities: Vec<Severity> = (1..=8).map(|step| severity(f64::from(step) / 10.0)).collect();
        let plan = SweepPlan::default()
            .with_scenarios(vec![Scenario::TargetedAttack])
            .with_severities(severities)
            .with_runs(1)
            .with_pairs(4);
        let engine = EngineBuilder::new()
            .with_exact_centrality()
            .with_execution_strategy(ExecutionStrategy::Parallel)
            .build()
            .expect("builder");
        assert!(engine.cache().is_empty());

        let parallel = engine.sweep(&graph, &plan).expect("sweep");
        assert_eq!(engine.cache().len(), 1);

        let sequential = EngineBuilder::new()
            .with_exact_centrality()
            .build()
            .expect("builder")
            .sweep(&graph, &plan)
            .expect("sweep");
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn summary_groups_settings_and_finds_worst_scenario() {
        let records = [
            record(ScenarioKind::RandomFailure, 0.3, 1.0, 2),
            record(ScenarioKind::RandomFailure, 0.3, 2.0, 4),
            record(ScenarioKind::TargetedAttack, 0.3, 4.0, 6),
            record(ScenarioKind::RandomFailure, 0.5, 1.5, 3),
        ];
        let summary = summarise(&records);
        let settings = summary.settings();
        assert_eq!(settings.len(), 3);
        let first = settings.first().expect("first setting");
        assert_eq!(first.scenario(), ScenarioKind::RandomFailure);
        assert_eq!(first.runs(), 2);
        assert_eq!(first.mean_avg_ratio(), 1.5);
        assert_eq!(first.mean_removed_edges(), 3.0);
        assert_eq!(summary.most_damaging(), Some((ScenarioKind::TargetedAttack, 4.0)));
    }
}
