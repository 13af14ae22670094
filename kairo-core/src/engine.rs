//! Disruption engine orchestrating selection, sampling and simulation.
//!
//! Provides the [`Engine`] runtime entry point. The engine owns the
//! centrality ranking cache, so its lifecycle is the cache's lifecycle.

use std::{collections::BTreeSet, num::NonZeroUsize, sync::Arc};

use tracing::{info, instrument};

use crate::{
    CentralityMode, CentralityRanking, EdgeId, ExecutionStrategy, MajorRoadPolicy, OdPair,
    PathHeuristic, RankingCache, RemovalFloor, Result, RoadGraph, Scenario, Severity,
    SimulationResult,
    selection::{self, SelectionPolicy},
    simulation::{self, SimulationParams},
};

/// Validated settings handed from [`crate::EngineBuilder`] to [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct EngineConfig {
    pub(crate) pairs: NonZeroUsize,
    pub(crate) penalty_ratio: f64,
    pub(crate) centrality: CentralityMode,
    pub(crate) major_roads: MajorRoadPolicy,
    pub(crate) removal_floor: RemovalFloor,
    pub(crate) heuristic: PathHeuristic,
    pub(crate) execution_strategy: ExecutionStrategy,
}

/// Removal set and metrics of one scenario run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOutcome {
    removed: BTreeSet<EdgeId>,
    result: SimulationResult,
}

impl ScenarioOutcome {
    /// Returns the edges selected for removal.
    #[must_use]
    pub const fn removed(&self) -> &BTreeSet<EdgeId> {
        &self.removed
    }

    /// Returns the simulation metrics.
    #[must_use]
    pub const fn result(&self) -> &SimulationResult {
        &self.result
    }

    /// Splits the outcome into its parts.
    #[must_use]
    pub fn into_parts(self) -> (BTreeSet<EdgeId>, SimulationResult) {
        (self.removed, self.result)
    }
}

/// Entry point for running disruption scenarios against road graphs.
///
/// # Examples
/// ```
/// use kairo_core::{EdgeAttributes, EngineBuilder, Node, NodeId, RoadGraph, Scenario, Severity};
///
/// let mut graph = RoadGraph::new();
/// for id in 0..3 {
///     graph.add_node(NodeId::new(id), Node::at(id as f64, 0.0));
/// }
/// for (u, v) in [(0, 1), (1, 0), (1, 2), (2, 1)] {
///     graph.add_edge(NodeId::new(u), NodeId::new(v), EdgeAttributes::new(1.0))?;
/// }
/// graph.add_edge(
///     NodeId::new(0),
///     NodeId::new(2),
///     EdgeAttributes::new(2.5).with_bridge("yes"),
/// )?;
///
/// let engine = EngineBuilder::new().with_pairs(5).build()?;
/// let outcome = engine.run_scenario(&graph, &Scenario::BridgeCollapse, Severity::new(0.5)?, Some(7))?;
/// assert_eq!(outcome.removed().len(), 1);
/// assert!(outcome.result().avg_ratio() >= 1.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    cache: RankingCache,
}

impl Engine {
    pub(crate) fn new(config: EngineConfig) -> Self {
        Self {
            config,
            cache: RankingCache::new(),
        }
    }

    /// Returns the default pair count per simulation.
    #[must_use]
    pub const fn pairs(&self) -> NonZeroUsize {
        self.config.pairs
    }

    /// Returns the default disconnection penalty.
    #[must_use]
    pub const fn penalty_ratio(&self) -> f64 {
        self.config.penalty_ratio
    }

    /// Returns the centrality mode used by the targeted attack.
    #[must_use]
    pub const fn centrality_mode(&self) -> CentralityMode {
        self.config.centrality
    }

    /// Returns the major-road policy used by the flood fallback.
    #[must_use]
    pub const fn major_roads(&self) -> MajorRoadPolicy {
        self.config.major_roads
    }

    /// Returns the minimum-removal policy.
    #[must_use]
    pub const fn removal_floor(&self) -> RemovalFloor {
        self.config.removal_floor
    }

    /// Returns the A* heuristic.
    #[must_use]
    pub const fn heuristic(&self) -> PathHeuristic {
        self.config.heuristic
    }

    /// Returns the execution strategy.
    #[must_use]
    pub const fn execution_strategy(&self) -> ExecutionStrategy {
        self.config.execution_strategy
    }

    /// Returns the ranking cache owned by this engine.
    #[must_use]
    pub const fn cache(&self) -> &RankingCache {
        &self.cache
    }

    /// Drops cached rankings for `graph`, returning how many were removed.
    pub fn invalidate(&self, graph: &RoadGraph) -> usize {
        self.cache.invalidate(graph)
    }

    /// Drops every cached ranking.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Returns the (cached) edge-betweenness ranking of `graph`.
    #[instrument(
        name = "core.centrality",
        skip(self, graph),
        fields(nodes = graph.node_count(), edges = graph.edge_count(), mode = ?self.config.centrality),
    )]
    pub fn centrality(&self, graph: &RoadGraph) -> Arc<CentralityRanking> {
        self.cache
            .ranking(graph, self.config.centrality, self.config.execution_strategy)
    }

    /// Selects the edges `scenario` removes at `severity`.
    ///
    /// With `Some(seed)` the selection is reproducible; with `None` a fresh
    /// generator is seeded from OS entropy.
    ///
    /// # Examples
    /// ```
    /// use kairo_core::{EdgeAttributes, EngineBuilder, Node, NodeId, RoadGraph, Scenario, Severity};
    ///
    /// let mut graph = RoadGraph::new();
    /// for id in 0..10 {
    ///     graph.add_node(NodeId::new(id), Node::unplaced());
    /// }
    /// for id in 1..10 {
    ///     graph.add_edge(NodeId::new(id - 1), NodeId::new(id), EdgeAttributes::new(1.0))?;
    /// }
    /// let bridge = graph.add_edge(
    ///     NodeId::new(4),
    ///     NodeId::new(5),
    ///     EdgeAttributes::new(1.0).with_bridge("yes"),
    /// )?;
    ///
    /// let engine = EngineBuilder::new().build()?;
    /// let selected = engine.select_edges(&graph, &Scenario::BridgeCollapse, Severity::new(0.5)?, Some(1));
    /// assert_eq!(selected.into_iter().collect::<Vec<_>>(), vec![bridge]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[instrument(
        name = "core.select_edges",
        skip(self, graph, scenario),
        fields(scenario = %scenario, severity = %severity, seed = ?seed, edges = graph.edge_count()),
    )]
    pub fn select_edges(
        &self,
        graph: &RoadGraph,
        scenario: &Scenario,
        severity: Severity,
        seed: Option<u64>,
    ) -> BTreeSet<EdgeId> {
        let selected = selection::select_edges(
            graph,
            scenario,
            severity,
            seed,
            self.selection_policy(),
            || self.centrality(graph),
        );
        info!(selected = selected.len(), "edges selected");
        selected
    }

    /// Samples connected origin–destination pairs.
    ///
    /// # Errors
    /// See [`crate::sample_od_pairs`].
    #[instrument(name = "core.sample_od_pairs", err, skip(self, graph), fields(nodes = graph.node_count()))]
    pub fn sample_od_pairs(
        &self,
        graph: &RoadGraph,
        n_pairs: usize,
        seed: Option<u64>,
    ) -> Result<Vec<OdPair>> {
        crate::sampling::sample_od_pairs(graph, n_pairs, seed)
    }

    /// Simulates removing `edges_to_remove` with the engine's pair count and
    /// penalty.
    ///
    /// # Errors
    /// Returns [`crate::KairoError::SamplingExhausted`] when no connected
    /// pair can be drawn from the undamaged graph.
    pub fn simulate(
        &self,
        graph: &RoadGraph,
        edges_to_remove: &BTreeSet<EdgeId>,
        seed: Option<u64>,
    ) -> Result<SimulationResult> {
        self.simulate_with(
            graph,
            edges_to_remove,
            self.config.pairs.get(),
            self.config.penalty_ratio,
            seed,
        )
    }

    /// Simulates removing `edges_to_remove` with explicit pair count and
    /// penalty.
    ///
    /// # Errors
    /// Returns [`crate::KairoError::InvalidPenaltyRatio`],
    /// [`crate::KairoError::InvalidPairCount`] or
    /// [`crate::KairoError::SamplingExhausted`].
    #[instrument(
        name = "core.simulate",
        err,
        skip(self, graph, edges_to_remove),
        fields(requested = edges_to_remove.len(), n_pairs = n_pairs, penalty_ratio = penalty_ratio, seed = ?seed),
    )]
    pub fn simulate_with(
        &self,
        graph: &RoadGraph,
        edges_to_remove: &BTreeSet<EdgeId>,
        n_pairs: usize,
        penalty_ratio: f64,
        seed: Option<u64>,
    ) -> Result<SimulationResult> {
        simulation::simulate(
            graph,
            edges_to_remove,
            SimulationParams {
                n_pairs,
                penalty_ratio,
                seed,
                heuristic: self.config.heuristic,
            },
        )
    }

    /// Selects edges for `scenario` and simulates their removal, using the
    /// same seed for both steps.
    ///
    /// # Errors
    /// Propagates errors from [`Self::simulate`].
    #[instrument(
        name = "core.run_scenario",
        err,
        skip(self, graph, scenario),
        fields(scenario = %scenario, severity = %severity, seed = ?seed),
    )]
    pub fn run_scenario(
        &self,
        graph: &RoadGraph,
        scenario: &Scenario,
        severity: Severity,
        seed: Option<u64>,
    ) -> Result<ScenarioOutcome> {
        let removed = self.select_edges(graph, scenario, severity, seed);
        let result = self.simulate(graph, &removed, seed)?;
        info!(
            removed = result.n_removed_edges(),
            avg_ratio = result.avg_ratio(),
            pct_disconnected = result.pct_disconnected(),
            "scenario completed"
        );
        Ok(ScenarioOutcome { removed, result })
    }

    const fn selection_policy(&self) -> SelectionPolicy {
        SelectionPolicy {
            major_roads: self.config.major_roads,
            floor: self.config.removal_floor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EngineBuilder, KairoError, test_utils::grid};

    #[test]
    fn centrality_is_cached_per_graph() {
        let engine = EngineBuilder::new()
            .with_exact_centrality()
            .build()
            .expect("builder must succeed");
        let graph = grid(3, 3);
        let first = engine.centrality(&graph);
        let second = engine.centrality(&graph);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(engine.invalidate(&graph), 1);
        engine.clear_cache();
        assert!(engine.cache().is_empty());
    }

    #[test]
    fn non_targeted_scenarios_leave_cache_untouched() {
        let engine = EngineBuilder::new().build().expect("builder must succeed");
        let graph = grid(3, 3);
        let _selected = engine.select_edges(&graph, &Scenario::RandomFailure, Severity::FULL, Some(1));
        assert!(engine.cache().is_empty());
    }

    #[test]
    fn simulate_with_validates_pairs() {
        let engine = EngineBuilder::new().build().expect("builder must succeed");
        let graph = grid(2, 2);
        let removed = BTreeSet::from([EdgeId::new(crate::NodeId::new(0), crate::NodeId::new(1), 0)]);
        let err = engine
            .simulate_with(&graph, &removed, 0, 5.0, Some(1))
            .expect_err("zero pairs must fail");
        assert_eq!(err, KairoError::InvalidPairCount { got: 0 });
    }
}
