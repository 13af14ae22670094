//! Before/after shortest-path comparison for one disruption.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::{
    Result,
    error::KairoError,
    graph::{EdgeId, RoadGraph},
    routing::{CostModel, PathHeuristic, Router},
    sampling::sample_od_pairs,
};

/// Default ratio recorded for a pair the disruption disconnects.
pub const DEFAULT_PENALTY_RATIO: f64 = 5.0;

/// Aggregate resilience metrics for one disruption.
///
/// Ratios compare damaged to baseline travel cost for each evaluated pair, so
/// `1.0` means unaffected. A pair that stays connected has its ratio capped at
/// the penalty ratio: a detour costlier than the penalty weighs on the mean
/// and median exactly like a disconnection, yet only pairs that lost every
/// path count towards [`Self::pct_disconnected`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationResult {
    avg_ratio: f64,
    median_ratio: f64,
    pct_disconnected: f64,
    n_removed_edges: usize,
    n_pairs: usize,
}

impl SimulationResult {
    /// Result of a disruption that removed nothing.
    pub const UNDISTURBED: Self = Self {
        avg_ratio: 1.0,
        median_ratio: 1.0,
        pct_disconnected: 0.0,
        n_removed_edges: 0,
        n_pairs: 0,
    };

    /// Assembles a result from its fields.
    #[must_use]
    pub const fn new(
        avg_ratio: f64,
        median_ratio: f64,
        pct_disconnected: f64,
        n_removed_edges: usize,
        n_pairs: usize,
    ) -> Self {
        Self {
            avg_ratio,
            median_ratio,
            pct_disconnected,
            n_removed_edges,
            n_pairs,
        }
    }

    /// Mean damaged/baseline cost ratio, each ratio within `[1, penalty]`.
    #[rustfmt::skip]
    #[must_use]
    pub const fn avg_ratio(&self) -> f64 { self.avg_ratio }

    /// Median damaged/baseline cost ratio.
    #[rustfmt::skip]
    #[must_use]
    pub const fn median_ratio(&self) -> f64 { self.median_ratio }

    /// Percentage (0–100) of evaluated pairs left without a path.
    #[rustfmt::skip]
    #[must_use]
    pub const fn pct_disconnected(&self) -> f64 { self.pct_disconnected }

    /// Number of edges actually removed.
    #[rustfmt::skip]
    #[must_use]
    pub const fn n_removed_edges(&self) -> usize { self.n_removed_edges }

    /// Number of pairs evaluated.
    #[rustfmt::skip]
    #[must_use]
    pub const fn n_pairs(&self) -> usize { self.n_pairs }
}

/// Validates a disconnection penalty.
pub(crate) fn check_penalty(penalty_ratio: f64) -> Result<f64> {
    if penalty_ratio.is_finite() && penalty_ratio >= 1.0 {
        Ok(penalty_ratio)
    } else {
        Err(KairoError::InvalidPenaltyRatio { got: penalty_ratio })
    }
}

/// Parameters of one simulation call besides the graph and removal set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SimulationParams {
    pub(crate) n_pairs: usize,
    pub(crate) penalty_ratio: f64,
    pub(crate) seed: Option<u64>,
    pub(crate) heuristic: PathHeuristic,
}

pub(crate) fn simulate(
    graph: &RoadGraph,
    edges_to_remove: &BTreeSet<EdgeId>,
    params: SimulationParams,
) -> Result<SimulationResult> {
    let penalty = check_penalty(params.penalty_ratio)?;

    let mut damaged = graph.clone();
    let n_removed = edges_to_remove
        .iter()
        .filter(|edge| damaged.remove_edge(edge).is_some())
        .count();
    if n_removed == 0 {
        return Ok(SimulationResult::UNDISTURBED);
    }

    let pairs = sample_od_pairs(graph, params.n_pairs, params.seed)?;
    let baseline_router = Router::new(graph, CostModel::for_graph(graph), params.heuristic);
    let damaged_router = baseline_router.on(&damaged);

    let mut ratios = Vec::with_capacity(pairs.len());
    let mut disconnected = 0_usize;
    for pair in &pairs {
        let Some(baseline) = baseline_router.cost(pair.source(), pair.target()) else {
            continue;
        };
        match damaged_router.cost(pair.source(), pair.target()) {
            Some(cost) => ratios.push(connected_ratio(baseline, cost, penalty)),
            None => {
                disconnected += 1;
                ratios.push(penalty);
            }
        }
    }

    if ratios.is_empty() {
        warn!(
            sampled = pairs.len(),
            n_removed, "no pair had a baseline path, reporting the penalty"
        );
        return Ok(SimulationResult::new(
            penalty,
            penalty,
            100.0,
            n_removed,
            pairs.len(),
        ));
    }

    let result = aggregate(ratios, disconnected, n_removed);
    debug!(
        avg_ratio = result.avg_ratio,
        median_ratio = result.median_ratio,
        pct_disconnected = result.pct_disconnected,
        n_removed,
        n_pairs = result.n_pairs,
        model = ?baseline_router.model(),
        "simulation aggregated"
    );
    Ok(result)
}

/// Ratio for a pair that stays connected, kept within `[1, penalty]`.
fn connected_ratio(baseline: f64, damaged: f64, penalty: f64) -> f64 {
    if baseline > 0.0 {
        (damaged / baseline).clamp(1.0, penalty)
    } else if damaged > 0.0 {
        penalty
    } else {
        1.0
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "pair counts stay far below 2^52"
)]
fn aggregate(mut ratios: Vec<f64>, disconnected: usize, n_removed: usize) -> SimulationResult {
    let count = ratios.len();
    let mean = ratios.iter().sum::<f64>() / count as f64;
    ratios.sort_by(f64::total_cmp);
    let middle = count / 2;
    let median = if count % 2 == 0 {
        let lower = ratios.get(middle.saturating_sub(1)).copied().unwrap_or(mean);
        let upper = ratios.get(middle).copied().unwrap_or(mean);
        (lower + upper) / 2.0
    } else {
        ratios.get(middle).copied().unwrap_or(mean)
    };
    let pct_disconnected = 100.0 * disconnected as f64 / count as f64;
    SimulationResult::new(mean, median, pct_disconnected, n_removed, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeAttributes, Node, NodeId, test_utils::grid};

    use rstest::rstest;

    fn params(n_pairs: usize, seed: u64) -> SimulationParams {
        SimulationParams {
            n_pairs,
            penalty_ratio: DEFAULT_PENALTY_RATIO,
            seed: Some(seed),
            heuristic: PathHeuristic::Euclidean,
        }
    }

    #[test]
    fn no_removal_short_circuits() {
        let graph = grid(3, 3);
        let absent = BTreeSet::from([EdgeId::new(NodeId::new(0), NodeId::new(8), 0)]);
        let empty = simulate(&graph, &BTreeSet::new(), params(10, 1)).expect("simulate");
        let missing = simulate(&graph, &absent, params(10, 1)).expect("simulate");
        assert_eq!(empty, SimulationResult::UNDISTURBED);
        assert_eq!(empty, missing);
    }

    #[test]
    fn cutting_the_only_route_applies_the_penalty() {
        // Two-way street 0 <-> 1: removing both directions disconnects every pair.
        let mut graph = RoadGraph::new();
        graph.add_node(NodeId::new(0), Node::at(0.0, 0.0));
        graph.add_node(NodeId::new(1), Node::at(1.0, 0.0));
        let forward = graph
            .add_edge(NodeId::new(0), NodeId::new(1), EdgeAttributes::new(1.0))
            .expect("edge must insert");
        let backward = graph
            .add_edge(NodeId::new(1), NodeId::new(0), EdgeAttributes::new(1.0))
            .expect("edge must insert");

        let result = simulate(&graph, &BTreeSet::from([forward, backward]), params(4, 2))
            .expect("simulate");
        assert_eq!(result.avg_ratio(), DEFAULT_PENALTY_RATIO);
        assert_eq!(result.median_ratio(), DEFAULT_PENALTY_RATIO);
        assert_eq!(result.pct_disconnected(), 100.0);
        assert_eq!(result.n_removed_edges(), 2);
        assert_eq!(result.n_pairs(), 4);
    }

    #[test]
    fn detour_raises_the_ratio() {
        let mut graph = grid(2, 2);
        // Without the direct street 2 -> 3 the trip detours through 0 and 1.
        let removed = BTreeSet::from([EdgeId::new(NodeId::new(2), NodeId::new(3), 0)]);
        let result = simulate(&graph, &removed, params(20, 4)).expect("simulate");
        assert!(result.avg_ratio() >= 1.0);
        assert!(result.avg_ratio() <= DEFAULT_PENALTY_RATIO);
        assert_eq!(result.pct_disconnected(), 0.0);
        assert_eq!(result.n_removed_edges(), 1);

        // The same inputs reproduce bit for bit.
        let again = simulate(&graph, &removed, params(20, 4)).expect("simulate");
        assert_eq!(result, again);

        graph
            .add_edge(NodeId::new(2), NodeId::new(3), EdgeAttributes::new(1.0))
            .expect("parallel edge must insert");
        let with_spare = simulate(&graph, &removed, params(20, 4)).expect("simulate");
        assert_eq!(with_spare.avg_ratio(), 1.0);
    }

    #[test]
    fn severe_detour_is_capped_but_stays_connected() {
        // One-way 0 -> 1 with a spare carriageway twenty times longer.
        let mut graph = RoadGraph::new();
        graph.add_node(NodeId::new(0), Node::at(0.0, 0.0));
        graph.add_node(NodeId::new(1), Node::at(1.0, 0.0));
        let direct = graph
            .add_edge(NodeId::new(0), NodeId::new(1), EdgeAttributes::new(1.0))
            .expect("edge must insert");
        graph
            .add_edge(NodeId::new(0), NodeId::new(1), EdgeAttributes::new(20.0))
            .expect("parallel edge must insert");

        let result = simulate(&graph, &BTreeSet::from([direct]), params(4, 3)).expect("simulate");
        assert_eq!(result.avg_ratio(), DEFAULT_PENALTY_RATIO);
        assert_eq!(result.median_ratio(), DEFAULT_PENALTY_RATIO);
        assert_eq!(result.pct_disconnected(), 0.0);
        assert!(result.n_pairs() >= 1);
    }

    #[rstest]
    #[case::nan(f64::NAN)]
    #[case::below_one(0.5)]
    #[case::infinite(f64::INFINITY)]
    fn rejects_invalid_penalty(#[case] penalty: f64) {
        let graph = grid(2, 2);
        let err = simulate(
            &graph,
            &BTreeSet::new(),
            SimulationParams {
                penalty_ratio: penalty,
                ..params(5, 0)
            },
        )
        .expect_err("penalty must be rejected");
        assert!(matches!(err, KairoError::InvalidPenaltyRatio { .. }));
    }

    #[rstest]
    #[case::longer(2.0, 3.0, 1.5)]
    #[case::faster_is_clamped(2.0, 1.0, 1.0)]
    #[case::huge_is_clamped(1.0, 100.0, 5.0)]
    #[case::zero_to_zero(0.0, 0.0, 1.0)]
    #[case::zero_to_positive(0.0, 1.0, 5.0)]
    fn connected_ratio_bounds(#[case] baseline: f64, #[case] damaged: f64, #[case] expected: f64) {
        assert_eq!(connected_ratio(baseline, damaged, 5.0), expected);
    }

    #[test]
    fn even_count_median_averages_middle_values() {
        let result = aggregate(vec![4.0, 1.0, 2.0, 5.0], 1, 3);
        assert_eq!(result.median_ratio(), 3.0);
        assert_eq!(result.avg_ratio(), 3.0);
        assert_eq!(result.pct_disconnected(), 25.0);
        assert_eq!(result.n_pairs(), 4);
    }
}
