//! Turning a scenario and a severity into a concrete removal set.

use std::{collections::BTreeSet, sync::Arc};

use rand::{SeedableRng, rngs::SmallRng, seq::SliceRandom};

use crate::{
    CentralityRanking, HazardZones, MajorRoadPolicy, RemovalFloor, Scenario, Severity,
    graph::{EdgeAttributes, EdgeId, RoadGraph},
};

/// Policies that shape candidate pools and removal counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct SelectionPolicy {
    pub(crate) major_roads: MajorRoadPolicy,
    pub(crate) floor: RemovalFloor,
}

/// Creates the per-call generator: seeded when `seed` is given, from OS
/// entropy otherwise.
pub(crate) fn call_rng(seed: Option<u64>) -> SmallRng {
    seed.map_or_else(SmallRng::from_entropy, SmallRng::seed_from_u64)
}

/// Selects the edges `scenario` removes at `severity`.
///
/// `ranking` is only invoked for the targeted attack, so the other scenarios
/// never pay for a centrality computation.
pub(crate) fn select_edges<R>(
    graph: &RoadGraph,
    scenario: &Scenario,
    severity: Severity,
    seed: Option<u64>,
    policy: SelectionPolicy,
    ranking: R,
) -> BTreeSet<EdgeId>
where
    R: FnOnce() -> Arc<CentralityRanking>,
{
    match scenario {
        Scenario::BridgeCollapse => {
            let pool = pool_where(graph, |_, attrs| attrs.is_bridge());
            take_fraction(pool, severity, policy.floor, seed)
        }
        Scenario::TunnelClosure => {
            let pool = pool_where(graph, |_, attrs| attrs.is_tunnel());
            take_fraction(pool, severity, policy.floor, seed)
        }
        Scenario::HighwayFlood { hazard } => {
            let pool = flood_pool(graph, hazard.as_ref(), policy.major_roads);
            take_fraction(pool, severity, policy.floor, seed)
        }
        Scenario::TargetedAttack => {
            let ranking = ranking();
            let top = ranking.top_pairs(severity.removal_count(ranking.len(), policy.floor));
            graph
                .edge_ids()
                .filter(|edge| top.contains(&edge.link()))
                .collect()
        }
        Scenario::RandomFailure => {
            take_fraction(graph.edge_ids().collect(), severity, policy.floor, seed)
        }
    }
}

fn pool_where<F>(graph: &RoadGraph, mut keep: F) -> Vec<EdgeId>
where
    F: FnMut(EdgeId, &EdgeAttributes) -> bool,
{
    graph
        .edges()
        .filter(|(edge, attrs)| keep(*edge, attrs))
        .map(|(edge, _)| edge)
        .collect()
}

fn flood_pool(
    graph: &RoadGraph,
    hazard: Option<&HazardZones>,
    major_roads: MajorRoadPolicy,
) -> Vec<EdgeId> {
    match hazard.filter(|zones| !zones.is_empty()) {
        Some(zones) => pool_where(graph, |edge, attrs| zones.floods(graph, edge, attrs)),
        None => pool_where(graph, |_, attrs| {
            attrs
                .highway()
                .iter()
                .any(|class| major_roads.is_major(class))
        }),
    }
}

fn take_fraction(
    mut pool: Vec<EdgeId>,
    severity: Severity,
    floor: RemovalFloor,
    seed: Option<u64>,
) -> BTreeSet<EdgeId> {
    let count = severity.removal_count(pool.len(), floor);
    if count == 0 {
        return BTreeSet::new();
    }
    pool.shuffle(&mut call_rng(seed));
    pool.truncate(count);
    pool.into_iter().collect()
}
