//! Kairo core library: road-network disruption scenarios and their impact
//! on shortest-path travel.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod centrality;
mod engine;
mod error;
mod experiment;
mod graph;
mod hazard;
mod routing;
mod sampling;
mod scenario;
mod selection;
mod severity;
mod simulation;

#[cfg(test)]
mod test_utils;

pub use crate::{
    builder::{DEFAULT_PAIRS, EngineBuilder, ExecutionStrategy},
    centrality::{
        CentralityMode, CentralityRanking, DEFAULT_CENTRALITY_SOURCES, RankedLink, RankingCache,
        edge_betweenness,
    },
    engine::{Engine, ScenarioOutcome},
    error::{GraphError, GraphErrorCode, KairoError, KairoErrorCode, Result},
    experiment::{
        DEFAULT_SWEEP_PAIRS, DEFAULT_SWEEP_RUNS, DEFAULT_SWEEP_SEED, DEFAULT_SWEEP_SEVERITIES,
        RUN_SEED_BOUND, RunRecord, SettingSummary, SweepPlan, SweepSummary, summarise,
    },
    graph::{
        EdgeAttributes, EdgeId, GraphFingerprint, Node, NodeId, NodePair, RoadGraph,
        largest_weak_component,
    },
    hazard::HazardZones,
    routing::{CostModel, PathHeuristic, Router, has_path, shortest_path_cost},
    sampling::{ATTEMPTS_PER_PAIR, OdPair, sample_od_pairs},
    scenario::{MajorRoadPolicy, Scenario, ScenarioKind},
    severity::{RemovalFloor, Severity},
    simulation::{DEFAULT_PENALTY_RATIO, SimulationResult},
};
