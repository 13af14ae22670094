//! End-to-end checks of each disruption scenario.

mod common;

use std::collections::BTreeSet;

use common::{bridged_chain, ring};
use geo::polygon;
use kairo_core::{
    EdgeId, EngineBuilder, HazardZones, NodeId, RemovalFloor, Scenario, ScenarioKind, Severity,
};
use rstest::rstest;

fn severity(value: f64) -> Severity {
    Severity::new(value).expect("severity in range")
}

#[rstest]
#[case(0.0)]
#[case(0.5)]
#[case(1.0)]
fn bridge_collapse_takes_the_single_bridge(#[case] level: f64) {
    let (graph, bridge) = bridged_chain();
    let engine = EngineBuilder::new().build().expect("configuration must be valid");
    let selected = engine.select_edges(&graph, &Scenario::BridgeCollapse, severity(level), Some(1));
    assert_eq!(selected, BTreeSet::from([bridge]));
}

#[rstest]
fn exact_floor_allows_empty_selection() {
    let (graph, _) = bridged_chain();
    let engine = EngineBuilder::new()
        .with_removal_floor(RemovalFloor::Exact)
        .build()
        .expect("configuration must be valid");
    let selected = engine.select_edges(&graph, &Scenario::BridgeCollapse, severity(0.5), Some(1));
    assert!(selected.is_empty());
}

#[rstest]
fn tunnel_closure_without_tunnels_is_undisturbed() {
    let (graph, _) = bridged_chain();
    let engine = EngineBuilder::new().build().expect("configuration must be valid");
    let outcome = engine
        .run_scenario(&graph, &Scenario::TunnelClosure, severity(1.0), Some(2))
        .expect("run must succeed");
    assert!(outcome.removed().is_empty());
    assert_eq!(outcome.result().n_pairs(), 0);
}

#[rstest]
fn targeted_attack_at_full_severity_takes_every_edge() {
    let graph = ring();
    let engine = EngineBuilder::new()
        .with_exact_centrality()
        .build()
        .expect("configuration must be valid");
    let selected = engine.select_edges(&graph, &Scenario::TargetedAttack, severity(1.0), None);
    assert_eq!(selected, graph.edge_ids().collect::<BTreeSet<_>>());
}

#[rstest]
fn targeted_attack_removes_both_directions_of_the_busiest_link() {
    let (graph, _) = bridged_chain();
    let engine = EngineBuilder::new()
        .with_exact_centrality()
        .build()
        .expect("configuration must be valid");
    // One link out of nine; the central link 4 - 5 carries the most paths.
    let selected = engine.select_edges(&graph, &Scenario::TargetedAttack, severity(0.1), None);
    let expected = BTreeSet::from([
        EdgeId::new(NodeId::new(4), NodeId::new(5), 0),
        EdgeId::new(NodeId::new(5), NodeId::new(4), 0),
    ]);
    assert_eq!(selected, expected);
}

#[rstest]
fn highway_flood_falls_back_to_major_roads() {
    let graph = ring();
    let engine = EngineBuilder::new().build().expect("configuration must be valid");
    let selected = engine.select_edges(
        &graph,
        &Scenario::from(ScenarioKind::HighwayFlood),
        severity(1.0),
        Some(5),
    );
    let expected = BTreeSet::from([
        EdgeId::new(NodeId::new(0), NodeId::new(1), 0),
        EdgeId::new(NodeId::new(1), NodeId::new(0), 0),
    ]);
    assert_eq!(selected, expected);
}

#[rstest]
fn highway_flood_uses_hazard_zones() {
    let graph = ring();
    let zone = polygon![
        (x: 0.9, y: 0.2),
        (x: 1.1, y: 0.2),
        (x: 1.1, y: 0.8),
        (x: 0.9, y: 0.8),
    ];
    let scenario = Scenario::flood(HazardZones::new(vec![zone]));
    let engine = EngineBuilder::new().build().expect("configuration must be valid");
    let selected = engine.select_edges(&graph, &scenario, severity(1.0), Some(5));
    let expected = BTreeSet::from([
        EdgeId::new(NodeId::new(1), NodeId::new(2), 0),
        EdgeId::new(NodeId::new(2), NodeId::new(1), 0),
    ]);
    assert_eq!(selected, expected);
}

#[rstest]
fn random_failure_is_reproducible_per_seed() {
    let (graph, _) = bridged_chain();
    let engine = EngineBuilder::new().build().expect("configuration must be valid");
    let first = engine.select_edges(&graph, &Scenario::RandomFailure, severity(0.3), Some(9));
    let second = engine.select_edges(&graph, &Scenario::RandomFailure, severity(0.3), Some(9));
    assert_eq!(first, second);
    assert_eq!(first.len(), 5);
}

#[rstest]
fn scenario_names_round_trip() {
    for kind in ScenarioKind::ALL {
        let parsed: Scenario = kind.name().parse().expect("known name must parse");
        assert_eq!(parsed.kind(), kind);
    }
    assert!("earthquake".parse::<Scenario>().is_err());
}
