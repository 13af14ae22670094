//! Shared test utilities for `kairo-core`.

use kairo_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::test_runner::Config as ProptestConfig;

use crate::{EdgeAttributes, Node, NodeId, RoadGraph};

/// Builds a standard proptest configuration from the shared CI profile.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Unit-spaced street grid with two-way streets of length `1.0`.
///
/// Node `r * cols + c` sits at `(c, r)`.
pub(crate) fn grid(rows: u64, cols: u64) -> RoadGraph {
    let mut graph = RoadGraph::new();
    for row in 0..rows {
        for col in 0..cols {
            graph.add_node(NodeId::new(row * cols + col), Node::at(col as f64, row as f64));
        }
    }
    for row in 0..rows {
        for col in 0..cols {
            let here = row * cols + col;
            if col + 1 < cols {
                two_way(&mut graph, here, here + 1);
            }
            if row + 1 < rows {
                two_way(&mut graph, here, here + cols);
            }
        }
    }
    graph
}

/// Two-way chain of `len` nodes where exactly one directed edge, from the
/// middle node onwards, is tagged as a bridge.
pub(crate) fn bridge_line(len: u64) -> RoadGraph {
    let mut graph = RoadGraph::new();
    for id in 0..len {
        graph.add_node(NodeId::new(id), Node::at(id as f64, 0.0));
    }
    let middle = len / 2;
    for id in 1..len {
        let forward = if id == middle {
            EdgeAttributes::new(1.0).with_bridge("yes")
        } else {
            EdgeAttributes::new(1.0)
        };
        graph
            .add_edge(NodeId::new(id - 1), NodeId::new(id), forward)
            .expect("forward edge must insert");
        graph
            .add_edge(NodeId::new(id), NodeId::new(id - 1), EdgeAttributes::new(1.0))
            .expect("backward edge must insert");
    }
    graph
}

fn two_way(graph: &mut RoadGraph, a: u64, b: u64) {
    for (u, v) in [(a, b), (b, a)] {
        graph
            .add_edge(NodeId::new(u), NodeId::new(v), EdgeAttributes::new(1.0))
            .expect("grid edge must insert");
    }
}
