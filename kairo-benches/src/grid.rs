//! Seeded synthetic street grids.
//!
//! Intersections sit on integer coordinates and every street is two-way.
//! Row zero is a primary road, every `bridge_every`-th column crosses a
//! river between rows one and two, and street lengths carry a small seeded
//! jitter so shortest paths are unique.

use kairo_core::{EdgeAttributes, GraphError, Node, NodeId, RoadGraph};
use rand::{Rng, SeedableRng, rngs::SmallRng};

use crate::error::BenchSetupError;

/// Errors that may occur during grid generation.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum GridError {
    /// The grid needs at least two intersections per side.
    #[error("grid side must be at least 2 (got {0})")]
    SideTooSmall(usize),
    /// `bridge_every` was zero.
    #[error("bridge spacing must be greater than zero")]
    ZeroBridgeSpacing,
}

/// Configuration for synthetic grid generation.
#[derive(Clone, Debug)]
pub struct GridConfig {
    /// Intersections per side.
    pub side: usize,
    /// Spacing between bridged columns.
    pub bridge_every: usize,
    /// RNG seed for street length jitter.
    pub seed: u64,
}

/// Builds the grid described by `config`.
///
/// # Errors
/// Returns [`BenchSetupError::Grid`] for an invalid configuration.
///
/// # Examples
/// ```
/// use kairo_benches::grid::{GridConfig, build_grid};
///
/// let graph = build_grid(&GridConfig { side: 3, bridge_every: 2, seed: 7 })?;
/// assert_eq!(graph.node_count(), 9);
/// assert_eq!(graph.edge_count(), 24);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn build_grid(config: &GridConfig) -> Result<RoadGraph, BenchSetupError> {
    let side = config.side;
    if side < 2 {
        return Err(GridError::SideTooSmall(side).into());
    }
    if config.bridge_every == 0 {
        return Err(GridError::ZeroBridgeSpacing.into());
    }

    let mut rng = SmallRng::seed_from_u64(config.seed);
    let mut graph = RoadGraph::new();
    for row in 0..side {
        for col in 0..side {
            graph.add_node(node_id(side, row, col), Node::at(coord(col), coord(row)));
        }
    }

    for row in 0..side {
        for col in 0..side {
            if col + 1 < side {
                let attrs = street(&mut rng);
                let attrs = if row == 0 { attrs.with_highway("primary") } else { attrs };
                link(&mut graph, node_id(side, row, col), node_id(side, row, col + 1), &attrs)?;
            }
            if row + 1 < side {
                let attrs = street(&mut rng);
                let attrs = if row == 1 && col % config.bridge_every == 0 {
                    attrs.with_bridge("yes")
                } else {
                    attrs
                };
                link(&mut graph, node_id(side, row, col), node_id(side, row + 1, col), &attrs)?;
            }
        }
    }
    Ok(graph)
}

fn node_id(side: usize, row: usize, col: usize) -> NodeId {
    NodeId::new((row * side + col) as u64)
}

#[expect(clippy::cast_precision_loss, reason = "grid sides stay far below 2^52")]
fn coord(index: usize) -> f64 {
    index as f64
}

fn street(rng: &mut SmallRng) -> EdgeAttributes {
    EdgeAttributes::new(rng.gen_range(1.0..1.1))
}

fn link(
    graph: &mut RoadGraph,
    a: NodeId,
    b: NodeId,
    attrs: &EdgeAttributes,
) -> Result<(), GraphError> {
    graph.add_edge(a, b, attrs.clone())?;
    graph.add_edge(b, a, attrs.clone())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn config(side: usize, bridge_every: usize) -> GridConfig {
        GridConfig {
            side,
            bridge_every,
            seed: 42,
        }
    }

    #[rstest]
    #[case(2, 8)]
    #[case(4, 48)]
    fn grid_has_two_way_streets(#[case] side: usize, #[case] edges: usize) {
        let graph = build_grid(&config(side, 1)).expect("valid grid");
        assert_eq!(graph.node_count(), side * side);
        assert_eq!(graph.edge_count(), edges);
    }

    #[rstest]
    fn bridges_follow_spacing() {
        let graph = build_grid(&config(5, 2)).expect("valid grid");
        let bridges = graph.edges().filter(|(_, attrs)| attrs.is_bridge()).count();
        // Columns 0, 2 and 4 in both directions.
        assert_eq!(bridges, 6);
    }

    #[rstest]
    fn same_seed_gives_same_grid() {
        let first = build_grid(&config(4, 2)).expect("valid grid");
        let second = build_grid(&config(4, 2)).expect("valid grid");
        let lengths = |graph: &RoadGraph| {
            graph
                .edges()
                .map(|(id, attrs)| (id, attrs.length()))
                .collect::<Vec<_>>()
        };
        assert_eq!(lengths(&first), lengths(&second));
    }

    #[rstest]
    #[case(config(1, 1), GridError::SideTooSmall(1))]
    #[case(config(3, 0), GridError::ZeroBridgeSpacing)]
    fn invalid_configs_are_rejected(#[case] config: GridConfig, #[case] expected: GridError) {
        match build_grid(&config) {
            Err(BenchSetupError::Grid(err)) => assert_eq!(err, expected),
            other => panic!("expected grid error, got {other:?}"),
        }
    }
}
