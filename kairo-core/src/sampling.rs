//! Origin–destination pair sampling.

use std::fmt;

use rand::seq::index;
use tracing::debug;

use crate::{
    Result,
    error::KairoError,
    graph::{NodeId, RoadGraph, largest_weak_component},
    routing::has_path,
    selection::call_rng,
};

/// Draws allowed per requested pair before the sampler gives up.
pub const ATTEMPTS_PER_PAIR: usize = 20;

/// An ordered origin–destination pair joined by a directed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OdPair {
    source: NodeId,
    target: NodeId,
}

impl OdPair {
    /// Creates a pair. No reachability check is made.
    #[must_use]
    pub const fn new(source: NodeId, target: NodeId) -> Self {
        Self { source, target }
    }

    /// Returns the origin.
    #[rustfmt::skip]
    #[must_use]
    pub const fn source(&self) -> NodeId { self.source }

    /// Returns the destination.
    #[rustfmt::skip]
    #[must_use]
    pub const fn target(&self) -> NodeId { self.target }
}

impl fmt::Display for OdPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

/// Samples up to `n_pairs` connected pairs from the largest weak component.
///
/// Each draw picks two distinct component nodes uniformly; the pair is kept
/// when a directed path joins them. Sampling stops after
/// [`ATTEMPTS_PER_PAIR`] × `n_pairs` draws and returns whatever was found.
///
/// # Errors
/// Returns [`KairoError::InvalidPairCount`] when `n_pairs` is zero and
/// [`KairoError::SamplingExhausted`] when no pair could be found.
///
/// # Examples
/// ```
/// use kairo_core::{EdgeAttributes, Node, NodeId, RoadGraph, sample_od_pairs};
///
/// let mut graph = RoadGraph::new();
/// for id in 0..4 {
///     graph.add_node(NodeId::new(id), Node::unplaced());
/// }
/// for (u, v) in [(0, 1), (1, 0), (1, 2), (2, 1)] {
///     graph.add_edge(NodeId::new(u), NodeId::new(v), EdgeAttributes::new(1.0))?;
/// }
///
/// let pairs = sample_od_pairs(&graph, 5, Some(42))?;
/// assert_eq!(pairs.len(), 5);
/// // Node 3 is isolated and never drawn.
/// assert!(pairs.iter().all(|pair| pair.source().get() < 3 && pair.target().get() < 3));
/// assert_eq!(pairs, sample_od_pairs(&graph, 5, Some(42))?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn sample_od_pairs(graph: &RoadGraph, n_pairs: usize, seed: Option<u64>) -> Result<Vec<OdPair>> {
    if n_pairs == 0 {
        return Err(KairoError::InvalidPairCount { got: n_pairs });
    }

    let component = largest_weak_component(graph);
    if component.len() < 2 {
        return Err(KairoError::SamplingExhausted {
            attempts: 0,
            component_size: component.len(),
        });
    }

    let mut rng = call_rng(seed);
    let max_attempts = n_pairs.saturating_mul(ATTEMPTS_PER_PAIR);
    let mut pairs = Vec::with_capacity(n_pairs);
    let mut attempts = 0;

    while pairs.len() < n_pairs && attempts < max_attempts {
        attempts += 1;
        let drawn = index::sample(&mut rng, component.len(), 2);
        let (Some(source), Some(target)) = (
            component.get(drawn.index(0)).copied(),
            component.get(drawn.index(1)).copied(),
        ) else {
            continue;
        };
        if has_path(graph, source, target) {
            pairs.push(OdPair::new(source, target));
        }
    }

    if pairs.is_empty() {
        return Err(KairoError::SamplingExhausted {
            attempts,
            component_size: component.len(),
        });
    }

    debug!(
        requested = n_pairs,
        found = pairs.len(),
        attempts,
        component_size = component.len(),
        "sampled origin-destination pairs"
    );
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeAttributes, Node, test_utils::grid};

    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(30)]
    fn strongly_connected_graph_fills_request(#[case] n_pairs: usize) {
        let pairs = sample_od_pairs(&grid(3, 3), n_pairs, Some(5)).expect("sampling must succeed");
        assert_eq!(pairs.len(), n_pairs);
        assert!(pairs.iter().all(|pair| pair.source() != pair.target()));
    }

    #[test]
    fn zero_pairs_is_rejected() {
        let err = sample_od_pairs(&grid(2, 2), 0, None).expect_err("zero pairs must fail");
        assert_eq!(err, KairoError::InvalidPairCount { got: 0 });
    }

    #[test]
    fn singleton_component_is_exhausted() {
        let mut graph = RoadGraph::new();
        graph.add_node(NodeId::new(0), Node::unplaced());
        let err = sample_od_pairs(&graph, 3, Some(1)).expect_err("no pair exists");
        assert_eq!(
            err,
            KairoError::SamplingExhausted {
                attempts: 0,
                component_size: 1
            }
        );
    }

    #[test]
    fn one_way_chain_keeps_only_forward_pairs() {
        // 0 -> 1 -> 2: only forward draws are reachable.
        let mut graph = RoadGraph::new();
        for id in 0..3 {
            graph.add_node(NodeId::new(id), Node::unplaced());
        }
        for (u, v) in [(0, 1), (1, 2)] {
            graph
                .add_edge(NodeId::new(u), NodeId::new(v), EdgeAttributes::new(1.0))
                .expect("edge must insert");
        }
        let pairs = sample_od_pairs(&graph, 10, Some(3)).expect("forward pairs exist");
        assert!(pairs.iter().all(|pair| pair.source() < pair.target()));
    }

    #[test]
    fn self_loops_do_not_join_components() {
        let mut graph = RoadGraph::new();
        for id in 0..2 {
            graph.add_node(NodeId::new(id), Node::unplaced());
        }
        graph
            .add_edge(NodeId::new(0), NodeId::new(0), EdgeAttributes::new(1.0))
            .expect("self-loop must insert");
        graph
            .add_edge(NodeId::new(1), NodeId::new(1), EdgeAttributes::new(1.0))
            .expect("self-loop must insert");
        let err = sample_od_pairs(&graph, 2, Some(0)).expect_err("components are singletons");
        assert!(matches!(err, KairoError::SamplingExhausted { .. }));
    }
}
