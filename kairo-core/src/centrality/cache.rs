//! Per-graph memoisation of centrality rankings.
//!
//! Entries are keyed by the graph fingerprint and the centrality mode, so a
//! mutated graph (new revision) or a cloned graph (new identity) never
//! receives a ranking computed for a different structure. Population of a
//! missing entry goes through a per-key [`OnceLock`]; concurrent callers
//! asking for the same key compute once and share the result.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tracing::{debug, trace};

use super::{CentralityMode, CentralityRanking, edge_betweenness};
use crate::{
    builder::ExecutionStrategy,
    graph::{GraphFingerprint, RoadGraph},
};

type CacheKey = (GraphFingerprint, CentralityMode);
type Slot = Arc<OnceLock<Arc<CentralityRanking>>>;

/// Concurrent cache of [`CentralityRanking`] values.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use kairo_core::{CentralityMode, ExecutionStrategy, Node, NodeId, RankingCache, RoadGraph};
///
/// let cache = RankingCache::new();
/// let mut graph = RoadGraph::new();
/// graph.add_node(NodeId::new(0), Node::unplaced());
///
/// let first = cache.ranking(&graph, CentralityMode::Exact, ExecutionStrategy::Sequential);
/// let second = cache.ranking(&graph, CentralityMode::Exact, ExecutionStrategy::Sequential);
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(cache.invalidate(&graph), 1);
/// assert!(cache.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct RankingCache {
    entries: DashMap<CacheKey, Slot>,
}

impl RankingCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ranking for `graph` under `mode`, computing it on a miss.
    ///
    /// A miss also drops rankings cached for earlier revisions of the same
    /// graph instance, since those can never be requested again.
    pub fn ranking(
        &self,
        graph: &RoadGraph,
        mode: CentralityMode,
        strategy: ExecutionStrategy,
    ) -> Arc<CentralityRanking> {
        let fingerprint = graph.fingerprint();
        let slot = self.slot_for((fingerprint, mode));
        if let Some(ranking) = slot.get() {
            record_hit();
            trace!(
                identity = fingerprint.identity(),
                revision = fingerprint.revision(),
                "centrality cache hit"
            );
            return Arc::clone(ranking);
        }

        let ranking = slot.get_or_init(|| {
            record_miss();
            self.purge_stale(fingerprint);
            // A nested rayon join could steal a task that waits on this same
            // slot, so pool workers fill it without joining.
            let strategy = if rayon::current_thread_index().is_some() {
                ExecutionStrategy::Sequential
            } else {
                strategy
            };
            let ranking = edge_betweenness(graph, mode, strategy);
            debug!(
                identity = fingerprint.identity(),
                revision = fingerprint.revision(),
                links = ranking.len(),
                ?mode,
                "centrality ranking computed"
            );
            Arc::new(ranking)
        });
        Arc::clone(ranking)
    }

    /// Drops every ranking cached for this graph instance, at any revision.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&self, graph: &RoadGraph) -> usize {
        let identity = graph.fingerprint().identity();
        let before = self.entries.len();
        self.entries
            .retain(|(fingerprint, _), _| fingerprint.identity() != identity);
        before.saturating_sub(self.entries.len())
    }

    /// Drops all cached rankings.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn slot_for(&self, key: CacheKey) -> Slot {
        // Clone the slot out so the shard lock is released before computing.
        Arc::clone(self.entries.entry(key).or_default().value())
    }

    fn purge_stale(&self, current: GraphFingerprint) {
        self.entries.retain(|(fingerprint, _), _| {
            fingerprint.identity() != current.identity()
                || fingerprint.revision() == current.revision()
        });
    }
}

#[cfg(feature = "metrics")]
fn record_hit() {
    metrics::counter!("centrality_cache_hits").increment(1);
}

#[cfg(not(feature = "metrics"))]
const fn record_hit() {}

#[cfg(feature = "metrics")]
fn record_miss() {
    metrics::counter!("centrality_cache_misses").increment(1);
}

#[cfg(not(feature = "metrics"))]
const fn record_miss() {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeAttributes, Node, NodeId};

    use std::thread;

    fn triangle() -> RoadGraph {
        let mut graph = RoadGraph::new();
        for id in 0..3 {
            graph.add_node(NodeId::new(id), Node::unplaced());
        }
        for (u, v) in [(0, 1), (1, 2), (2, 0)] {
            graph
                .add_edge(NodeId::new(u), NodeId::new(v), EdgeAttributes::new(1.0))
                .expect("edge must insert");
        }
        graph
    }

    #[test]
    fn pool_workers_share_one_parallel_computation() {
        use rayon::prelude::*;

        let cache = RankingCache::new();
        let graph = crate::test_utils::grid(5, 5);
        let rankings: Vec<Arc<CentralityRanking>> = (0..16)
            .into_par_iter()
            .map(|_| cache.ranking(&graph, CentralityMode::Exact, ExecutionStrategy::Parallel))
            .collect();
        let first = rankings.first().expect("at least one ranking");
        assert!(rankings.iter().all(|ranking| Arc::ptr_eq(ranking, first)));
        assert_eq!(cache.len(), 1);

        let direct = edge_betweenness(&graph, CentralityMode::Exact, ExecutionStrategy::Sequential);
        assert_eq!(**first, direct);
    }

    #[test]
    fn mutation_yields_fresh_ranking() {
        let cache = RankingCache::new();
        let mut graph = triangle();
        let before = cache.ranking(&graph, CentralityMode::Exact, ExecutionStrategy::Sequential);
        assert_eq!(before.len(), 3);

        graph
            .remove_edge(&crate::EdgeId::new(NodeId::new(2), NodeId::new(0), 0))
            .expect("edge must exist");
        let after = cache.ranking(&graph, CentralityMode::Exact, ExecutionStrategy::Sequential);
        assert_eq!(after.len(), 2);
        // The stale revision was purged on the miss.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clones_do_not_share_entries() {
        let cache = RankingCache::new();
        let graph = triangle();
        let copy = graph.clone();
        let original = cache.ranking(&graph, CentralityMode::Exact, ExecutionStrategy::Sequential);
        let cloned = cache.ranking(&copy, CentralityMode::Exact, ExecutionStrategy::Sequential);
        assert!(!Arc::ptr_eq(&original, &cloned));
        assert_eq!(original, cloned);
        assert_eq!(cache.len(), 2);

        assert_eq!(cache.invalidate(&copy), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn modes_are_cached_separately() {
        let cache = RankingCache::new();
        let graph = triangle();
        let _exact = cache.ranking(&graph, CentralityMode::Exact, ExecutionStrategy::Sequential);
        let _sampled = cache.ranking(
            &graph,
            CentralityMode::default(),
            ExecutionStrategy::Sequential,
        );
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn concurrent_callers_share_one_ranking() {
        let cache = RankingCache::new();
        let graph = triangle();
        let rankings: Vec<Arc<CentralityRanking>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        cache.ranking(&graph, CentralityMode::Exact, ExecutionStrategy::Parallel)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("worker must not panic"))
                .collect()
        });
        let first = rankings.first().expect("four rankings");
        assert!(rankings.iter().all(|ranking| Arc::ptr_eq(first, ranking)));
    }
}
