//! Edge-betweenness ranking of undirected road links.
//!
//! Betweenness is computed with Brandes' accumulation over unweighted
//! breadth-first searches on the simple undirected projection of the road
//! graph. Scores are normalised by `1 / (n (n - 1))`; when only `k` sources
//! are sampled the scores are additionally rescaled by `n / k`.

mod cache;

use std::{
    cmp::Ordering,
    collections::{HashSet, VecDeque},
    num::NonZeroUsize,
};

use rand::{SeedableRng, rngs::SmallRng, seq::index};
use rayon::prelude::*;

use crate::{
    builder::ExecutionStrategy,
    graph::{NodePair, RoadGraph, projection::UndirectedProjection},
};

pub use cache::RankingCache;

/// Sources handled per unit of work. Partial scores are summed chunk by chunk
/// in source order under both execution strategies, so parallel and
/// sequential runs produce bit-identical rankings.
const SOURCES_PER_CHUNK: usize = 32;

/// Default number of sampled sources in approximate mode.
pub const DEFAULT_CENTRALITY_SOURCES: NonZeroUsize = match NonZeroUsize::new(300) {
    Some(value) => value,
    None => NonZeroUsize::MIN,
};

/// How many source nodes the betweenness computation visits.
///
/// # Examples
/// ```
/// use kairo_core::CentralityMode;
///
/// let mode = CentralityMode::default();
/// assert!(matches!(mode, CentralityMode::Approximate { seed: 0, .. }));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CentralityMode {
    /// Visit every node as a source.
    Exact,
    /// Visit `min(sources, |V|)` nodes chosen by a generator seeded with
    /// `seed`.
    Approximate {
        /// Upper bound on the number of sampled sources.
        sources: NonZeroUsize,
        /// Seed for the source sample.
        seed: u64,
    },
}

impl Default for CentralityMode {
    fn default() -> Self {
        Self::Approximate {
            sources: DEFAULT_CENTRALITY_SOURCES,
            seed: 0,
        }
    }
}

/// Betweenness score of one undirected link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedLink {
    pair: NodePair,
    score: f64,
}

impl RankedLink {
    /// Returns the link's endpoints.
    #[rustfmt::skip]
    #[must_use]
    pub const fn pair(&self) -> NodePair { self.pair }

    /// Returns the normalised betweenness score.
    #[rustfmt::skip]
    #[must_use]
    pub const fn score(&self) -> f64 { self.score }
}

/// Links ordered by descending betweenness, ties by ascending node pair.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CentralityRanking {
    links: Vec<RankedLink>,
}

impl CentralityRanking {
    fn from_scores(links: &[NodePair], scores: Vec<f64>) -> Self {
        let mut ranked: Vec<RankedLink> = links
            .iter()
            .zip(scores)
            .map(|(pair, score)| RankedLink { pair: *pair, score })
            .collect();
        ranked.sort_by(|left, right| match right.score.total_cmp(&left.score) {
            Ordering::Equal => left.pair.cmp(&right.pair),
            other => other,
        });
        Self { links: ranked }
    }

    /// Returns the number of ranked links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns `true` when the graph had no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Iterates links from most to least central.
    pub fn iter(&self) -> impl Iterator<Item = &RankedLink> + '_ {
        self.links.iter()
    }

    /// Returns the node pairs of the `count` most central links.
    #[must_use]
    pub fn top_pairs(&self, count: usize) -> HashSet<NodePair> {
        self.links.iter().take(count).map(RankedLink::pair).collect()
    }
}

/// Computes the edge-betweenness ranking of `graph`.
///
/// # Examples
/// ```
/// use kairo_core::{CentralityMode, EdgeAttributes, ExecutionStrategy, Node, NodeId, NodePair, RoadGraph, edge_betweenness};
///
/// // Path 0 - 1 - 2: both links carry the same load.
/// let mut graph = RoadGraph::new();
/// for id in 0..3 {
///     graph.add_node(NodeId::new(id), Node::unplaced());
/// }
/// graph.add_edge(NodeId::new(0), NodeId::new(1), EdgeAttributes::new(1.0))?;
/// graph.add_edge(NodeId::new(2), NodeId::new(1), EdgeAttributes::new(1.0))?;
///
/// let ranking = edge_betweenness(&graph, CentralityMode::Exact, ExecutionStrategy::Sequential);
/// let first = ranking.iter().next().map(|link| link.pair());
/// assert_eq!(first, Some(NodePair::new(NodeId::new(0), NodeId::new(1))));
/// assert_eq!(ranking.len(), 2);
/// # Ok::<(), kairo_core::GraphError>(())
/// ```
#[must_use]
pub fn edge_betweenness(
    graph: &RoadGraph,
    mode: CentralityMode,
    strategy: ExecutionStrategy,
) -> CentralityRanking {
    let projection = UndirectedProjection::from_graph(graph);
    let n = projection.node_count();
    let sources = choose_sources(n, mode);

    let partials: Vec<Vec<f64>> = match strategy {
        ExecutionStrategy::Sequential => sources
            .chunks(SOURCES_PER_CHUNK)
            .map(|chunk| accumulate_chunk(&projection, chunk))
            .collect(),
        ExecutionStrategy::Parallel => sources
            .par_chunks(SOURCES_PER_CHUNK)
            .map(|chunk| accumulate_chunk(&projection, chunk))
            .collect(),
    };

    let mut scores = vec![0.0; projection.links().len()];
    for partial in partials {
        for (total, value) in scores.iter_mut().zip(partial) {
            *total += value;
        }
    }

    if let Some(scale) = normalisation(n, sources.len()) {
        for score in &mut scores {
            *score *= scale;
        }
    }

    CentralityRanking::from_scores(projection.links(), scores)
}

fn choose_sources(n: usize, mode: CentralityMode) -> Vec<usize> {
    match mode {
        CentralityMode::Exact => (0..n).collect(),
        CentralityMode::Approximate { sources, seed } => {
            let k = sources.get().min(n);
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut chosen = index::sample(&mut rng, n, k).into_vec();
            chosen.sort_unstable();
            chosen
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "node counts stay far below 2^52"
)]
fn normalisation(n: usize, sampled: usize) -> Option<f64> {
    if n <= 1 || sampled == 0 {
        return None;
    }
    let nodes = n as f64;
    let scale = 1.0 / (nodes * (nodes - 1.0));
    Some(scale * nodes / sampled as f64)
}

fn accumulate_chunk(projection: &UndirectedProjection, sources: &[usize]) -> Vec<f64> {
    let mut scores = vec![0.0; projection.links().len()];
    let mut state = BrandesState::new(projection.node_count());
    for &source in sources {
        state.accumulate_from(projection, source, &mut scores);
    }
    scores
}

/// Per-source working buffers, reused across the sources of one chunk.
struct BrandesState {
    order: Vec<usize>,
    predecessors: Vec<Vec<(usize, usize)>>,
    paths: Vec<f64>,
    distance: Vec<Option<usize>>,
    dependency: Vec<f64>,
    queue: VecDeque<usize>,
}

impl BrandesState {
    fn new(n: usize) -> Self {
        Self {
            order: Vec::with_capacity(n),
            predecessors: vec![Vec::new(); n],
            paths: vec![0.0; n],
            distance: vec![None; n],
            dependency: vec![0.0; n],
            queue: VecDeque::new(),
        }
    }

    fn reset(&mut self) {
        self.order.clear();
        self.queue.clear();
        self.predecessors.iter_mut().for_each(Vec::clear);
        self.paths.fill(0.0);
        self.distance.fill(None);
        self.dependency.fill(0.0);
    }

    fn accumulate_from(
        &mut self,
        projection: &UndirectedProjection,
        source: usize,
        scores: &mut [f64],
    ) {
        self.reset();
        let (Some(paths), Some(distance)) =
            (self.paths.get_mut(source), self.distance.get_mut(source))
        else {
            return;
        };
        *paths = 1.0;
        *distance = Some(0);
        self.queue.push_back(source);

        while let Some(node) = self.queue.pop_front() {
            self.order.push(node);
            let Some(depth) = self.distance.get(node).copied().flatten() else {
                continue;
            };
            let node_paths = self.paths.get(node).copied().unwrap_or_default();
            for &(neighbour, link) in projection.neighbours(node) {
                let Some(slot) = self.distance.get_mut(neighbour) else {
                    continue;
                };
                if slot.is_none() {
                    *slot = Some(depth + 1);
                    self.queue.push_back(neighbour);
                }
                if *slot == Some(depth + 1) {
                    if let Some(count) = self.paths.get_mut(neighbour) {
                        *count += node_paths;
                    }
                    if let Some(preds) = self.predecessors.get_mut(neighbour) {
                        preds.push((node, link));
                    }
                }
            }
        }

        while let Some(node) = self.order.pop() {
            let node_paths = self.paths.get(node).copied().unwrap_or_default();
            let node_dependency = self.dependency.get(node).copied().unwrap_or_default();
            let Some(preds) = self.predecessors.get(node) else {
                continue;
            };
            for &(pred, link) in preds {
                let pred_paths = self.paths.get(pred).copied().unwrap_or_default();
                let share = pred_paths / node_paths * (1.0 + node_dependency);
                if let Some(score) = scores.get_mut(link) {
                    *score += share;
                }
                if let Some(dependency) = self.dependency.get_mut(pred) {
                    *dependency += share;
                }
            }
        }
    }
}
