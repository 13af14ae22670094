//! Shortest-path cost search over the road graph.
//!
//! Costs are summed with A* guided by the straight-line distance between node
//! coordinates, scaled by the smallest cost per unit of distance found on any
//! edge. The scaled distance never exceeds the remaining cost whatever units
//! lengths, times and coordinates use, so searches return exact costs.

use std::{cmp::Ordering, ops::Add};

use num_traits::Zero;
use pathfinding::prelude::{astar, bfs};

use crate::graph::{EdgeAttributes, Node, NodeId, RoadGraph};

/// Edge attribute used as path weight.
///
/// # Examples
/// ```
/// use kairo_core::{CostModel, EdgeAttributes, Node, NodeId, RoadGraph};
///
/// let mut graph = RoadGraph::new();
/// graph.add_node(NodeId::new(0), Node::unplaced());
/// graph.add_node(NodeId::new(1), Node::unplaced());
/// graph.add_edge(NodeId::new(0), NodeId::new(1), EdgeAttributes::new(10.0))?;
/// assert_eq!(CostModel::for_graph(&graph), CostModel::Length);
/// # Ok::<(), kairo_core::GraphError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostModel {
    /// Weigh edges by `travel_time`, falling back to `length` where absent.
    TravelTime,
    /// Weigh edges by `length`.
    Length,
}

impl CostModel {
    /// Chooses `TravelTime` when any edge carries it, `Length` otherwise.
    #[must_use]
    pub const fn for_graph(graph: &RoadGraph) -> Self {
        if graph.has_travel_time() {
            Self::TravelTime
        } else {
            Self::Length
        }
    }

    /// Returns the weight of one edge under this model.
    #[must_use]
    pub fn weight(self, attributes: &EdgeAttributes) -> f64 {
        match self {
            Self::TravelTime => attributes.travel_time().unwrap_or(attributes.length()),
            Self::Length => attributes.length(),
        }
    }
}

/// Lower-bound estimate used to steer the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathHeuristic {
    /// Straight-line distance between node coordinates, `0` when unplaced.
    #[default]
    Euclidean,
    /// No guidance; the search degenerates to Dijkstra.
    None,
}

/// Totally ordered path cost so `f64` sums can drive the priority queue.
#[derive(Debug, Clone, Copy)]
struct Cost(f64);

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for Cost {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Zero for Cost {
    fn zero() -> Self {
        Self(0.0)
    }

    fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

/// Shortest-path searches over one graph under a fixed cost model.
///
/// Building a router scans the edges once to scale the heuristic; reuse it
/// for every pair searched on the same graph.
///
/// # Examples
/// ```
/// use kairo_core::{CostModel, EdgeAttributes, Node, NodeId, PathHeuristic, RoadGraph, Router};
///
/// // Coordinates in metres, costs in seconds: the detour via 2 is faster.
/// let mut graph = RoadGraph::new();
/// for (id, x, y) in [(0, 0.0, 0.0), (1, 1000.0, 0.0), (2, 500.0, 800.0)] {
///     graph.add_node(NodeId::new(id), Node::at(x, y));
/// }
/// let street = |length: f64, seconds: f64| EdgeAttributes::new(length).with_travel_time(seconds);
/// graph.add_edge(NodeId::new(0), NodeId::new(1), street(1000.0, 100.0))?;
/// graph.add_edge(NodeId::new(0), NodeId::new(2), street(950.0, 30.0))?;
/// graph.add_edge(NodeId::new(2), NodeId::new(1), street(950.0, 30.0))?;
///
/// let router = Router::new(&graph, CostModel::TravelTime, PathHeuristic::Euclidean);
/// assert_eq!(router.cost(NodeId::new(0), NodeId::new(1)), Some(60.0));
/// # Ok::<(), kairo_core::GraphError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Router<'g> {
    graph: &'g RoadGraph,
    model: CostModel,
    scale: f64,
}

impl<'g> Router<'g> {
    /// Creates a router for `graph`.
    #[must_use]
    pub fn new(graph: &'g RoadGraph, model: CostModel, heuristic: PathHeuristic) -> Self {
        let scale = match heuristic {
            PathHeuristic::None => 0.0,
            PathHeuristic::Euclidean => heuristic_scale(graph, model),
        };
        Self {
            graph,
            model,
            scale,
        }
    }

    /// Reuses this router's cost model and heuristic scale on `graph`.
    ///
    /// The scale stays a lower bound on any graph whose edges are a subset of
    /// the original's, such as a copy with edges removed.
    #[must_use]
    pub const fn on<'h>(&self, graph: &'h RoadGraph) -> Router<'h> {
        Router {
            graph,
            model: self.model,
            scale: self.scale,
        }
    }

    /// Returns the cost model searches use.
    #[rustfmt::skip]
    #[must_use]
    pub const fn model(&self) -> CostModel { self.model }

    /// Computes the cheapest `source → target` cost, or `None` when
    /// unreachable.
    ///
    /// Among parallel edges between the same ordered pair only the cheapest
    /// is considered.
    #[must_use]
    pub fn cost(&self, source: NodeId, target: NodeId) -> Option<f64> {
        let graph = self.graph;
        if !graph.contains_node(source) || !graph.contains_node(target) {
            return None;
        }
        let goal = graph.node(target).and_then(Node::coordinates);
        astar(
            &source,
            |&node| cheapest_successors(graph, node, self.model),
            |&node| Cost(self.estimate(node, goal)),
            |&node| node == target,
        )
        .map(|(_, Cost(total))| total)
    }

    fn estimate(&self, node: NodeId, goal: Option<(f64, f64)>) -> f64 {
        let here = self.graph.node(node).and_then(Node::coordinates);
        here.zip(goal)
            .map_or(0.0, |((fx, fy), (tx, ty))| self.scale * (fx - tx).hypot(fy - ty))
    }
}

/// Smallest edge cost per unit of straight-line distance.
///
/// Any path then costs at least `scale` times the distance it spans. A single
/// edge touching an unplaced node disables the heuristic, as does a graph
/// without placed edges.
fn heuristic_scale(graph: &RoadGraph, model: CostModel) -> f64 {
    let mut scale: Option<f64> = None;
    for (edge, attributes) in graph.edges() {
        let endpoints = graph
            .node(edge.source())
            .and_then(Node::coordinates)
            .zip(graph.node(edge.target()).and_then(Node::coordinates));
        let Some(((sx, sy), (tx, ty))) = endpoints else {
            return 0.0;
        };
        let distance = (sx - tx).hypot(sy - ty);
        if distance > 0.0 {
            let ratio = model.weight(attributes) / distance;
            scale = Some(scale.map_or(ratio, |current| current.min(ratio)));
        }
    }
    scale.unwrap_or(0.0)
}

/// Computes the cheapest `source → target` cost, or `None` when unreachable.
///
/// Convenience for a single search; see [`Router`] to search many pairs.
///
/// # Examples
/// ```
/// use kairo_core::{CostModel, EdgeAttributes, Node, NodeId, PathHeuristic, RoadGraph, shortest_path_cost};
///
/// let mut graph = RoadGraph::new();
/// for (id, x) in [(0, 0.0), (1, 1.0), (2, 2.0)] {
///     graph.add_node(NodeId::new(id), Node::at(x, 0.0));
/// }
/// graph.add_edge(NodeId::new(0), NodeId::new(1), EdgeAttributes::new(1.0))?;
/// graph.add_edge(NodeId::new(1), NodeId::new(2), EdgeAttributes::new(1.5))?;
/// graph.add_edge(NodeId::new(0), NodeId::new(2), EdgeAttributes::new(4.0))?;
///
/// let cost = shortest_path_cost(
///     &graph,
///     NodeId::new(0),
///     NodeId::new(2),
///     CostModel::Length,
///     PathHeuristic::Euclidean,
/// );
/// assert_eq!(cost, Some(2.5));
/// assert_eq!(
///     shortest_path_cost(&graph, NodeId::new(2), NodeId::new(0), CostModel::Length, PathHeuristic::None),
///     None
/// );
/// # Ok::<(), kairo_core::GraphError>(())
/// ```
#[must_use]
pub fn shortest_path_cost(
    graph: &RoadGraph,
    source: NodeId,
    target: NodeId,
    model: CostModel,
    heuristic: PathHeuristic,
) -> Option<f64> {
    Router::new(graph, model, heuristic).cost(source, target)
}

/// Returns `true` when a directed path leads from `source` to `target`.
#[must_use]
pub fn has_path(graph: &RoadGraph, source: NodeId, target: NodeId) -> bool {
    graph.contains_node(source)
        && graph.contains_node(target)
        && bfs(
            &source,
            |&node| {
                graph
                    .out_edges(node)
                    .map(|(edge, _)| edge.target())
                    .collect::<Vec<_>>()
            },
            |&node| node == target,
        )
        .is_some()
}

fn cheapest_successors(graph: &RoadGraph, node: NodeId, model: CostModel) -> Vec<(NodeId, Cost)> {
    let mut successors: Vec<(NodeId, Cost)> = Vec::new();
    // Out-edges arrive grouped by target because edge ids sort by (u, v, key).
    for (edge, attributes) in graph.out_edges(node) {
        let weight = Cost(model.weight(attributes));
        match successors.last_mut() {
            Some((target, best)) if *target == edge.target() => {
                if weight < *best {
                    *best = weight;
                }
            }
            _ => successors.push((edge.target(), weight)),
        }
    }
    successors
}
