//! Directed road multigraph consumed by the disruption engine.
//!
//! Nodes carry optional projected coordinates, edges are keyed by the
//! `(u, v, key)` triple so parallel roads between the same ordered node pair
//! stay distinct. Iteration order is always ascending by identifier, which
//! keeps every seeded computation over the graph reproducible.

mod components;
pub(crate) mod projection;

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use geo::LineString;

use crate::error::GraphError;

pub use components::largest_weak_component;

static NEXT_GRAPH_IDENTITY: AtomicU64 = AtomicU64::new(1);

fn next_identity() -> u64 {
    NEXT_GRAPH_IDENTITY.fetch_add(1, Ordering::Relaxed)
}

/// Identifier of an intersection or dead end in the road network.
///
/// # Examples
/// ```
/// use kairo_core::NodeId;
///
/// let id = NodeId::new(42);
/// assert_eq!(id.get(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Creates a node identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(id: u64) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a single directed edge: the unit of removal.
///
/// # Examples
/// ```
/// use kairo_core::{EdgeId, NodeId};
///
/// let edge = EdgeId::new(NodeId::new(1), NodeId::new(2), 0);
/// assert_eq!(edge.source(), NodeId::new(1));
/// assert_eq!(edge.to_string(), "(1, 2, 0)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId {
    source: NodeId,
    target: NodeId,
    key: u64,
}

impl EdgeId {
    /// Creates an edge identifier from its endpoints and parallel-edge key.
    #[must_use]
    pub const fn new(source: NodeId, target: NodeId, key: u64) -> Self {
        Self {
            source,
            target,
            key,
        }
    }

    /// Returns the tail node.
    #[rustfmt::skip]
    #[must_use]
    pub const fn source(&self) -> NodeId { self.source }

    /// Returns the head node.
    #[rustfmt::skip]
    #[must_use]
    pub const fn target(&self) -> NodeId { self.target }

    /// Returns the key disambiguating parallel edges.
    #[rustfmt::skip]
    #[must_use]
    pub const fn key(&self) -> u64 { self.key }

    /// Returns the undirected link this edge belongs to.
    #[must_use]
    pub fn link(&self) -> NodePair {
        NodePair::new(self.source, self.target)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.source, self.target, self.key)
    }
}

/// Unordered node pair in canonical form (`low <= high`).
///
/// # Examples
/// ```
/// use kairo_core::{NodeId, NodePair};
///
/// let pair = NodePair::new(NodeId::new(9), NodeId::new(3));
/// assert_eq!(pair.low(), NodeId::new(3));
/// assert_eq!(pair, NodePair::new(NodeId::new(3), NodeId::new(9)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePair {
    low: NodeId,
    high: NodeId,
}

impl NodePair {
    /// Builds the canonical pair for two endpoints in either order.
    #[must_use]
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Returns the smaller endpoint.
    #[rustfmt::skip]
    #[must_use]
    pub const fn low(&self) -> NodeId { self.low }

    /// Returns the larger endpoint.
    #[rustfmt::skip]
    #[must_use]
    pub const fn high(&self) -> NodeId { self.high }
}

impl fmt::Display for NodePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.low, self.high)
    }
}

/// Node attributes. Coordinates are only used by the routing heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Node {
    x: Option<f64>,
    y: Option<f64>,
}

impl Node {
    /// Creates a node placed at projected coordinates `(x, y)`.
    #[must_use]
    pub const fn at(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }

    /// Creates a node without coordinates.
    #[must_use]
    pub const fn unplaced() -> Self {
        Self { x: None, y: None }
    }

    /// Returns the x coordinate, if known.
    #[rustfmt::skip]
    #[must_use]
    pub const fn x(&self) -> Option<f64> { self.x }

    /// Returns the y coordinate, if known.
    #[rustfmt::skip]
    #[must_use]
    pub const fn y(&self) -> Option<f64> { self.y }

    /// Returns both coordinates when the node is fully placed.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.x?, self.y?))
    }
}

/// Cost and tag attributes attached to a directed edge.
///
/// # Examples
/// ```
/// use kairo_core::EdgeAttributes;
///
/// let attrs = EdgeAttributes::new(120.0)
///     .with_travel_time(9.5)
///     .with_bridge("yes")
///     .with_highway("primary");
/// assert!(attrs.is_bridge());
/// assert_eq!(attrs.travel_time(), Some(9.5));
/// assert_eq!(attrs.highway(), ["primary"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeAttributes {
    length: f64,
    travel_time: Option<f64>,
    bridge: Option<String>,
    tunnel: Option<String>,
    highway: Vec<String>,
    geometry: Option<LineString<f64>>,
}

impl EdgeAttributes {
    /// Creates attributes for an untagged edge of the given length.
    #[must_use]
    pub fn new(length: f64) -> Self {
        Self {
            length,
            travel_time: None,
            bridge: None,
            tunnel: None,
            highway: Vec::new(),
            geometry: None,
        }
    }

    /// Sets the traversal time.
    #[must_use]
    pub fn with_travel_time(mut self, seconds: f64) -> Self {
        self.travel_time = Some(seconds);
        self
    }

    /// Tags the edge as a bridge. Any value counts, including `"no"`.
    #[must_use]
    pub fn with_bridge(mut self, value: impl Into<String>) -> Self {
        self.bridge = Some(value.into());
        self
    }

    /// Tags the edge as a tunnel. Any value counts, including `"no"`.
    #[must_use]
    pub fn with_tunnel(mut self, value: impl Into<String>) -> Self {
        self.tunnel = Some(value.into());
        self
    }

    /// Adds a road class to the edge's `highway` tag.
    #[must_use]
    pub fn with_highway(mut self, class: impl Into<String>) -> Self {
        self.highway.push(class.into());
        self
    }

    /// Attaches the edge polyline.
    #[must_use]
    pub fn with_geometry(mut self, geometry: LineString<f64>) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Returns the edge length.
    #[rustfmt::skip]
    #[must_use]
    pub const fn length(&self) -> f64 { self.length }

    /// Returns the traversal time, if known.
    #[rustfmt::skip]
    #[must_use]
    pub const fn travel_time(&self) -> Option<f64> { self.travel_time }

    /// Returns the raw `bridge` tag value.
    #[must_use]
    pub fn bridge(&self) -> Option<&str> {
        self.bridge.as_deref()
    }

    /// Returns the raw `tunnel` tag value.
    #[must_use]
    pub fn tunnel(&self) -> Option<&str> {
        self.tunnel.as_deref()
    }

    /// Returns `true` when a `bridge` tag is present.
    #[must_use]
    pub const fn is_bridge(&self) -> bool {
        self.bridge.is_some()
    }

    /// Returns `true` when a `tunnel` tag is present.
    #[must_use]
    pub const fn is_tunnel(&self) -> bool {
        self.tunnel.is_some()
    }

    /// Returns the road classes in the `highway` tag.
    #[must_use]
    pub fn highway(&self) -> &[String] {
        &self.highway
    }

    /// Returns the explicit polyline, if one was recorded.
    #[must_use]
    pub fn geometry(&self) -> Option<&LineString<f64>> {
        self.geometry.as_ref()
    }

    fn validate(&self, edge: EdgeId) -> Result<(), GraphError> {
        validate_cost(edge, "length", self.length)?;
        if let Some(time) = self.travel_time {
            validate_cost(edge, "travel_time", time)?;
        }
        Ok(())
    }
}

fn validate_cost(edge: EdgeId, attribute: &'static str, value: f64) -> Result<(), GraphError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GraphError::InvalidCost {
            edge,
            attribute,
            value,
        })
    }
}

/// Identity and structural revision of a [`RoadGraph`] instance.
///
/// Two fingerprints are equal only for the same graph object at the same
/// revision. Cloning a graph yields a new identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GraphFingerprint {
    identity: u64,
    revision: u64,
}

impl GraphFingerprint {
    /// Returns the instance identity.
    #[rustfmt::skip]
    #[must_use]
    pub const fn identity(&self) -> u64 { self.identity }

    /// Returns the structural revision counter.
    #[rustfmt::skip]
    #[must_use]
    pub const fn revision(&self) -> u64 { self.revision }
}

/// A directed road multigraph.
///
/// # Examples
/// ```
/// use kairo_core::{EdgeAttributes, Node, NodeId, RoadGraph};
///
/// let mut graph = RoadGraph::new();
/// graph.add_node(NodeId::new(1), Node::at(0.0, 0.0));
/// graph.add_node(NodeId::new(2), Node::at(3.0, 4.0));
/// let first = graph.add_edge(NodeId::new(1), NodeId::new(2), EdgeAttributes::new(5.0))?;
/// let second = graph.add_edge(NodeId::new(1), NodeId::new(2), EdgeAttributes::new(7.0))?;
/// assert_eq!((first.key(), second.key()), (0, 1));
/// assert_eq!(graph.edge_count(), 2);
/// # Ok::<(), kairo_core::GraphError>(())
/// ```
#[derive(Debug)]
pub struct RoadGraph {
    identity: u64,
    revision: u64,
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<EdgeId, EdgeAttributes>,
    outgoing: BTreeMap<NodeId, BTreeSet<EdgeId>>,
    timed_edges: usize,
}

impl Default for RoadGraph {
    fn default() -> Self {
        Self {
            identity: next_identity(),
            revision: 0,
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            outgoing: BTreeMap::new(),
            timed_edges: 0,
        }
    }
}

impl Clone for RoadGraph {
    fn clone(&self) -> Self {
        Self {
            identity: next_identity(),
            revision: self.revision,
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            outgoing: self.outgoing.clone(),
            timed_edges: self.timed_edges,
        }
    }
}

impl RoadGraph {
    /// Creates an empty graph with a fresh identity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identity/revision pair used to key derived data.
    #[must_use]
    pub const fn fingerprint(&self) -> GraphFingerprint {
        GraphFingerprint {
            identity: self.identity,
            revision: self.revision,
        }
    }

    /// Adds a node, or replaces the attributes of an existing one.
    ///
    /// Returns `true` when the node is new.
    pub fn add_node(&mut self, id: NodeId, node: Node) -> bool {
        let inserted = self.nodes.insert(id, node).is_none();
        if inserted {
            self.bump_revision();
        }
        inserted
    }

    /// Inserts an edge under an explicit key.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownNode`] when either endpoint is missing,
    /// [`GraphError::DuplicateEdge`] when the identifier is taken, and
    /// [`GraphError::InvalidCost`] when a cost is negative or non-finite.
    pub fn insert_edge(&mut self, id: EdgeId, attributes: EdgeAttributes) -> Result<(), GraphError> {
        for node in [id.source(), id.target()] {
            if !self.nodes.contains_key(&node) {
                return Err(GraphError::UnknownNode { edge: id, node });
            }
        }
        if self.edges.contains_key(&id) {
            return Err(GraphError::DuplicateEdge { edge: id });
        }
        attributes.validate(id)?;

        if attributes.travel_time.is_some() {
            self.timed_edges = self.timed_edges.saturating_add(1);
        }
        self.edges.insert(id, attributes);
        self.outgoing.entry(id.source()).or_default().insert(id);
        self.bump_revision();
        Ok(())
    }

    /// Inserts an edge under the lowest key unused for `(source, target)`.
    ///
    /// # Errors
    /// Same conditions as [`Self::insert_edge`], except duplicates cannot
    /// occur.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        attributes: EdgeAttributes,
    ) -> Result<EdgeId, GraphError> {
        let key = self.next_key(source, target);
        let id = EdgeId::new(source, target, key);
        self.insert_edge(id, attributes)?;
        Ok(id)
    }

    /// Removes an edge, returning its attributes when it was present.
    pub fn remove_edge(&mut self, id: &EdgeId) -> Option<EdgeAttributes> {
        let removed = self.edges.remove(id)?;
        if let Some(out) = self.outgoing.get_mut(&id.source()) {
            out.remove(id);
            if out.is_empty() {
                self.outgoing.remove(&id.source());
            }
        }
        if removed.travel_time.is_some() {
            self.timed_edges = self.timed_edges.saturating_sub(1);
        }
        self.bump_revision();
        Some(removed)
    }

    /// Returns `true` when the node exists.
    #[must_use]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Returns `true` when the edge exists.
    #[must_use]
    pub fn contains_edge(&self, id: &EdgeId) -> bool {
        self.edges.contains_key(id)
    }

    /// Looks up node attributes.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Looks up edge attributes.
    #[must_use]
    pub fn edge(&self, id: &EdgeId) -> Option<&EdgeAttributes> {
        self.edges.get(id)
    }

    /// Iterates nodes in ascending identifier order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Iterates node identifiers in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Iterates edges in ascending identifier order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeAttributes)> + '_ {
        self.edges.iter().map(|(id, attrs)| (*id, attrs))
    }

    /// Iterates edge identifiers in ascending order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.keys().copied()
    }

    /// Iterates the edges leaving `node`.
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &EdgeAttributes)> + '_ {
        self.outgoing
            .get(&node)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edges.get(id).map(|attrs| (*id, attrs)))
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` when the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` when at least one edge records a traversal time.
    #[must_use]
    pub const fn has_travel_time(&self) -> bool {
        self.timed_edges > 0
    }

    fn next_key(&self, source: NodeId, target: NodeId) -> u64 {
        let lower = EdgeId::new(source, target, 0);
        let upper = EdgeId::new(source, target, u64::MAX);
        let mut expected = 0_u64;
        for id in self.edges.range(lower..=upper).map(|(id, _)| id) {
            if id.key() != expected {
                break;
            }
            expected = expected.saturating_add(1);
        }
        expected
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
