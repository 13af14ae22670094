//! Road graph loading.

use std::{fs::File, io::BufReader, io::Read, path::Path};

use geo::LineString;
use kairo_core::{EdgeAttributes, EdgeId, Node, NodeId, RoadGraph};
use tracing::{debug, warn};

use crate::{
    document::{EdgeRecord, GraphDocument},
    errors::JsonProviderError,
};

/// Loads a road graph from a JSON file.
///
/// # Errors
/// Returns [`JsonProviderError::Io`] when the file cannot be opened,
/// [`JsonProviderError::Parse`] for malformed documents and
/// [`JsonProviderError::Graph`] when an edge breaks a graph invariant.
pub fn load_graph(path: impl AsRef<Path>) -> Result<RoadGraph, JsonProviderError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| JsonProviderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    graph_from_reader(BufReader::new(file))
}

/// Reads a road graph from any JSON byte stream.
///
/// # Errors
/// See [`load_graph`].
pub fn graph_from_reader(reader: impl Read) -> Result<RoadGraph, JsonProviderError> {
    build(serde_json::from_reader(reader)?)
}

/// Parses a road graph from a JSON string.
///
/// Edges without a `key` take the lowest key unused for their `(u, v)`
/// pair once every explicitly keyed edge is in place.
///
/// # Examples
/// ```
/// use kairo_providers_json::graph_from_str;
///
/// let graph = graph_from_str(r#"{
///     "nodes": [{"id": 1, "x": 0.0, "y": 0.0}, {"id": 2}],
///     "edges": [
///         {"u": 1, "v": 2, "length": 10.0, "bridge": "yes"},
///         {"u": 1, "v": 2, "key": 0, "length": 12.0, "highway": ["primary", "trunk"]}
///     ]
/// }"#)?;
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 2);
/// # Ok::<(), kairo_providers_json::JsonProviderError>(())
/// ```
///
/// # Errors
/// See [`load_graph`].
pub fn graph_from_str(json: &str) -> Result<RoadGraph, JsonProviderError> {
    build(serde_json::from_str(json)?)
}

fn build(document: GraphDocument) -> Result<RoadGraph, JsonProviderError> {
    let mut graph = RoadGraph::new();
    for record in document.nodes {
        let node = match (record.x, record.y) {
            (Some(x), Some(y)) => Node::at(x, y),
            _ => Node::unplaced(),
        };
        if !graph.add_node(NodeId::new(record.id), node) {
            warn!(node = record.id, "duplicate node record replaces the earlier one");
        }
    }

    let (keyed, unkeyed): (Vec<EdgeRecord>, Vec<EdgeRecord>) =
        document.edges.into_iter().partition(|edge| edge.key.is_some());
    for record in keyed {
        let (source, target, key) = (record.u, record.v, record.key.unwrap_or_default());
        graph.insert_edge(
            EdgeId::new(NodeId::new(source), NodeId::new(target), key),
            attributes(record),
        )?;
    }
    for record in unkeyed {
        let (source, target) = (NodeId::new(record.u), NodeId::new(record.v));
        graph.add_edge(source, target, attributes(record))?;
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        timed = graph.has_travel_time(),
        "road graph loaded"
    );
    Ok(graph)
}

fn attributes(record: EdgeRecord) -> EdgeAttributes {
    let mut attrs = EdgeAttributes::new(record.length);
    if let Some(seconds) = record.travel_time {
        attrs = attrs.with_travel_time(seconds);
    }
    if let Some(bridge) = record.bridge {
        attrs = attrs.with_bridge(bridge.joined());
    }
    if let Some(tunnel) = record.tunnel {
        attrs = attrs.with_tunnel(tunnel.joined());
    }
    for class in record.highway.map(|tag| tag.into_vec()).unwrap_or_default() {
        attrs = attrs.with_highway(class);
    }
    if let Some(points) = record.geometry {
        attrs = attrs.with_geometry(LineString::from(points));
    }
    attrs
}
