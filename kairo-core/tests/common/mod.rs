use kairo_core::{EdgeAttributes, EdgeId, Node, NodeId, RoadGraph};

/// Two-way chain of ten nodes whose single `4 -> 5` edge is a bridge.
///
/// Returns the graph together with the bridge edge.
#[must_use]
pub fn bridged_chain() -> (RoadGraph, EdgeId) {
    let mut graph = RoadGraph::new();
    for id in 0..10 {
        graph.add_node(NodeId::new(id), Node::at(id as f64, 0.0));
    }
    let mut bridge = None;
    for id in 1..10 {
        let forward = if id == 5 {
            EdgeAttributes::new(1.0).with_bridge("yes")
        } else {
            EdgeAttributes::new(1.0)
        };
        let edge = graph
            .add_edge(NodeId::new(id - 1), NodeId::new(id), forward)
            .expect("forward edge must insert");
        if id == 5 {
            bridge = Some(edge);
        }
        graph
            .add_edge(NodeId::new(id), NodeId::new(id - 1), EdgeAttributes::new(1.0))
            .expect("backward edge must insert");
    }
    (graph, bridge.expect("chain contains the bridge"))
}

/// Square ring `0 - 1 - 2 - 3 - 0` of two-way streets with a primary
/// highway on both directions of `0 - 1`.
#[must_use]
pub fn ring() -> RoadGraph {
    let mut graph = RoadGraph::new();
    for (id, (x, y)) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)].into_iter().enumerate() {
        graph.add_node(NodeId::new(id as u64), Node::at(x, y));
    }
    for (u, v) in [(0, 1), (1, 2), (2, 3), (3, 0)] {
        let attrs = || {
            let attrs = EdgeAttributes::new(1.0);
            if (u, v) == (0, 1) {
                attrs.with_highway("primary")
            } else {
                attrs
            }
        };
        graph
            .add_edge(NodeId::new(u), NodeId::new(v), attrs())
            .expect("edge must insert");
        graph
            .add_edge(NodeId::new(v), NodeId::new(u), attrs())
            .expect("edge must insert");
    }
    graph
}
