//! Simple undirected projection of the road multigraph.
//!
//! Parallel and anti-parallel edges collapse into one link per unordered
//! node pair. Nodes and links are densely indexed in ascending order so
//! traversal code can work over plain vectors.

use std::collections::BTreeSet;

use super::{NodeId, NodePair, RoadGraph};

/// Dense, undirected view of a [`RoadGraph`].
#[derive(Debug, Clone)]
pub(crate) struct UndirectedProjection {
    nodes: Vec<NodeId>,
    links: Vec<NodePair>,
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl UndirectedProjection {
    pub(crate) fn from_graph(graph: &RoadGraph) -> Self {
        let nodes: Vec<NodeId> = graph.node_ids().collect();
        let links: Vec<NodePair> = graph
            .edge_ids()
            .map(|edge| edge.link())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for (link_index, link) in links.iter().enumerate() {
            let (Ok(low), Ok(high)) = (
                nodes.binary_search(&link.low()),
                nodes.binary_search(&link.high()),
            ) else {
                continue;
            };
            if let Some(entries) = adjacency.get_mut(low) {
                entries.push((high, link_index));
            }
            if low != high
                && let Some(entries) = adjacency.get_mut(high)
            {
                entries.push((low, link_index));
            }
        }

        Self {
            nodes,
            links,
            adjacency,
        }
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn links(&self) -> &[NodePair] {
        &self.links
    }

    /// Returns `(neighbour index, link index)` entries for `node`.
    pub(crate) fn neighbours(&self, node: usize) -> &[(usize, usize)] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EdgeAttributes, Node};

    #[test]
    fn parallel_and_reverse_edges_collapse() {
        let mut graph = RoadGraph::new();
        for id in 0..3 {
            graph.add_node(NodeId::new(id), Node::unplaced());
        }
        for (u, v) in [(0, 1), (1, 0), (0, 1), (1, 2)] {
            graph
                .add_edge(NodeId::new(u), NodeId::new(v), EdgeAttributes::new(1.0))
                .expect("edge must insert");
        }

        let projection = UndirectedProjection::from_graph(&graph);
        assert_eq!(projection.node_count(), 3);
        assert_eq!(projection.links().len(), 2);
        assert_eq!(projection.neighbours(1).len(), 2);
        assert_eq!(projection.neighbours(0), &[(1, 0)]);
    }

    #[test]
    fn self_loop_is_listed_once() {
        let mut graph = RoadGraph::new();
        for id in 0..2 {
            graph.add_node(NodeId::new(id), Node::unplaced());
        }
        graph
            .add_edge(NodeId::new(1), NodeId::new(1), EdgeAttributes::new(1.0))
            .expect("edge must insert");

        let projection = UndirectedProjection::from_graph(&graph);
        assert_eq!(projection.links().len(), 1);
        assert_eq!(projection.neighbours(1), &[(1, 0)]);
        assert!(projection.neighbours(0).is_empty());
        assert!(projection.neighbours(5).is_empty());
    }
}
