//! Weakly connected components of the road graph.
//!
//! Edge direction is ignored: two nodes share a component when an undirected
//! walk joins them. Membership is tracked with a path-compressing disjoint set.

use super::{NodeId, RoadGraph};

#[derive(Clone, Debug)]
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        loop {
            let parent = self.parent_of(root);
            if parent == root {
                break;
            }
            root = parent;
        }

        while let Some(slot) = self.parent.get_mut(node) {
            if *slot == node {
                break;
            }
            let next = *slot;
            *slot = root;
            node = next;
        }

        root
    }

    fn union(&mut self, left: usize, right: usize) {
        let mut left = self.find(left);
        let mut right = self.find(right);
        if left == right {
            return;
        }
        let left_rank = self.rank_of(left);
        let right_rank = self.rank_of(right);
        if left_rank < right_rank {
            std::mem::swap(&mut left, &mut right);
        }
        if let Some(slot) = self.parent.get_mut(right) {
            *slot = left;
        }
        let merged = self.size_of(left).saturating_add(self.size_of(right));
        if let Some(slot) = self.size.get_mut(left) {
            *slot = merged;
        }
        if left_rank == right_rank
            && let Some(slot) = self.rank.get_mut(left)
        {
            *slot = left_rank.saturating_add(1);
        }
    }

    /// Indices outside the set act as singleton roots.
    fn parent_of(&self, node: usize) -> usize {
        self.parent.get(node).copied().unwrap_or(node)
    }

    fn rank_of(&self, node: usize) -> u8 {
        self.rank.get(node).copied().unwrap_or(0)
    }

    fn size_of(&self, root: usize) -> usize {
        self.size.get(root).copied().unwrap_or(0)
    }
}

/// Returns the nodes of the largest weakly connected component, ascending.
///
/// Equal-sized components are resolved towards the one containing the
/// smallest node identifier. An empty graph yields an empty vector.
///
/// # Examples
/// ```
/// use kairo_core::{EdgeAttributes, Node, NodeId, RoadGraph, largest_weak_component};
///
/// let mut graph = RoadGraph::new();
/// for id in 1..=4 {
///     graph.add_node(NodeId::new(id), Node::unplaced());
/// }
/// graph.add_edge(NodeId::new(3), NodeId::new(2), EdgeAttributes::new(1.0))?;
/// graph.add_edge(NodeId::new(3), NodeId::new(4), EdgeAttributes::new(1.0))?;
/// assert_eq!(
///     largest_weak_component(&graph),
///     [NodeId::new(2), NodeId::new(3), NodeId::new(4)]
/// );
/// # Ok::<(), kairo_core::GraphError>(())
/// ```
#[must_use]
pub fn largest_weak_component(graph: &RoadGraph) -> Vec<NodeId> {
    let ids: Vec<NodeId> = graph.node_ids().collect();
    if ids.is_empty() {
        return Vec::new();
    }

    let mut set = DisjointSet::new(ids.len());
    for edge in graph.edge_ids() {
        if let (Ok(left), Ok(right)) = (
            ids.binary_search(&edge.source()),
            ids.binary_search(&edge.target()),
        ) {
            set.union(left, right);
        }
    }

    let mut best_root = set.find(0);
    let mut best_size = set.size_of(best_root);
    for index in 1..ids.len() {
        let root = set.find(index);
        let size = set.size_of(root);
        if size > best_size {
            best_root = root;
            best_size = size;
        }
    }

    ids.iter()
        .enumerate()
        .filter(|&(index, _)| set.find(index) == best_root)
        .map(|(_, &id)| id)
        .collect()
}
