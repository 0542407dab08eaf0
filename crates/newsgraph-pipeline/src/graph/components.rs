use newsgraph_core::NodeId;
use petgraph::unionfind::UnionFind;
use std::collections::{HashMap, HashSet};

use crate::graph::model::GraphModel;

/// Drops every node that sits in a weakly-connected component of size 1,
/// i.e. documents without any corroborating similar document.
pub fn remove_singles(mut graph: GraphModel) -> GraphModel {
    let index: HashMap<&NodeId, usize> = graph
        .nodes
        .keys()
        .enumerate()
        .map(|(i, id)| (id, i))
        .collect();

    // edge direction is ignored: union-find only sees undirected links
    let mut uf = UnionFind::<usize>::new(index.len());
    for e in &graph.edges {
        if let (Some(&a), Some(&b)) = (index.get(&e.from), index.get(&e.to)) {
            uf.union(a, b);
        }
    }
    let labels = uf.into_labeling();

    let mut sizes: HashMap<usize, usize> = HashMap::new();
    for label in &labels {
        *sizes.entry(*label).or_insert(0) += 1;
    }

    let keep: HashSet<NodeId> = index
        .iter()
        .filter(|(_, i)| sizes.get(&labels[**i]).copied().unwrap_or(0) > 1)
        .map(|(id, _)| (*id).clone())
        .collect();

    let removed = graph.retain_nodes(|id, _| keep.contains(id));
    tracing::debug!(removed, kept = graph.node_count(), "removed singleton components");
    graph
}
