use std::collections::HashSet;

use crate::graph::model::GraphModel;

/// Induced subgraph over the nodes whose cluster is in `selected`.
///
/// `selected` is only read; an empty selection yields the empty graph.
pub fn filter_to_clusters(mut graph: GraphModel, selected: &[String]) -> GraphModel {
    let wanted: HashSet<&str> = selected.iter().map(String::as_str).collect();
    let removed = graph.retain_nodes(|_, attrs| wanted.contains(attrs.cluster.as_str()));
    tracing::debug!(
        removed,
        kept = graph.node_count(),
        edges = graph.edge_count(),
        "filtered graph to selected clusters"
    );
    graph
}

/// Resolves a request's cluster selection. `None` selects every cluster in the
/// graph (sorted); an explicit list is copied with duplicates dropped, keeping
/// first occurrence order.
pub fn resolve_selection(graph: &GraphModel, requested: Option<&[String]>) -> Vec<String> {
    match requested {
        None => graph.clusters(),
        Some(list) => {
            let mut seen = HashSet::new();
            list.iter()
                .filter(|c| seen.insert(c.as_str()))
                .cloned()
                .collect()
        }
    }
}
