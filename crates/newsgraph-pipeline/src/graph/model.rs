use newsgraph_core::{Edge, GraphSnapshot, NodeAttrs, NodeId};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{PipelineError, Result};

/// In-memory graph for one request. Nodes are kept ordered by id so every
/// stage iterates them the same way.
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    pub directed: bool,
    pub nodes: BTreeMap<NodeId, NodeAttrs>,
    pub edges: Vec<Edge>,
}

impl GraphModel {
    pub fn from_snapshot(snap: GraphSnapshot) -> Result<Self> {
        let mut nodes = BTreeMap::new();
        for (id, attrs) in snap.nodes {
            if nodes.contains_key(&id) {
                return Err(PipelineError::DuplicateNode(id.0));
            }
            nodes.insert(id, attrs);
        }
        for edge in &snap.edges {
            if !(nodes.contains_key(&edge.from) && nodes.contains_key(&edge.to)) {
                return Err(PipelineError::DanglingEdge {
                    from: edge.from.0.clone(),
                    to: edge.to.0.clone(),
                });
            }
        }
        Ok(Self {
            directed: snap.directed,
            nodes,
            edges: snap.edges,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn cluster_of(&self, id: &NodeId) -> Option<&str> {
        self.nodes.get(id).map(|n| n.cluster.as_str())
    }

    /// Distinct cluster labels, sorted ascending.
    pub fn clusters(&self) -> Vec<String> {
        self.nodes
            .values()
            .map(|n| n.cluster.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Keeps the nodes accepted by `keep` plus exactly the edges whose both
    /// endpoints survive. Returns how many nodes were dropped.
    pub fn retain_nodes<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&NodeId, &NodeAttrs) -> bool,
    {
        let before = self.nodes.len();
        self.nodes.retain(|id, attrs| keep(id, attrs));
        let nodes = &self.nodes;
        self.edges
            .retain(|e| nodes.contains_key(&e.from) && nodes.contains_key(&e.to));
        before - self.nodes.len()
    }

    /// Number of edges pointing at each node. Nodes without incoming edges map to 0.
    pub fn in_degrees(&self) -> HashMap<&NodeId, usize> {
        let mut degree: HashMap<&NodeId, usize> = self.nodes.keys().map(|id| (id, 0)).collect();
        for e in &self.edges {
            if let Some(d) = degree.get_mut(&e.to) {
                *d += 1;
            }
        }
        degree
    }
}
