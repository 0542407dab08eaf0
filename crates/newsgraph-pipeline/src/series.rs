//! Turns a laid-out graph into cluster-partitioned point series.
//!
//! Clusters that end up with no nodes are pruned. The surviving cluster list
//! is part of the return value; the caller's selection is never touched.

use newsgraph_core::{AxisValue, NodeId};

use crate::error::{PipelineError, Result};
use crate::graph::layout::{Layout, Position};
use crate::graph::model::GraphModel;

/// Line coordinates where every edge contributes `start, end, None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeSeries {
    pub x: Vec<Option<AxisValue>>,
    pub y: Vec<Option<f64>>,
}

impl EdgeSeries {
    fn push_segment(&mut self, start: &Position, end: &Position) {
        self.x.push(Some(start.x.clone()));
        self.x.push(Some(end.x.clone()));
        self.x.push(None);
        self.y.push(Some(start.y));
        self.y.push(Some(end.y));
        self.y.push(None);
    }

    pub fn segment_count(&self) -> usize {
        self.x.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeSeries {
    pub ids: Vec<NodeId>,
    pub x: Vec<AxisValue>,
    pub y: Vec<f64>,
}

impl NodeSeries {
    fn push(&mut self, id: &NodeId, pos: &Position) {
        self.ids.push(id.clone());
        self.x.push(pos.x.clone());
        self.y.push(pos.y);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSeries {
    pub cluster: String,
    pub nodes: NodeSeries,
    /// Only filled by [`build_partitioned_series`].
    pub edges: EdgeSeries,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSet {
    pub edges: EdgeSeries,
    pub clusters: Vec<ClusterSeries>,
}

impl SeriesSet {
    /// Clusters with at least one node, in selection order.
    pub fn surviving_clusters(&self) -> Vec<String> {
        self.clusters.iter().map(|c| c.cluster.clone()).collect()
    }

    pub fn get(&self, cluster: &str) -> Option<&ClusterSeries> {
        self.clusters.iter().find(|c| c.cluster == cluster)
    }
}

/// One shared edge series plus one node series per cluster.
pub fn build_series(
    graph: &GraphModel,
    layout: &Layout,
    clusters: &[String],
) -> Result<SeriesSet> {
    let mut groups = group_nodes(graph, layout, clusters)?;
    prune_empty(&mut groups);
    if groups.is_empty() {
        return Ok(SeriesSet::default());
    }

    let mut edges = EdgeSeries::default();
    for e in &graph.edges {
        edges.push_segment(layout.require(&e.from)?, layout.require(&e.to)?);
    }

    Ok(SeriesSet {
        edges,
        clusters: groups,
    })
}

/// Like [`build_series`], but edges are split by the cluster of their
/// source node instead of sharing one series.
pub fn build_partitioned_series(
    graph: &GraphModel,
    layout: &Layout,
    clusters: &[String],
) -> Result<SeriesSet> {
    let mut groups = group_nodes(graph, layout, clusters)?;

    for e in &graph.edges {
        let cluster = graph
            .cluster_of(&e.from)
            .ok_or_else(|| PipelineError::MissingAttribute {
                node: e.from.0.clone(),
                attribute: "cluster",
            })?;
        let Some(group) = groups.iter_mut().find(|g| g.cluster == cluster) else {
            continue;
        };
        group
            .edges
            .push_segment(layout.require(&e.from)?, layout.require(&e.to)?);
    }

    prune_empty(&mut groups);
    Ok(SeriesSet {
        edges: EdgeSeries::default(),
        clusters: groups,
    })
}

fn group_nodes(
    graph: &GraphModel,
    layout: &Layout,
    clusters: &[String],
) -> Result<Vec<ClusterSeries>> {
    let mut groups: Vec<ClusterSeries> = clusters
        .iter()
        .map(|c| ClusterSeries {
            cluster: c.clone(),
            nodes: NodeSeries::default(),
            edges: EdgeSeries::default(),
        })
        .collect();

    for (id, attrs) in &graph.nodes {
        let group = groups
            .iter_mut()
            .find(|g| g.cluster == attrs.cluster)
            .ok_or_else(|| PipelineError::MissingAttribute {
                node: id.0.clone(),
                attribute: "selected cluster",
            })?;
        group.nodes.push(id, layout.require(id)?);
    }
    Ok(groups)
}

fn prune_empty(groups: &mut Vec<ClusterSeries>) {
    let before = groups.len();
    groups.retain(|g| !g.nodes.is_empty());
    if groups.len() != before {
        tracing::debug!(pruned = before - groups.len(), "dropped clusters without nodes");
    }
}
