//! Per-view pipelines: filter, lay out and partition an already loaded graph,
//! then describe the result as a [`Figure`].

use newsgraph_core::{
    Axis, AxisKind, AxisValue, ConflictEvent, Figure, Marker, Trace, TraceKind, TraceMode,
};
use rand::Rng;
use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::graph::layout::ForceParams;
use crate::graph::metrics::{edge_widths, node_size};
use crate::graph::{
    filter_to_clusters, geo_layout, remove_singles, resolve_selection, spring_layout,
    temporal_layout, ClusterBounds, GraphModel,
};
use crate::overlay::conflict_series;
use crate::series::{build_partitioned_series, build_series, ClusterSeries, SeriesSet};
use crate::tables::DocumentIndex;
use crate::util::config::DateWindow;
use crate::util::labels::truncate_label;

const EDGE_LINE_WIDTH: f64 = 0.5;
const SIMILARITY_CLUSTER_CHARS: usize = 50;

/// A figure plus the clusters that still had nodes once it was built.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Rendered {
    pub figure: Figure,
    pub clusters: Vec<String>,
}

fn cluster_markers(kind: TraceKind, group: &ClusterSeries) -> Trace {
    Trace::markers(
        kind,
        Some(group.cluster.clone()),
        group.nodes.x.clone(),
        group.nodes.y.clone(),
    )
}

fn edge_lines(kind: TraceKind, name: Option<String>, series: &SeriesSet) -> Trace {
    Trace::lines(kind, name, series.edges.x.clone(), series.edges.y.clone())
}

/// Retweets over time: one jittered band per cluster, conflicts underneath.
pub fn render_temporal<R: Rng>(
    graph: GraphModel,
    selection: Option<&[String]>,
    conflicts: &[ConflictEvent],
    conflict_window: &DateWindow,
    x_range: &DateWindow,
    rng: &mut R,
) -> Result<Rendered> {
    let clusters = resolve_selection(&graph, selection);
    let graph = filter_to_clusters(graph, &clusters);
    let bounds = ClusterBounds::from_clusters(&clusters);
    let layout = temporal_layout(&graph, &bounds, rng)?;
    let series = build_series(&graph, &layout, &clusters)?;
    let overlay = conflict_series(
        conflicts,
        conflict_window.start_at_midnight(),
        conflict_window.end_at_midnight(),
        rng,
    );
    let surviving = series.surviving_clusters();

    let mut traces = vec![edge_lines(TraceKind::Scatter, Some("Edges".to_string()), &series)
        .with_line_width(vec![EDGE_LINE_WIDTH])];
    traces.extend(
        series
            .clusters
            .iter()
            .map(|g| cluster_markers(TraceKind::Scatter, g)),
    );
    traces.push(
        Trace::markers(
            TraceKind::Scatter,
            Some("Conflicts".to_string()),
            overlay.x,
            overlay.y,
        )
        .with_marker(Marker {
            size: overlay.sizes,
            color: Vec::new(),
        })
        .with_hover(overlay.hover),
    );

    let mut x_axis = Axis::of(AxisKind::Date);
    x_axis.range = Some((
        AxisValue::Date(x_range.start_at_midnight()),
        AxisValue::Date(x_range.end_at_midnight()),
    ));
    let mut y_axis = Axis::of(AxisKind::Linear);
    y_axis.ticks = bounds.ticks(&surviving);

    Ok(Rendered {
        figure: Figure {
            title: "Fake news spread through retweets".to_string(),
            traces,
            x_axis,
            y_axis,
            y2_axis: None,
            show_legend: true,
        },
        clusters: surviving,
    })
}

/// Retweets on a world map, edges coloured with their source cluster.
pub fn render_geo(graph: GraphModel, selection: Option<&[String]>) -> Result<Rendered> {
    let clusters = resolve_selection(&graph, selection);
    let graph = filter_to_clusters(graph, &clusters);
    let layout = geo_layout(&graph)?;
    let series = build_partitioned_series(&graph, &layout, &clusters)?;

    let mut traces = Vec::with_capacity(series.clusters.len() * 2);
    for group in &series.clusters {
        traces.push(
            Trace::lines(
                TraceKind::ScatterGeo,
                Some(group.cluster.clone()),
                group.edges.x.clone(),
                group.edges.y.clone(),
            )
            .hidden_from_legend(),
        );
    }
    traces.extend(
        series
            .clusters
            .iter()
            .map(|g| cluster_markers(TraceKind::ScatterGeo, g)),
    );

    Ok(Rendered {
        figure: Figure {
            title: "Geolocation of Tweets".to_string(),
            traces,
            x_axis: Axis::of(AxisKind::Hidden),
            y_axis: Axis::of(AxisKind::Hidden),
            y2_axis: None,
            show_legend: true,
        },
        clusters: series.surviving_clusters(),
    })
}

fn describe_document(
    graph: &GraphModel,
    docs: &DocumentIndex,
    id: &newsgraph_core::NodeId,
) -> Result<(String, f64)> {
    let attrs = graph
        .nodes
        .get(id)
        .ok_or_else(|| PipelineError::MissingAttribute {
            node: id.0.clone(),
            attribute: "cluster",
        })?;
    let date = attrs.date.ok_or_else(|| PipelineError::MissingAttribute {
        node: id.0.clone(),
        attribute: "date",
    })?;
    let meta = docs.lookup(&id.0)?;
    let cluster = truncate_label(
        &format!("Cluster: {}", attrs.cluster),
        SIMILARITY_CLUSTER_CHARS,
    );
    let text = format!(
        "<b>{id}</b><br>{cluster}<br>Title: {}<br>Date of publication: {}<br>\
         Language of article: {}<br>Keywords of article: {}<br>\
         Similarity score with connection: {:?}",
        meta.title,
        date.format("%Y-%m-%d"),
        meta.language,
        meta.keywords,
        meta.score,
    );
    Ok((text, meta.score))
}

/// Document similarity network. Singleton components go first, then the
/// cluster filter, then a spring layout of what is left.
pub fn render_similarity<R: Rng>(
    graph: GraphModel,
    selection: Option<&[String]>,
    docs: &DocumentIndex,
    params: &ForceParams,
    rng: &mut R,
) -> Result<Rendered> {
    let graph = remove_singles(graph);
    let clusters = resolve_selection(&graph, selection);
    let graph = filter_to_clusters(graph, &clusters);
    let layout = spring_layout(&graph, params, rng);
    let series = build_series(&graph, &layout, &clusters)?;
    let degree = graph.in_degrees();

    let mut traces = vec![edge_lines(TraceKind::Scatter, None, &series)
        .with_line_width(edge_widths(&graph))
        .hidden_from_legend()];

    for group in &series.clusters {
        let mut marker = Marker::default();
        let mut hover = Vec::with_capacity(group.nodes.len());
        for id in &group.nodes.ids {
            let (text, score) = describe_document(&graph, docs, id)?;
            marker
                .size
                .push(node_size(degree.get(id).copied().unwrap_or(0)));
            marker.color.push(score);
            hover.push(text);
        }
        let mut trace = cluster_markers(TraceKind::Scatter, group)
            .with_marker(marker)
            .with_hover(hover)
            .hidden_from_legend();
        trace.mode = TraceMode::MarkersText;
        traces.push(trace);
    }

    Ok(Rendered {
        figure: Figure {
            title: "Visualise document similarity".to_string(),
            traces,
            x_axis: Axis::of(AxisKind::Hidden),
            y_axis: Axis::of(AxisKind::Hidden),
            y2_axis: None,
            show_legend: false,
        },
        clusters: series.surviving_clusters(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::fixtures::*;
    use crate::util::config::PipelineConfig;
    use newsgraph_core::{DocumentMeta, Edge, GraphSnapshot, NodeAttrs};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn owned(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn conflicts() -> Vec<ConflictEvent> {
        vec![ConflictEvent {
            conflict_name: "Ukraine: Government".to_string(),
            date_start: day(2016, 4, 1),
            date_end: day(2016, 4, 2),
            deaths_civilians: 2,
        }]
    }

    fn temporal(selection: Option<&[String]>) -> Rendered {
        let cfg = PipelineConfig::default();
        render_temporal(
            retweet_graph(),
            selection,
            &conflicts(),
            &cfg.conflict_window,
            &cfg.temporal_range,
            &mut StdRng::seed_from_u64(4),
        )
        .expect("render")
    }

    fn trace_names(fig: &Figure) -> Vec<Option<&str>> {
        fig.traces.iter().map(|t| t.name.as_deref()).collect()
    }

    #[test]
    fn temporal_defaults_to_every_cluster_sorted() {
        let out = temporal(None);
        assert_eq!(out.clusters, owned(&["far", "left", "right"]));
        assert_eq!(
            trace_names(&out.figure),
            vec![
                Some("Edges"),
                Some("far"),
                Some("left"),
                Some("right"),
                Some("Conflicts")
            ]
        );
        let labels: Vec<_> = out.figure.y_axis.ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["Conflict", "far", "left", "right"]);
        assert_eq!(out.figure.traces[0].x.len(), 15);
    }

    #[test]
    fn temporal_ticks_use_the_pruned_cluster_list() {
        let selection = owned(&["ghost", "left"]);
        let out = temporal(Some(&selection));
        assert_eq!(out.clusters, owned(&["left"]));
        let ticks = &out.figure.y_axis.ticks;
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[1].label, "left");
        // "ghost" still owns band 2, so "left" sits in band 3
        assert!((ticks[1].value - 3.4).abs() < 1e-9);
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn temporal_conflict_overlay_carries_sizes_and_hover() {
        let out = temporal(None);
        let conflict = out.figure.traces.last().expect("conflict trace");
        assert_eq!(conflict.marker.as_ref().map(|m| m.size.clone()), Some(vec![20.0]));
        assert_eq!(conflict.hover_text.len(), 1);
        assert!(conflict.hover_text[0].contains("Ukraine: Government"));
    }

    #[test]
    fn empty_selection_renders_only_the_overlay() {
        let out = temporal(Some(&[]));
        assert!(out.clusters.is_empty());
        assert!(out.figure.traces[0].x.is_empty());
        assert_eq!(out.figure.traces.len(), 2);
        assert_eq!(out.figure.y_axis.ticks.len(), 1);
    }

    #[test]
    fn geo_emits_line_and_marker_trace_per_cluster() {
        let selection = owned(&["left", "right"]);
        let out = render_geo(retweet_graph(), Some(&selection)).expect("render");
        assert_eq!(out.clusters, selection);
        assert_eq!(out.figure.traces.len(), 4);
        assert!(out.figure.traces[..2].iter().all(|t| t.mode == TraceMode::Lines));
        assert!(out.figure.traces.iter().all(|t| t.kind == TraceKind::ScatterGeo));
        // a-b, b-c, c-d leave "left"
        assert_eq!(out.figure.traces[0].x.len(), 9);
    }

    fn similarity_graph() -> GraphModel {
        let dated = |c: &str| NodeAttrs::in_cluster(c).with_date(day(2016, 3, 1));
        GraphModel::from_snapshot(GraphSnapshot {
            directed: true,
            nodes: vec![
                (id("d1"), dated("crimea")),
                (id("d2"), dated("crimea")),
                (id("d3"), dated("crimea")),
                (id("d4"), dated("mh17")),
                (id("lonely"), dated("mh17")),
            ],
            edges: vec![
                Edge::scored(id("d1"), id("d3"), 0.5),
                Edge::scored(id("d2"), id("d3"), -1.0),
                Edge::scored(id("d3"), id("d4"), 0.9),
            ],
        })
        .expect("graph")
    }

    fn docs(ids: &[&str]) -> DocumentIndex {
        DocumentIndex::from_rows(ids.iter().map(|id| DocumentMeta {
            publication: id.to_string(),
            title: format!("Title of {id}"),
            language: "English".to_string(),
            keywords: "kw".to_string(),
            score: if *id == "d1" { 1.0 } else { 0.5 },
        }))
    }

    fn similarity(selection: Option<&[String]>, index: &DocumentIndex) -> Result<Rendered> {
        let params = ForceParams {
            iterations: 40,
            ..ForceParams::default()
        };
        render_similarity(
            similarity_graph(),
            selection,
            index,
            &params,
            &mut StdRng::seed_from_u64(2),
        )
    }

    #[test]
    fn similarity_drops_singletons_and_sizes_by_in_degree() {
        let out = similarity(None, &docs(&["d1", "d2", "d3", "d4"])).expect("render");
        assert_eq!(out.clusters, owned(&["crimea", "mh17"]));

        let edges = &out.figure.traces[0];
        assert_eq!(edges.line_width, vec![0.25, 2.0, 2.0 * 0.9f64.powi(3)]);

        let crimea = &out.figure.traces[1];
        assert_eq!(crimea.mode, TraceMode::MarkersText);
        let sizes = crimea.marker.as_ref().map(|m| m.size.clone()).expect("sizes");
        // d3 is the target of two edges
        assert_eq!(sizes, vec![10.0, 10.0, 3f64.sqrt() * 10.0]);
        assert!(crimea.hover_text[0]
            .starts_with("<b>d1</b><br>Cluster: crimea<br>Title: Title of d1"));
        assert!(crimea.hover_text[0].contains("Date of publication: 2016-03-01"));

        let mh17 = &out.figure.traces[2];
        assert_eq!(mh17.x.len(), 1);
    }

    #[test]
    fn similarity_hover_keeps_the_decimal_point_on_scores() {
        let out = similarity(None, &docs(&["d1", "d2", "d3", "d4"])).expect("render");
        let crimea = &out.figure.traces[1];
        assert!(crimea.hover_text[0].ends_with("Similarity score with connection: 1.0"));
        assert!(crimea.hover_text[1].ends_with("Similarity score with connection: 0.5"));
        let colors = crimea.marker.as_ref().map(|m| m.color.clone()).expect("colors");
        assert_eq!(colors, vec![1.0, 0.5, 0.5]);
    }

    #[test]
    fn similarity_fails_on_missing_metadata() {
        let err = similarity(None, &docs(&["d1", "d2", "d3"])).expect_err("d4 unknown");
        assert_eq!(err, PipelineError::UnknownDocument("d4".to_string()));
    }

    #[test]
    fn similarity_filters_after_singleton_removal() {
        let selection = owned(&["mh17"]);
        let out = similarity(Some(&selection), &docs(&["d4"])).expect("render");
        assert_eq!(out.clusters, selection);
        assert_eq!(out.figure.traces[0].line_width, Vec::<f64>::new());
        assert_eq!(out.figure.traces[1].x.len(), 1);
    }
}
