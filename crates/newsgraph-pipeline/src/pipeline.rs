//! Request entry point: picks the snapshot and tables for a view and runs the
//! matching pipeline.

use anyhow::Result;
use newsgraph_core::RScore;
use rand::Rng;
use serde::Serialize;
use std::str::FromStr;

use crate::analysis::{explain_table, frequency_figure, select_r_scores, ExplainTable};
use crate::error::PipelineError;
use crate::graph::resolve_selection;
use crate::store::{DataSources, GraphKind, GraphStore, Language};
use crate::util::config::PipelineConfig;
use crate::views::{render_geo, render_similarity, render_temporal, Rendered};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Temporal,
    Geo,
    Similarity,
    Analysis,
    Scores,
    Explain,
    Clusters,
}

impl View {
    pub fn as_str(self) -> &'static str {
        match self {
            View::Temporal => "temporal",
            View::Geo => "geo",
            View::Similarity => "similarity",
            View::Analysis => "analysis",
            View::Scores => "scores",
            View::Explain => "explain",
            View::Clusters => "clusters",
        }
    }
}

impl FromStr for View {
    type Err = PipelineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "temporal" => Ok(View::Temporal),
            "geo" => Ok(View::Geo),
            "similarity" => Ok(View::Similarity),
            "analysis" => Ok(View::Analysis),
            "scores" => Ok(View::Scores),
            "explain" => Ok(View::Explain),
            "clusters" => Ok(View::Clusters),
            other => Err(PipelineError::UnknownView(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub view: View,
    pub language: Language,
    /// `None` selects every cluster of the loaded graph.
    pub clusters: Option<Vec<String>>,
}

impl Request {
    fn selection(&self) -> Option<&[String]> {
        self.clusters.as_deref()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Output {
    Figure(Rendered),
    Scores(Option<Vec<RScore>>),
    Explain(ExplainTable),
    Clusters(Vec<String>),
}

/// Owns the configuration, the snapshot store and the lazily loaded tables.
/// Graphs are loaded fresh for every request.
#[derive(Debug)]
pub struct Dashboard {
    cfg: PipelineConfig,
    store: GraphStore,
    sources: DataSources,
}

impl Dashboard {
    pub fn new(cfg: PipelineConfig) -> Self {
        let store = GraphStore::new(&cfg);
        let sources = DataSources::new(&cfg);
        Self {
            cfg,
            store,
            sources,
        }
    }

    pub fn run<R: Rng>(&self, req: &Request, rng: &mut R) -> Result<Output> {
        tracing::debug!(
            view = req.view.as_str(),
            language = %req.language,
            clusters = ?req.clusters,
            "running pipeline"
        );
        let out = match req.view {
            View::Temporal => Output::Figure(self.temporal(req.language, req.selection(), rng)?),
            View::Geo => Output::Figure(self.geo(req.language, req.selection())?),
            View::Similarity => Output::Figure(self.similarity(req.selection(), rng)?),
            View::Analysis => Output::Figure(self.analysis(req.selection())?),
            View::Scores => Output::Scores(self.scores(req.selection())?),
            View::Explain => Output::Explain(self.explain()?),
            View::Clusters => {
                Output::Clusters(self.cluster_options(GraphKind::TemporalRetweet, req.language)?)
            }
        };
        Ok(out)
    }

    pub fn temporal<R: Rng>(
        &self,
        language: Language,
        selection: Option<&[String]>,
        rng: &mut R,
    ) -> Result<Rendered> {
        let graph = self.store.load(GraphKind::TemporalRetweet, language)?;
        let conflicts = self.sources.conflicts()?;
        Ok(render_temporal(
            graph,
            selection,
            conflicts,
            &self.cfg.conflict_window,
            &self.cfg.temporal_range,
            rng,
        )?)
    }

    pub fn geo(&self, language: Language, selection: Option<&[String]>) -> Result<Rendered> {
        let graph = self.store.load(GraphKind::GeoRetweet, language)?;
        Ok(render_geo(graph, selection)?)
    }

    pub fn similarity<R: Rng>(
        &self,
        selection: Option<&[String]>,
        rng: &mut R,
    ) -> Result<Rendered> {
        let graph = self.store.load_similarity()?;
        let docs = self.sources.documents()?;
        Ok(render_similarity(
            graph,
            selection,
            docs,
            &self.cfg.layout.force_params(),
            rng,
        )?)
    }

    /// Frequency lines. Without an explicit selection only the totals are
    /// drawn; selected clusters without a column are left out of `clusters`.
    pub fn analysis(&self, selection: Option<&[String]>) -> Result<Rendered> {
        let table = self.sources.frequencies()?;
        let clusters: Vec<String> = selection
            .unwrap_or_default()
            .iter()
            .filter(|c| table.column(c).is_some())
            .cloned()
            .collect();
        let figure = frequency_figure(table, &clusters, &self.cfg.analysis_range);
        Ok(Rendered { figure, clusters })
    }

    pub fn scores(&self, selection: Option<&[String]>) -> Result<Option<Vec<RScore>>> {
        if selection.map_or(true, <[String]>::is_empty) {
            return Ok(None);
        }
        Ok(select_r_scores(self.sources.r_scores()?, selection))
    }

    pub fn explain(&self) -> Result<ExplainTable> {
        Ok(explain_table(self.sources.cluster_explain()?))
    }

    /// Sorted cluster labels of a snapshot, for the selector.
    pub fn cluster_options(&self, kind: GraphKind, language: Language) -> Result<Vec<String>> {
        let graph = self.store.load(kind, language)?;
        Ok(resolve_selection(&graph, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newsgraph_core::{Edge, GraphSnapshot, NodeAttrs, NodeId};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fs;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    fn day(m: u32, d: u32) -> chrono::NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2016, m, d)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("date")
    }

    fn write_json<T: Serialize>(path: &Path, value: &T) {
        fs::write(path, serde_json::to_string(value).expect("encode")).expect("write");
    }

    /// Data and graph directories populated with a small but complete data set.
    fn fixture() -> (TempDir, Dashboard) {
        let dir = tempdir().expect("tempdir");
        let cfg = PipelineConfig::default().with_root(dir.path());
        fs::create_dir_all(&cfg.data_dir).expect("mkdir data");
        fs::create_dir_all(&cfg.graph_dir).expect("mkdir graphs");

        let node = |c: &str, m: u32| {
            NodeAttrs::in_cluster(c)
                .with_date(day(m, 1))
                .with_coords(50.0, 30.0)
        };
        let retweets = GraphSnapshot {
            directed: false,
            nodes: vec![
                (NodeId::new("u1"), node("left", 2)),
                (NodeId::new("u2"), node("left", 3)),
                (NodeId::new("u3"), node("right", 4)),
            ],
            edges: vec![
                Edge::new(NodeId::new("u1"), NodeId::new("u2")),
                Edge::new(NodeId::new("u2"), NodeId::new("u3")),
            ],
        };
        let store = GraphStore::new(&cfg);
        for kind in [GraphKind::TemporalRetweet, GraphKind::GeoRetweet] {
            write_json(&store.snapshot_path(kind, Language::English), &retweets);
        }

        let similarity = GraphSnapshot {
            directed: true,
            nodes: vec![
                (NodeId::new("p1"), node("left", 2)),
                (NodeId::new("p2"), node("left", 2)),
                (NodeId::new("p3"), node("right", 2)),
            ],
            edges: vec![Edge::scored(NodeId::new("p1"), NodeId::new("p2"), 0.5)],
        };
        write_json(&store.similarity_path(), &similarity);

        fs::write(
            cfg.data_path(&cfg.similarity_metadata),
            "Publication (original),Title,Language,Keywords,score\n\
             p1,First,English,a,0.1\n\
             p2,Second,English,b,0.2\n",
        )
        .expect("write docs");
        fs::write(
            cfg.data_path(&cfg.conflict_file),
            "conflict_name,date_start,date_end,deaths_civilians\n\
             header junk,2000-01-01,2000-01-01,0\n\
             Donetsk,2016-05-05,2016-05-06,1\n",
        )
        .expect("write conflicts");
        fs::write(
            cfg.graph_path(&cfg.frequencies_file),
            "date,left,right,sum,conflicts\n2016-01-01,1,0,1,0\n",
        )
        .expect("write frequencies");
        fs::write(
            cfg.graph_path(&cfg.r_scores_file),
            r#"[{"Cluster": "left", "r": 0.1}, {"Cluster": "right", "r": 0.2}, {"Cluster": "sum", "r": 0.3}]"#,
        )
        .expect("write scores");
        fs::write(
            cfg.data_path(&cfg.cluster_explain_file),
            r#"[{"cluster": "left", "keywords": "a", "average_sim": 0.5, "links": 1}]"#,
        )
        .expect("write explain");

        (dir, Dashboard::new(cfg))
    }

    fn request(view: View, clusters: Option<&[&str]>) -> Request {
        Request {
            view,
            language: Language::English,
            clusters: clusters.map(|c| c.iter().map(|s| s.to_string()).collect()),
        }
    }

    fn figure(out: Output) -> Rendered {
        match out {
            Output::Figure(r) => r,
            other => panic!("expected a figure, got {other:?}"),
        }
    }

    #[test]
    fn view_names_parse() {
        assert_eq!("geo".parse::<View>(), Ok(View::Geo));
        assert_eq!(
            "pie".parse::<View>(),
            Err(PipelineError::UnknownView("pie".to_string()))
        );
    }

    #[test]
    fn temporal_view_runs_end_to_end() {
        let (_dir, dash) = fixture();
        let mut rng = StdRng::seed_from_u64(1);
        let out = figure(dash.run(&request(View::Temporal, None), &mut rng).expect("run"));

        assert_eq!(out.clusters, vec!["left".to_string(), "right".to_string()]);
        let conflict = out.figure.traces.last().expect("conflict trace");
        // the junk first row is skipped, the Donetsk row is inside the window
        assert_eq!(conflict.x.len(), 1);
    }

    #[test]
    fn missing_language_variant_is_a_load_error() {
        let (_dir, dash) = fixture();
        let mut req = request(View::Geo, None);
        req.language = Language::Russian;
        let err = dash.run(&req, &mut StdRng::seed_from_u64(1)).expect_err("no russian graph");
        assert!(format!("{err:#}").contains("retweet_geonetwork_russian.json"));
    }

    #[test]
    fn geo_view_keeps_only_selected_clusters() {
        let (_dir, dash) = fixture();
        let out = figure(
            dash.run(&request(View::Geo, Some(&["right"])), &mut StdRng::seed_from_u64(1))
                .expect("run"),
        );
        assert_eq!(out.clusters, vec!["right".to_string()]);
        assert_eq!(out.figure.traces.len(), 2);
    }

    #[test]
    fn similarity_view_skips_documents_without_neighbours() {
        let (_dir, dash) = fixture();
        // p3 has no metadata row; it must be gone before the join
        let out = figure(
            dash.run(&request(View::Similarity, None), &mut StdRng::seed_from_u64(1))
                .expect("run"),
        );
        assert_eq!(out.clusters, vec!["left".to_string()]);
    }

    #[test]
    fn table_views() {
        let (_dir, dash) = fixture();
        let mut rng = StdRng::seed_from_u64(1);

        let analysis = figure(
            dash.run(&request(View::Analysis, Some(&["left"])), &mut rng)
                .expect("run"),
        );
        assert_eq!(analysis.figure.traces.len(), 3);
        assert_eq!(analysis.clusters, vec!["left".to_string()]);

        let analysis = figure(
            dash.run(&request(View::Analysis, Some(&["left", "ghost"])), &mut rng)
                .expect("run"),
        );
        assert_eq!(analysis.figure.traces.len(), 3);
        assert_eq!(analysis.clusters, vec!["left".to_string()]);

        match dash.run(&request(View::Scores, Some(&["right"])), &mut rng).expect("run") {
            Output::Scores(Some(rows)) => assert_eq!(rows.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            dash.run(&request(View::Scores, None), &mut rng).expect("run"),
            Output::Scores(None)
        );

        match dash.run(&request(View::Explain, None), &mut rng).expect("run") {
            Output::Explain(table) => assert_eq!(table.tooltips[0]["links"].value, "1"),
            other => panic!("unexpected {other:?}"),
        }

        assert_eq!(
            dash.run(&request(View::Clusters, None), &mut rng).expect("run"),
            Output::Clusters(vec!["left".to_string(), "right".to_string()])
        );
    }

    #[test]
    fn output_is_tagged_json() {
        let value = serde_json::to_value(Output::Clusters(vec!["left".to_string()])).expect("encode");
        assert_eq!(value["kind"], "clusters");
        assert_eq!(value["data"][0], "left");
    }
}
