//! Snapshot and table access. Every call reads the persisted files fresh
//! except for the caller-owned table cache in [`DataSources`].

use anyhow::{Context, Result};
use newsgraph_core::{ConflictEvent, GraphSnapshot, RScore, TableRow};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::PipelineError;
use crate::graph::model::GraphModel;
use crate::tables::{self, DocumentIndex, FrequencyTable};
use crate::util::config::{PipelineConfig, SnapshotFiles};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    All,
    English,
    Russian,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::All, Language::English, Language::Russian];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::All => "all",
            Language::English => "english",
            Language::Russian => "russian",
        }
    }
}

impl FromStr for Language {
    type Err = PipelineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "all" => Ok(Language::All),
            "english" => Ok(Language::English),
            "russian" => Ok(Language::Russian),
            other => Err(PipelineError::UnknownLanguage(other.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Retweet graph flavours that come in one snapshot per language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphKind {
    TemporalRetweet,
    GeoRetweet,
}

impl SnapshotFiles {
    pub fn file_for(&self, kind: GraphKind, language: Language) -> &str {
        match (kind, language) {
            (GraphKind::TemporalRetweet, Language::All) => &self.retweet_all,
            (GraphKind::TemporalRetweet, Language::English) => &self.retweet_english,
            (GraphKind::TemporalRetweet, Language::Russian) => &self.retweet_russian,
            (GraphKind::GeoRetweet, Language::All) => &self.geo_all,
            (GraphKind::GeoRetweet, Language::English) => &self.geo_english,
            (GraphKind::GeoRetweet, Language::Russian) => &self.geo_russian,
        }
    }
}

/// Read-only accessor for persisted graph snapshots.
#[derive(Debug, Clone)]
pub struct GraphStore {
    graph_dir: PathBuf,
    data_dir: PathBuf,
    files: SnapshotFiles,
}

impl GraphStore {
    pub fn new(cfg: &PipelineConfig) -> Self {
        Self {
            graph_dir: cfg.graph_dir.clone(),
            data_dir: cfg.data_dir.clone(),
            files: cfg.snapshots.clone(),
        }
    }

    pub fn snapshot_path(&self, kind: GraphKind, language: Language) -> PathBuf {
        self.graph_dir.join(self.files.file_for(kind, language))
    }

    pub fn similarity_path(&self) -> PathBuf {
        self.data_dir.join(&self.files.similarity)
    }

    pub fn load(&self, kind: GraphKind, language: Language) -> Result<GraphModel> {
        read_graph(&self.snapshot_path(kind, language))
    }

    pub fn load_similarity(&self) -> Result<GraphModel> {
        read_graph(&self.similarity_path())
    }
}

fn read_graph(path: &Path) -> Result<GraphModel> {
    let file = File::open(path)
        .with_context(|| format!("failed to open graph snapshot {}", path.display()))?;
    let snap: GraphSnapshot = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse graph snapshot {}", path.display()))?;
    let graph = GraphModel::from_snapshot(snap)
        .with_context(|| format!("inconsistent graph snapshot {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded graph snapshot"
    );
    Ok(graph)
}

/// Tables loaded on first use and then shared by every request served from
/// the same handle.
#[derive(Debug)]
pub struct DataSources {
    cfg: PipelineConfig,
    conflicts: OnceLock<Vec<ConflictEvent>>,
    documents: OnceLock<DocumentIndex>,
    frequencies: OnceLock<FrequencyTable>,
    r_scores: OnceLock<Vec<RScore>>,
    cluster_explain: OnceLock<Vec<TableRow>>,
}

impl DataSources {
    pub fn new(cfg: &PipelineConfig) -> Self {
        Self {
            cfg: cfg.clone(),
            conflicts: OnceLock::new(),
            documents: OnceLock::new(),
            frequencies: OnceLock::new(),
            r_scores: OnceLock::new(),
            cluster_explain: OnceLock::new(),
        }
    }

    pub fn conflicts(&self) -> Result<&[ConflictEvent]> {
        let path = self.cfg.data_path(&self.cfg.conflict_file);
        let skip = self.cfg.conflict_skip_rows;
        cached(&self.conflicts, || tables::load_conflicts(&path, skip)).map(Vec::as_slice)
    }

    pub fn documents(&self) -> Result<&DocumentIndex> {
        let path = self.cfg.data_path(&self.cfg.similarity_metadata);
        cached(&self.documents, || tables::load_documents(&path))
    }

    pub fn frequencies(&self) -> Result<&FrequencyTable> {
        let path = self.cfg.graph_path(&self.cfg.frequencies_file);
        cached(&self.frequencies, || tables::load_frequencies(&path))
    }

    pub fn r_scores(&self) -> Result<&[RScore]> {
        let path = self.cfg.graph_path(&self.cfg.r_scores_file);
        cached(&self.r_scores, || tables::load_r_scores(&path)).map(Vec::as_slice)
    }

    pub fn cluster_explain(&self) -> Result<&[TableRow]> {
        let path = self.cfg.data_path(&self.cfg.cluster_explain_file);
        cached(&self.cluster_explain, || tables::load_cluster_explain(&path)).map(Vec::as_slice)
    }
}

// A failed load leaves the cell empty so the next request retries.
fn cached<T>(cell: &OnceLock<T>, load: impl FnOnce() -> Result<T>) -> Result<&T> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = load()?;
    Ok(cell.get_or_init(|| value))
}
