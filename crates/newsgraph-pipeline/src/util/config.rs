use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::graph::layout::ForceParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    fn new(start: (i32, u32, u32), end: (i32, u32, u32)) -> Self {
        Self {
            start: ymd(start),
            end: ymd(end),
        }
    }

    pub fn start_at_midnight(&self) -> NaiveDateTime {
        self.start.and_time(chrono::NaiveTime::MIN)
    }

    pub fn end_at_midnight(&self) -> NaiveDateTime {
        self.end.and_time(chrono::NaiveTime::MIN)
    }
}

fn ymd((y, m, d): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotFiles {
    pub retweet_all: String,
    pub retweet_english: String,
    pub retweet_russian: String,
    pub geo_all: String,
    pub geo_english: String,
    pub geo_russian: String,
    pub similarity: String,
}

impl Default for SnapshotFiles {
    fn default() -> Self {
        Self {
            retweet_all: "retweet_network.json".to_string(),
            retweet_english: "retweet_network_english.json".to_string(),
            retweet_russian: "retweet_network_russian.json".to_string(),
            geo_all: "retweet_geonetwork.json".to_string(),
            geo_english: "retweet_geonetwork_english.json".to_string(),
            geo_russian: "retweet_geonetwork_russian.json".to_string(),
            similarity: "similarity_network.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub iterations: usize,
    pub radius: f64,
    pub temperature: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let p = ForceParams::default();
        Self {
            iterations: p.iterations,
            radius: p.radius,
            temperature: p.temperature,
        }
    }
}

impl LayoutConfig {
    pub fn force_params(&self) -> ForceParams {
        ForceParams {
            iterations: self.iterations,
            radius: self.radius,
            temperature: self.temperature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Conflict table, similarity network and document tables.
    pub data_dir: PathBuf,
    /// Retweet snapshots and precomputed analysis tables.
    pub graph_dir: PathBuf,
    pub similarity_metadata: String,
    pub conflict_file: String,
    /// Leading data rows dropped from the conflict table.
    pub conflict_skip_rows: usize,
    pub frequencies_file: String,
    pub r_scores_file: String,
    pub cluster_explain_file: String,
    // tables last so the TOML output stays valid
    pub snapshots: SnapshotFiles,
    pub conflict_window: DateWindow,
    pub temporal_range: DateWindow,
    pub analysis_range: DateWindow,
    pub layout: LayoutConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            graph_dir: PathBuf::from("new_graphs"),
            similarity_metadata: "similarity_df.csv".to_string(),
            conflict_file: "conflict_data_ukr.csv".to_string(),
            conflict_skip_rows: 1,
            frequencies_file: "tweet-conflict_frequencies.csv".to_string(),
            r_scores_file: "pearson_r.json".to_string(),
            cluster_explain_file: "cluster_explain.json".to_string(),
            snapshots: SnapshotFiles::default(),
            conflict_window: DateWindow::new((2016, 1, 1), (2017, 6, 1)),
            temporal_range: DateWindow::new((2016, 1, 1), (2017, 6, 6)),
            analysis_range: DateWindow::new((2016, 1, 1), (2016, 12, 31)),
            layout: LayoutConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn data_path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    pub fn graph_path(&self, file: &str) -> PathBuf {
        self.graph_dir.join(file)
    }

    /// Resolves relative data and graph directories against `root`.
    pub fn with_root(mut self, root: &Path) -> Self {
        if self.data_dir.is_relative() {
            self.data_dir = root.join(&self.data_dir);
        }
        if self.graph_dir.is_relative() {
            self.graph_dir = root.join(&self.graph_dir);
        }
        self
    }
}

fn config_file_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "newsgraph")?;
    Some(proj.config_dir().join("pipeline.toml"))
}

pub fn load_or_default() -> PipelineConfig {
    let Some(path) = config_file_path() else {
        return PipelineConfig::default();
    };
    load_or_default_from_path(&path)
}

pub fn load_or_default_from_path(path: &Path) -> PipelineConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return PipelineConfig::default();
    };
    toml::from_str(&contents).unwrap_or_else(|err| {
        tracing::warn!(path = %path.display(), %err, "ignoring unreadable pipeline config");
        PipelineConfig::default()
    })
}

/// Strict variant for explicitly requested files.
pub fn load_from_path(path: &Path) -> anyhow::Result<PipelineConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read pipeline config {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse pipeline config {}", path.display()))
}

pub fn save(cfg: &PipelineConfig) -> anyhow::Result<()> {
    let Some(path) = config_file_path() else {
        return Err(anyhow::anyhow!("no config directory available"));
    };
    save_to_path(cfg, &path)
}

pub fn save_to_path(cfg: &PipelineConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("failed to serialize pipeline config")?;
    fs::write(path, data)
        .with_context(|| format!("failed to write pipeline config {}", path.display()))?;
    Ok(())
}
