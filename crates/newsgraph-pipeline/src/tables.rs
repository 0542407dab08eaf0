//! Loaders for the precomputed tables that sit next to the graph snapshots.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use newsgraph_core::{ConflictEvent, DocumentMeta, RScore, TableRow};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::PipelineError;

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Accepts `YYYY-MM-DD`, optionally followed by a time (space or `T` separated).
pub fn parse_datetime(raw: &str) -> crate::error::Result<NaiveDateTime> {
    let s = raw.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| PipelineError::InvalidDate(raw.to_string()))
}

#[derive(Debug, Deserialize)]
struct ConflictRow {
    conflict_name: String,
    date_start: String,
    date_end: String,
    deaths_civilians: u32,
}

impl ConflictRow {
    fn into_event(self) -> crate::error::Result<ConflictEvent> {
        Ok(ConflictEvent {
            conflict_name: self.conflict_name,
            date_start: parse_datetime(&self.date_start)?,
            date_end: parse_datetime(&self.date_end)?,
            deaths_civilians: self.deaths_civilians,
        })
    }
}

/// Reads the conflict-events CSV. Columns are matched by header name; extra
/// columns are ignored. The first `skip_rows` data rows are dropped unparsed.
pub fn load_conflicts(path: &Path, skip_rows: usize) -> Result<Vec<ConflictEvent>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open conflict table {}", path.display()))?;
    let mut events = Vec::new();
    for (line, row) in reader.deserialize::<ConflictRow>().enumerate().skip(skip_rows) {
        let row = row.with_context(|| format!("bad conflict row {} in {}", line + 1, path.display()))?;
        events.push(row.into_event()?);
    }
    tracing::info!(path = %path.display(), rows = events.len(), "loaded conflict table");
    Ok(events)
}

/// Similarity metadata keyed by publication identifier.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    by_id: HashMap<String, DocumentMeta>,
}

impl DocumentIndex {
    /// First row wins when an identifier repeats.
    pub fn from_rows(rows: impl IntoIterator<Item = DocumentMeta>) -> Self {
        let mut by_id = HashMap::new();
        for row in rows {
            by_id.entry(row.publication.clone()).or_insert(row);
        }
        Self { by_id }
    }

    pub fn lookup(&self, id: &str) -> crate::error::Result<&DocumentMeta> {
        self.by_id
            .get(id)
            .ok_or_else(|| PipelineError::UnknownDocument(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

pub fn load_documents(path: &Path) -> Result<DocumentIndex> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open document table {}", path.display()))?;
    let rows = reader
        .deserialize::<DocumentMeta>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("failed to parse document table {}", path.display()))?;
    let index = DocumentIndex::from_rows(rows);
    tracing::info!(path = %path.display(), documents = index.len(), "loaded document metadata");
    Ok(index)
}

/// Daily tweet counts per cluster plus `sum` and `conflicts` columns.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    pub dates: Vec<NaiveDateTime>,
    columns: HashMap<String, Vec<f64>>,
}

impl FrequencyTable {
    pub fn from_records(headers: &StringRecord, records: &[StringRecord]) -> Result<Self> {
        let date_idx = headers
            .iter()
            .position(|h| h == "date")
            .context("frequency table has no date column")?;

        let mut table = FrequencyTable::default();
        for (i, name) in headers.iter().enumerate() {
            if i == date_idx {
                continue;
            }
            let column = Vec::with_capacity(records.len());
            if name == "date" || table.columns.insert(name.to_string(), column).is_some() {
                anyhow::bail!("frequency table repeats column {name}");
            }
        }

        for record in records {
            let raw_date = record.get(date_idx).unwrap_or_default();
            table.dates.push(parse_datetime(raw_date)?);
            for (i, name) in headers.iter().enumerate() {
                if i == date_idx {
                    continue;
                }
                let cell = record.get(i).unwrap_or_default().trim();
                let value = if cell.is_empty() {
                    f64::NAN
                } else {
                    cell.parse::<f64>()
                        .with_context(|| format!("column {name}: not a number: {cell}"))?
                };
                if let Some(col) = table.columns.get_mut(name) {
                    col.push(value);
                }
            }
        }
        Ok(table)
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

pub fn load_frequencies(path: &Path) -> Result<FrequencyTable> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open frequency table {}", path.display()))?;
    let headers = reader.headers()?.clone();
    let records = reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("failed to read frequency table {}", path.display()))?;
    FrequencyTable::from_records(&headers, &records)
        .with_context(|| format!("failed to parse frequency table {}", path.display()))
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let file = File::open(path).with_context(|| format!("failed to open {what} {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {what} {}", path.display()))
}

pub fn load_r_scores(path: &Path) -> Result<Vec<RScore>> {
    load_json(path, "pearson r table")
}

pub fn load_cluster_explain(path: &Path) -> Result<Vec<TableRow>> {
    load_json(path, "cluster explanation table")
}
