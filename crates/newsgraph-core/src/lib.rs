use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeAttrs {
    pub cluster: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<f64>,
}

impl NodeAttrs {
    pub fn in_cluster(cluster: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            date: None,
            lat: None,
            long: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDateTime) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_coords(mut self, lat: f64, long: f64) -> Self {
        self.lat = Some(lat);
        self.long = Some(long);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    // similarity graph only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self {
            from,
            to,
            score: None,
        }
    }

    pub fn scored(from: NodeId, to: NodeId, score: f64) -> Self {
        Self {
            from,
            to,
            score: Some(score),
        }
    }
}

/// Persisted graph as written by the upstream analysis jobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub directed: bool,
    pub nodes: Vec<(NodeId, NodeAttrs)>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConflictEvent {
    pub conflict_name: String,
    pub date_start: NaiveDateTime,
    pub date_end: NaiveDateTime,
    pub deaths_civilians: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentMeta {
    #[serde(rename = "Publication (original)")]
    pub publication: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Language")]
    pub language: String,
    #[serde(rename = "Keywords")]
    pub keywords: String,
    pub score: f64,
}

/// One precomputed Pearson r row; columns other than `Cluster` pass through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RScore {
    #[serde(rename = "Cluster")]
    pub cluster: String,
    #[serde(flatten)]
    pub values: serde_json::Map<String, serde_json::Value>,
}

pub type TableRow = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CellTooltip {
    pub value: String,
    #[serde(rename = "type")]
    pub kind: String,
}

// ----- Figure description (consumed by the rendering layer) -----

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AxisValue {
    Date(NaiveDateTime),
    Number(f64),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    Scatter,
    ScatterGeo,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TraceMode {
    Lines,
    Markers,
    MarkersText,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Marker {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub size: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub color: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trace {
    pub name: Option<String>,
    pub kind: TraceKind,
    pub mode: TraceMode,
    pub x: Vec<Option<AxisValue>>,
    pub y: Vec<Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_width: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hover_text: Vec<String>,
    #[serde(default)]
    pub secondary_y: bool,
    pub show_legend: bool,
}

impl Trace {
    pub fn lines(
        kind: TraceKind,
        name: Option<String>,
        x: Vec<Option<AxisValue>>,
        y: Vec<Option<f64>>,
    ) -> Self {
        Self {
            name,
            kind,
            mode: TraceMode::Lines,
            x,
            y,
            marker: None,
            line_width: Vec::new(),
            hover_text: Vec::new(),
            secondary_y: false,
            show_legend: true,
        }
    }

    pub fn markers(kind: TraceKind, name: Option<String>, x: Vec<AxisValue>, y: Vec<f64>) -> Self {
        Self {
            name,
            kind,
            mode: TraceMode::Markers,
            x: x.into_iter().map(Some).collect(),
            y: y.into_iter().map(Some).collect(),
            marker: None,
            line_width: Vec::new(),
            hover_text: Vec::new(),
            secondary_y: false,
            show_legend: true,
        }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn with_hover(mut self, hover_text: Vec<String>) -> Self {
        self.hover_text = hover_text;
        self
    }

    pub fn with_line_width(mut self, widths: Vec<f64>) -> Self {
        self.line_width = widths;
        self
    }

    pub fn on_secondary_axis(mut self) -> Self {
        self.secondary_y = true;
        self
    }

    pub fn hidden_from_legend(mut self) -> Self {
        self.show_legend = false;
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    Date,
    Linear,
    Hidden,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Axis {
    pub kind: AxisKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<(AxisValue, AxisValue)>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ticks: Vec<Tick>,
}

impl Axis {
    pub fn of(kind: AxisKind) -> Self {
        Self {
            kind,
            title: None,
            range: None,
            ticks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Figure {
    pub title: String,
    pub traces: Vec<Trace>,
    pub x_axis: Axis,
    pub y_axis: Axis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y2_axis: Option<Axis>,
    pub show_legend: bool,
}
