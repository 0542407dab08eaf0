//! Views over the precomputed correlation tables: tweet/conflict frequency
//! lines, Pearson r rows and the cluster explanation table.

use newsgraph_core::{
    Axis, AxisKind, AxisValue, CellTooltip, Figure, RScore, TableRow, Trace, TraceKind,
};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::tables::FrequencyTable;
use crate::util::config::DateWindow;

const SUM_COLUMN: &str = "sum";
const CONFLICT_COLUMN: &str = "conflicts";

fn frequency_line(table: &FrequencyTable, name: String, column: &[f64]) -> Trace {
    let x = table
        .dates
        .iter()
        .map(|d| Some(AxisValue::Date(*d)))
        .collect();
    let y = column
        .iter()
        .map(|v| if v.is_nan() { None } else { Some(*v) })
        .collect();
    Trace::lines(TraceKind::Scatter, Some(name), x, y)
}

/// One line per selected cluster present in the table, the daily total, and
/// the conflict count on the secondary axis. Selected clusters without a
/// column are skipped.
pub fn frequency_figure(
    table: &FrequencyTable,
    clusters: &[String],
    range: &DateWindow,
) -> Figure {
    let mut traces = Vec::new();
    for c in clusters {
        match table.column(c) {
            Some(col) => traces.push(frequency_line(table, format!("Tweets {c}"), col)),
            None => tracing::debug!(cluster = %c, "no frequency column for cluster"),
        }
    }
    if let Some(col) = table.column(SUM_COLUMN) {
        traces.push(frequency_line(table, "Tweets sum".to_string(), col));
    }
    if let Some(col) = table.column(CONFLICT_COLUMN) {
        traces.push(frequency_line(table, "Conflicts Ukraine".to_string(), col).on_secondary_axis());
    }

    let mut x_axis = Axis::of(AxisKind::Date);
    x_axis.range = Some((
        AxisValue::Date(range.start_at_midnight()),
        AxisValue::Date(range.end_at_midnight()),
    ));
    let mut y_axis = Axis::of(AxisKind::Linear);
    y_axis.title = Some("Tweets".to_string());
    let mut y2_axis = Axis::of(AxisKind::Linear);
    y2_axis.title = Some("Conflicts".to_string());

    Figure {
        title: "Frequency conflicts vs tweets".to_string(),
        traces,
        x_axis,
        y_axis,
        y2_axis: Some(y2_axis),
        show_legend: true,
    }
}

/// Rows for the selected clusters plus the aggregate `sum` row. No selection
/// means nothing to show.
pub fn select_r_scores(scores: &[RScore], clusters: Option<&[String]>) -> Option<Vec<RScore>> {
    let clusters = clusters.filter(|c| !c.is_empty())?;
    Some(
        scores
            .iter()
            .filter(|row| row.cluster == SUM_COLUMN || clusters.contains(&row.cluster))
            .cloned()
            .collect(),
    )
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExplainTable {
    pub rows: Vec<TableRow>,
    pub tooltips: Vec<BTreeMap<String, CellTooltip>>,
}

/// Pairs every cell with a markdown tooltip holding its full text.
pub fn explain_table(rows: &[TableRow]) -> ExplainTable {
    let tooltips = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|(column, value)| {
                    let text = match value {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (
                        column.clone(),
                        CellTooltip {
                            value: text,
                            kind: "markdown".to_string(),
                        },
                    )
                })
                .collect()
        })
        .collect();
    ExplainTable {
        rows: rows.to_vec(),
        tooltips,
    }
}
