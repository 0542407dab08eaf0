use chrono::NaiveDateTime;
use newsgraph_core::{AxisValue, ConflictEvent};
use rand::Rng;

/// Upper bound of the cosmetic vertical jitter, below the first cluster band.
pub const CONFLICT_JITTER: f64 = 1.5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictSeries {
    pub x: Vec<AxisValue>,
    pub y: Vec<f64>,
    pub sizes: Vec<f64>,
    pub hover: Vec<String>,
}

impl ConflictSeries {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

pub fn marker_size(deaths_civilians: u32) -> f64 {
    10.0 + 5.0 * f64::from(deaths_civilians)
}

pub fn hover_text(event: &ConflictEvent) -> String {
    format!(
        "<i>Conflict name:</i> {}<br><i>Deaths:</i> {}<br><i>Date:</i> {}",
        event.conflict_name,
        event.deaths_civilians,
        event.date_start.format("%Y-%m-%d")
    )
}

/// One point per event with `lower < date_start < upper`.
pub fn conflict_series<R: Rng>(
    events: &[ConflictEvent],
    lower: NaiveDateTime,
    upper: NaiveDateTime,
    rng: &mut R,
) -> ConflictSeries {
    let mut out = ConflictSeries::default();
    for event in events
        .iter()
        .filter(|e| lower < e.date_start && e.date_start < upper)
    {
        out.x.push(AxisValue::Date(event.date_start));
        out.y.push(rng.random_range(0.0..CONFLICT_JITTER));
        out.sizes.push(marker_size(event.deaths_civilians));
        out.hover.push(hover_text(event));
    }
    tracing::debug!(
        total = events.len(),
        shown = out.len(),
        "built conflict overlay"
    );
    out
}
