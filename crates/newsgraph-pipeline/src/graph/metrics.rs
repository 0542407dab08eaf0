use crate::graph::model::GraphModel;

const NODE_SCALE: f64 = 10.0;
const EDGE_BASE_WIDTH: f64 = 2.0;
const EDGE_EXPONENT: i32 = 3;

/// Marker size for a document that `in_degree` others point at as their
/// closest match. Square root keeps hubs from dominating.
pub fn node_size(in_degree: usize) -> f64 {
    ((in_degree + 1) as f64).sqrt() * NODE_SCALE
}

/// Line width for a similarity edge; cubing fades weak correlations out.
pub fn edge_width(correlation: f64) -> f64 {
    EDGE_BASE_WIDTH * correlation.abs().powi(EDGE_EXPONENT)
}

/// Edge widths in edge iteration order; unscored edges count as 0.
pub fn edge_widths(graph: &GraphModel) -> Vec<f64> {
    graph
        .edges
        .iter()
        .map(|e| edge_width(e.score.unwrap_or(0.0)))
        .collect()
}
