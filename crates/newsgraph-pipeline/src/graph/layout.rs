use newsgraph_core::{AxisValue, NodeId};
use rand::Rng;
use std::collections::HashMap;

use crate::error::{PipelineError, Result};
use crate::graph::bands::ClusterBounds;
use crate::graph::model::GraphModel;

const MIN_DISTANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub x: AxisValue,
    pub y: f64,
}

/// Plotting coordinate per surviving node.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    positions: HashMap<NodeId, Position>,
}

impl Layout {
    pub fn get(&self, id: &NodeId) -> Option<&Position> {
        self.positions.get(id)
    }

    pub fn require(&self, id: &NodeId) -> Result<&Position> {
        self.positions
            .get(id)
            .ok_or_else(|| PipelineError::MissingAttribute {
                node: id.0.clone(),
                attribute: "position",
            })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// x = node date, y = uniform draw inside the node's cluster band.
pub fn temporal_layout<R: Rng>(
    graph: &GraphModel,
    bounds: &ClusterBounds,
    rng: &mut R,
) -> Result<Layout> {
    let mut positions = HashMap::with_capacity(graph.node_count());
    for (id, attrs) in &graph.nodes {
        let date = attrs.date.ok_or_else(|| PipelineError::MissingAttribute {
            node: id.0.clone(),
            attribute: "date",
        })?;
        let band = bounds
            .get(&attrs.cluster)
            .ok_or_else(|| PipelineError::MissingAttribute {
                node: id.0.clone(),
                attribute: "cluster band",
            })?;
        let y = rng.random_range(band.low..band.high);
        positions.insert(
            id.clone(),
            Position {
                x: AxisValue::Date(date),
                y,
            },
        );
    }
    Ok(Layout { positions })
}

/// x = longitude, y = latitude. Nodes without coordinates are a data error.
pub fn geo_layout(graph: &GraphModel) -> Result<Layout> {
    let mut positions = HashMap::with_capacity(graph.node_count());
    for (id, attrs) in &graph.nodes {
        let (Some(lat), Some(long)) = (attrs.lat, attrs.long) else {
            return Err(PipelineError::MissingAttribute {
                node: id.0.clone(),
                attribute: "lat/long",
            });
        };
        positions.insert(
            id.clone(),
            Position {
                x: AxisValue::Number(long),
                y: lat,
            },
        );
    }
    Ok(Layout { positions })
}

/// Fruchterman-Reingold tuning. Nodes start uniformly inside a square of
/// half-width `radius`; `temperature` is the first step cap as a fraction of
/// the square's side and cools linearly to zero over `iterations`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceParams {
    pub iterations: usize,
    pub radius: f64,
    pub temperature: f64,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            iterations: 300,
            radius: 1.0,
            temperature: 0.1,
        }
    }
}

/// Spring embedding of the graph topology (edge direction ignored), rescaled
/// so the largest coordinate magnitude is 1.
pub fn spring_layout<R: Rng>(
    graph: &GraphModel,
    params: &ForceParams,
    rng: &mut R,
) -> Layout {
    let ids: Vec<&NodeId> = graph.nodes.keys().collect();
    if ids.is_empty() {
        return Layout::default();
    }
    let index: HashMap<&NodeId, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let links: Vec<(usize, usize)> = graph
        .edges
        .iter()
        .filter_map(|e| Some((*index.get(&e.from)?, *index.get(&e.to)?)))
        .filter(|(a, b)| a != b)
        .collect();

    let radius = if params.radius > 0.0 { params.radius } else { 1.0 };
    let mut pos: Vec<[f64; 2]> = (0..ids.len())
        .map(|_| {
            [
                rng.random_range(-radius..radius),
                rng.random_range(-radius..radius),
            ]
        })
        .collect();

    let side = 2.0 * radius;
    let k = (side * side / ids.len() as f64).sqrt();
    let mut temperature = params.temperature.max(0.0) * side;
    let cooling = temperature / (params.iterations as f64 + 1.0);
    for _ in 0..params.iterations {
        force_step(&mut pos, &links, k, temperature);
        temperature -= cooling;
    }

    normalize(&mut pos);

    let positions = ids
        .into_iter()
        .zip(pos)
        .map(|(id, [x, y])| {
            (
                id.clone(),
                Position {
                    x: AxisValue::Number(x),
                    y,
                },
            )
        })
        .collect();
    Layout { positions }
}

/// One round: k²/d repulsion between every pair, d²/k attraction along
/// links, each displacement capped at `temperature`.
fn force_step(pos: &mut [[f64; 2]], links: &[(usize, usize)], k: f64, temperature: f64) {
    let n = pos.len();
    if n <= 1 {
        return;
    }

    let mut disp = vec![[0.0f64; 2]; n];

    for i in 0..n {
        for j in (i + 1)..n {
            let delta = sub(pos[i], pos[j]);
            let dist = length_sq(delta).sqrt().max(MIN_DISTANCE);
            let f = scale(delta, k * k / (dist * dist));
            disp[i] = add(disp[i], f);
            disp[j] = sub(disp[j], f);
        }
    }

    for &(a, b) in links {
        let delta = sub(pos[a], pos[b]);
        let dist = length_sq(delta).sqrt().max(MIN_DISTANCE);
        let f = scale(delta, dist / k);
        disp[a] = sub(disp[a], f);
        disp[b] = add(disp[b], f);
    }

    for i in 0..n {
        let len = length_sq(disp[i]).sqrt();
        if len > temperature {
            disp[i] = scale(normalize_or_zero(disp[i]), temperature);
        }
        pos[i] = add(pos[i], disp[i]);
    }
}

fn normalize(pos: &mut [[f64; 2]]) {
    if pos.is_empty() {
        return;
    }
    let n = pos.len() as f64;
    let center = pos
        .iter()
        .fold([0.0, 0.0], |acc, p| add(acc, *p))
        .map(|c| c / n);
    let mut extent = 0.0f64;
    for p in pos.iter_mut() {
        *p = sub(*p, center);
        extent = extent.max(p[0].abs()).max(p[1].abs());
    }
    if extent > 0.0 {
        for p in pos.iter_mut() {
            *p = scale(*p, 1.0 / extent);
        }
    }
}

fn add(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] + b[0], a[1] + b[1]]
}

fn sub(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

fn scale(a: [f64; 2], s: f64) -> [f64; 2] {
    [a[0] * s, a[1] * s]
}

fn length_sq(a: [f64; 2]) -> f64 {
    a[0] * a[0] + a[1] * a[1]
}

fn normalize_or_zero(a: [f64; 2]) -> [f64; 2] {
    let len = length_sq(a).sqrt();
    if len > 0.0 && len.is_finite() {
        scale(a, 1.0 / len)
    } else {
        [0.0, 0.0]
    }
}
