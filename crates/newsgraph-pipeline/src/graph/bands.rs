use newsgraph_core::Tick;

use crate::util::labels::truncate_label;

/// First band index; 0..2 on the y axis is left to the conflict overlay.
pub const BAND_START: usize = 2;
pub const BAND_WIDTH: f64 = 0.8;
pub const CONFLICT_TICK: f64 = 0.75;
const TICK_LABEL_CHARS: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterBand {
    pub label: String,
    pub low: f64,
    pub high: f64,
}

impl ClusterBand {
    pub fn mid(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    pub fn contains(&self, y: f64) -> bool {
        y >= self.low && y < self.high
    }
}

/// Vertical band per selected cluster, in selection order. Band positions
/// depend on enumeration order, so bounds are rebuilt for every selection.
#[derive(Debug, Clone, Default)]
pub struct ClusterBounds {
    bands: Vec<ClusterBand>,
}

impl ClusterBounds {
    pub fn from_clusters(clusters: &[String]) -> Self {
        let bands = clusters
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let low = (i + BAND_START) as f64;
                ClusterBand {
                    label: c.clone(),
                    low,
                    high: low + BAND_WIDTH,
                }
            })
            .collect();
        Self { bands }
    }

    pub fn get(&self, cluster: &str) -> Option<&ClusterBand> {
        self.bands.iter().find(|b| b.label == cluster)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClusterBand> {
        self.bands.iter()
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Y-axis ticks: the conflict row, then one tick per band whose cluster
    /// is in `surviving`. Pruned clusters keep their slot but lose the label.
    pub fn ticks(&self, surviving: &[String]) -> Vec<Tick> {
        let mut ticks = vec![Tick {
            value: CONFLICT_TICK,
            label: "Conflict".to_string(),
        }];
        ticks.extend(
            self.bands
                .iter()
                .filter(|b| surviving.contains(&b.label))
                .map(|b| Tick {
                    value: b.mid(),
                    label: truncate_label(&b.label, TICK_LABEL_CHARS),
                }),
        );
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clusters(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("cluster-{i}")).collect()
    }

    #[test]
    fn bands_are_contiguous_and_disjoint() {
        for n in [1usize, 2, 5, 12] {
            let bounds = ClusterBounds::from_clusters(&clusters(n));
            let bands: Vec<_> = bounds.iter().collect();
            assert_eq!(bands.len(), n);
            assert_eq!(bands[0].low, BAND_START as f64);
            for b in &bands {
                assert!((b.high - b.low - BAND_WIDTH).abs() < 1e-12);
            }
            for pair in bands.windows(2) {
                let gap = pair[1].low - pair[0].high;
                assert!((gap - 0.2).abs() < 1e-9, "gap was {gap}");
            }
        }
    }

    #[test]
    fn band_index_follows_selection_order() {
        let a = ClusterBounds::from_clusters(&["x".to_string(), "y".to_string()]);
        let b = ClusterBounds::from_clusters(&["y".to_string(), "x".to_string()]);
        assert_eq!(a.get("x").map(|b| b.low), Some(2.0));
        assert_eq!(b.get("x").map(|b| b.low), Some(3.0));
        assert!(a.get("z").is_none());
    }

    #[test]
    fn ticks_skip_pruned_clusters_and_truncate_labels() {
        let long = "a".repeat(40);
        let bounds =
            ClusterBounds::from_clusters(&["gone".to_string(), long.clone(), "kept".to_string()]);
        let ticks = bounds.ticks(&[long.clone(), "kept".to_string()]);

        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks[0].label, "Conflict");
        assert_eq!(ticks[0].value, CONFLICT_TICK);
        assert_eq!(ticks[1].label.chars().count(), 30);
        assert!((ticks[1].value - 3.4).abs() < 1e-9);
        assert_eq!(ticks[2].label, "kept");
    }
}
