//! Geometry of the radar chart, independent of any raster backend.
use serde::Serialize;
use std::f64::consts::PI;

use crate::pipeline::types::{CategoryCatalog, CategoryKey, SubscoreMap};

/// Tick ring percentages, innermost first.
pub const TICKS: [f64; 4] = [25.0, 50.0, 75.0, 100.0];
pub const TICK_LABELS: [&str; 4] = ["25", "50", "75", "100%"];

/// One spoke of the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarAxis {
    pub key: CategoryKey,
    pub label: String,
    /// Percentage of the category weight, 0..=100.
    pub normalized: f64,
}

/// Percentage of `max_weight` reached by `value`, capped at 100.
pub fn normalize_value(value: Option<f64>, max_weight: f64) -> f64 {
    match value {
        Some(value) if max_weight > 0.0 && value > 0.0 => (value / max_weight * 100.0).min(100.0),
        _ => 0.0,
    }
}

/// Axes in catalog order.
pub fn normalize(subscores: &SubscoreMap, catalog: &CategoryCatalog) -> Vec<RadarAxis> {
    catalog
        .iter()
        .map(|category| RadarAxis {
            key: category.key,
            label: category.display_label.clone(),
            normalized: normalize_value(subscores.get(&category.key).copied(), category.max_weight),
        })
        .collect()
}

/// Unit-circle layout: axis 0 points up, the rest follow clockwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarLayout {
    pub title: String,
    pub axes: Vec<RadarAxis>,
    /// One angle per axis, plus the first repeated.
    pub angles: Vec<f64>,
    /// Polygon vertices in unit coordinates (y grows downward), closed.
    pub vertices: Vec<(f64, f64)>,
    pub ticks: [f64; 4],
}

impl RadarLayout {
    pub fn compute(axes: Vec<RadarAxis>, title: impl Into<String>) -> Self {
        let step = if axes.is_empty() {
            0.0
        } else {
            2.0 * PI / axes.len() as f64
        };

        let mut angles: Vec<f64> = (0..axes.len()).map(|i| i as f64 * step).collect();
        let mut vertices: Vec<(f64, f64)> = axes
            .iter()
            .zip(&angles)
            .map(|(axis, angle)| point_at(*angle, axis.normalized / 100.0))
            .collect();

        if let (Some(angle), Some(vertex)) = (angles.first().copied(), vertices.first().copied()) {
            angles.push(angle);
            vertices.push(vertex);
        }

        Self {
            title: title.into(),
            axes,
            angles,
            vertices,
            ticks: TICKS,
        }
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }
}

/// Point at `radius` along `angle`, measured clockwise from straight up.
pub fn point_at(angle: f64, radius: f64) -> (f64, f64) {
    (radius * angle.sin(), -radius * angle.cos())
}
