//! Declarative chart description built from grouped series, independent of any backend.

use serde::{Deserialize, Serialize};

use crate::models::AxisPosition;

/// Line smoothing applied to every dataset (0 = straight segments).
pub const DEFAULT_TENSION: f64 = 0.2;

/// Alpha suffix appended to a series color for its background (`#rrggbb40`).
pub const BACKGROUND_ALPHA_SUFFIX: &str = "40";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
}

/// Legend placement options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    /// Horizontal band above the plot.
    Top,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendConfig {
    pub display: bool,
    pub position: LegendPosition,
}

/// One y-scale. `draw_grid` is only set on the first (leftmost) scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleConfig {
    pub id: String,
    pub position: AxisPosition,
    pub draw_grid: bool,
    /// The unit, when it is non-empty.
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub label: String,
    pub data: Vec<Option<f64>>,
    pub y_axis_id: String,
    pub border_color: String,
    pub background_color: String,
    pub tension: f64,
    pub point_radius: u32,
    pub fill: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub stacked: bool,
    pub labels: Vec<String>,
    pub datasets: Vec<DatasetConfig>,
    pub scales: Vec<ScaleConfig>,
    /// Shown only when present; never an empty string.
    pub title: Option<String>,
    pub legend: LegendConfig,
}

impl ChartConfig {
    pub fn scale(&self, id: &str) -> Option<&ScaleConfig> {
        self.scales.iter().find(|s| s.id == id)
    }
}
