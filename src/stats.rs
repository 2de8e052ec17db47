use crate::models::Series;
use serde::{Deserialize, Serialize};

/// Summary statistics for one series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub parameter: String,
    pub unit: String,
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Summarize one series, ignoring gaps.
pub fn summarize(series: &Series) -> Summary {
    let mut vals: Vec<f64> = series.values.iter().flatten().copied().collect();
    vals.sort_by(f64::total_cmp);
    let count = vals.len();
    let min = vals.first().cloned();
    let max = vals.last().cloned();
    let mean = if count > 0 {
        Some(vals.iter().copied().sum::<f64>() / count as f64)
    } else {
        None
    };
    let median = if count == 0 {
        None
    } else if count % 2 == 1 {
        Some(vals[count / 2])
    } else {
        Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
    };
    Summary {
        parameter: series.name.clone(),
        unit: series.unit.clone(),
        count,
        missing: series.values.len() - count,
        min,
        max,
        mean,
        median,
    }
}

/// Summaries in series order.
pub fn series_summary(series: &[Series]) -> Vec<Summary> {
    series.iter().map(summarize).collect()
}
