//! Series/axis grouping: turn a fetched payload into plot-ready labels, series and axes.
//!
//! Series that share a physical unit share one y-axis. The first axis goes on the left,
//! every later one on the right; ids are `y0, y1, …` in order of first appearance.
//! Colors come from a fixed 8-entry palette by the series' requested position.

use ahash::AHashMap;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ChartError;
use crate::models::{Axis, AxisPosition, RawPayload, Series, Timestamp};

/// Series colors, cycled by requested position.
pub const PALETTE: [&str; 8] = [
    "#037691", "#c95109", "#991ad6", "#da1710", "#2a9d8f", "#e9c46a", "#264653", "#f4a261",
];

#[inline]
pub fn series_color(idx: usize) -> &'static str {
    PALETTE[idx % PALETTE.len()]
}

/// How timestamps are rendered into x-axis labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabelStyle {
    /// `Jan 5, 3 PM`
    #[default]
    English,
    /// `05.01. 15:00`
    European,
}

impl LabelStyle {
    /// Pick a style from a locale tag (`en`, `de`, `fr`, …). Defaults to English.
    pub fn for_locale(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "de" | "de_de" | "german" | "fr" | "fr_fr" | "es" | "es_es" | "it" | "it_it"
            | "pt" | "pt_pt" | "pt_br" | "nl" | "nl_nl" => LabelStyle::European,
            _ => LabelStyle::English,
        }
    }

    fn pattern(self) -> &'static str {
        match self {
            LabelStyle::English => "%b %-d, %-I %p",
            LabelStyle::European => "%d.%m. %H:%M",
        }
    }
}

/// Result of one grouping pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grouped {
    pub labels: Vec<String>,
    pub series: Vec<Series>,
    pub axes: Vec<Axis>,
}

impl Grouped {
    pub fn axis(&self, id: &str) -> Option<&Axis> {
        self.axes.iter().find(|a| a.id == id)
    }
}

fn parse_local(text: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|d| d.naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Render one timestamp. Text that does not parse is kept verbatim so the label count
/// always matches the timestamp count.
pub fn format_label(ts: &Timestamp, utc_offset_seconds: i64, style: LabelStyle) -> String {
    let parsed = match ts {
        Timestamp::Text(s) => parse_local(s.trim()),
        Timestamp::Unix(secs) => {
            DateTime::from_timestamp(secs.saturating_add(utc_offset_seconds), 0)
                .map(|d| d.naive_utc())
        }
    };
    match (parsed, ts) {
        (Some(dt), _) => dt.format(style.pattern()).to_string(),
        (None, Timestamp::Text(s)) => s.clone(),
        (None, Timestamp::Unix(secs)) => secs.to_string(),
    }
}

/// Convert the payload's time column into display labels, order preserved.
pub fn to_labels(timestamps: &[Timestamp], utc_offset_seconds: i64, style: LabelStyle) -> Vec<String> {
    timestamps
        .iter()
        .map(|t| format_label(t, utc_offset_seconds, style))
        .collect()
}

/// Group with English labels. See [`group_with_style`].
pub fn group(payload: &RawPayload, requested: &[String]) -> Result<Grouped, ChartError> {
    group_with_style(payload, requested, LabelStyle::default())
}

/// Map `payload` into labels, series and unit-keyed axes.
///
/// - A non-empty `requested` list is used as-is, in order; otherwise every payload
///   parameter in payload order.
/// - A parameter missing from the payload becomes an all-`None` series.
/// - Value sequences are truncated or padded with `None` to the label count.
pub fn group_with_style(
    payload: &RawPayload,
    requested: &[String],
    style: LabelStyle,
) -> Result<Grouped, ChartError> {
    let timestamps = payload
        .timestamps
        .as_ref()
        .ok_or(ChartError::MissingTimeData)?;
    let labels = to_labels(timestamps, payload.utc_offset_seconds, style);
    let len = labels.len();

    let parameters: Vec<String> = if requested.is_empty() {
        payload.parameter_names().map(str::to_string).collect()
    } else {
        requested.to_vec()
    };

    let mut axes: Vec<Axis> = Vec::new();
    let mut axis_by_unit: AHashMap<String, usize> = AHashMap::new();
    let mut series = Vec::with_capacity(parameters.len());

    for (idx, name) in parameters.into_iter().enumerate() {
        let unit = payload.unit(&name).unwrap_or("").to_string();

        let axis_idx = match axis_by_unit.get(&unit) {
            Some(i) => *i,
            None => {
                let i = axes.len();
                axes.push(Axis {
                    id: format!("y{i}"),
                    unit: unit.clone(),
                    position: if i == 0 {
                        AxisPosition::Left
                    } else {
                        AxisPosition::Right
                    },
                    is_first: i == 0,
                });
                axis_by_unit.insert(unit.clone(), i);
                i
            }
        };

        let mut values: Vec<Option<f64>> = payload
            .values(&name)
            .map(|v| v.iter().take(len).copied().collect())
            .unwrap_or_default();
        values.resize(len, None);

        series.push(Series {
            name,
            unit,
            values,
            color: series_color(idx).to_string(),
            axis_id: axes[axis_idx].id.clone(),
        });
    }

    Ok(Grouped {
        labels,
        series,
        axes,
    })
}
