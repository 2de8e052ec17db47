use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::ChartError;

/// Key of the timestamp column inside the `hourly` block.
pub const TIME_KEY: &str = "time";

/// A geographic location in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Everything needed to build one forecast request. Immutable per request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestConfig {
    pub latitude: f64,
    pub longitude: f64,
    /// Hourly parameters in request order (e.g. `temperature_2m`, `rain`).
    pub parameters: Vec<String>,
    /// Weather model (`models=` query key), e.g. `bom_access_global`.
    pub model_name: Option<String>,
    pub title: Option<String>,
}

impl RequestConfig {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Same request with a different parameter selection.
    pub fn with_parameters(&self, parameters: Vec<String>) -> Self {
        Self {
            parameters,
            ..self.clone()
        }
    }
}

/// One entry of `hourly.time`. Open-Meteo sends ISO text by default and unix seconds
/// with `timeformat=unixtime`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Timestamp {
    Text(String),
    Unix(i64),
}

impl From<&Value> for Timestamp {
    fn from(v: &Value) -> Self {
        match v {
            Value::String(s) => Timestamp::Text(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(secs) => Timestamp::Unix(secs),
                None => Timestamp::Unix(n.as_f64().unwrap_or(0.0) as i64),
            },
            other => Timestamp::Text(other.to_string()),
        }
    }
}

/// Wire shape of a forecast response. Only the blocks the chart needs are kept.
///
/// Fields are loose `Value`s. A block with an unexpected shape reads as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub utc_offset_seconds: Option<Value>,
    #[serde(default)]
    pub hourly: Option<Value>,
    #[serde(default)]
    pub hourly_units: Option<Value>,
}

/// Time-indexed measurements as returned by the data source.
///
/// `timestamps` is `None` when `hourly.time` is absent or not a sequence; grouping
/// rejects such payloads. `per_parameter` keeps the payload's key order and never holds
/// the time column.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawPayload {
    pub timestamps: Option<Vec<Timestamp>>,
    pub per_parameter: Vec<(String, Vec<Option<f64>>)>,
    pub units_by_parameter: HashMap<String, String>,
    /// Offset applied to unix timestamps when rendering labels.
    pub utc_offset_seconds: i64,
}

impl RawPayload {
    /// Parse a response body. Anything that is not a JSON object is a decode error.
    pub fn from_json_str(body: &str) -> Result<Self, ChartError> {
        let resp: ForecastResponse =
            serde_json::from_str(body).map_err(|source| ChartError::Decode {
                body: body.to_string(),
                source,
            })?;
        Ok(RawPayload::from(resp))
    }

    /// Values for `parameter`, if the payload carried that column.
    pub fn values(&self, parameter: &str) -> Option<&[Option<f64>]> {
        self.per_parameter
            .iter()
            .find(|(name, _)| name == parameter)
            .map(|(_, v)| v.as_slice())
    }

    pub fn unit(&self, parameter: &str) -> Option<&str> {
        self.units_by_parameter.get(parameter).map(String::as_str)
    }

    /// Parameter names in payload order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.per_parameter.iter().map(|(name, _)| name.as_str())
    }
}

impl From<ForecastResponse> for RawPayload {
    fn from(resp: ForecastResponse) -> Self {
        let empty = Map::new();
        let hourly = resp.hourly.as_ref().and_then(Value::as_object).unwrap_or(&empty);

        let timestamps = hourly
            .get(TIME_KEY)
            .and_then(Value::as_array)
            .map(|arr| arr.iter().map(Timestamp::from).collect());

        // Non-array columns are treated as absent.
        let per_parameter = hourly
            .iter()
            .filter(|(k, _)| k.as_str() != TIME_KEY)
            .filter_map(|(k, v)| {
                v.as_array()
                    .map(|arr| (k.clone(), arr.iter().map(Value::as_f64).collect()))
            })
            .collect();

        let units_by_parameter = resp
            .hourly_units
            .as_ref()
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
            .filter_map(|(k, v)| v.as_str().map(|u| (k.clone(), u.to_string())))
            .collect();

        Self {
            timestamps,
            per_parameter,
            units_by_parameter,
            utc_offset_seconds: resp
                .utc_offset_seconds
                .as_ref()
                .and_then(Value::as_i64)
                .unwrap_or(0),
        }
    }
}

/// Which side of the plot an axis is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPosition {
    Left,
    Right,
}

/// A shared scale for every series with the same unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    /// `y0`, `y1`, … in order of first appearance.
    pub id: String,
    pub unit: String,
    pub position: AxisPosition,
    pub is_first: bool,
}

/// One named, unit-tagged, time-aligned sequence to plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub unit: String,
    /// Aligned 1:1 with the labels; `None` where the source had no value.
    pub values: Vec<Option<f64>>,
    /// `#rrggbb` from the fixed palette.
    pub color: String,
    pub axis_id: String,
}

/// Presentation state of one chart widget.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartState {
    Loading,
    /// No parameter selected; nothing was fetched.
    Empty,
    /// The cycle failed; `message` is end-user text, details go to the log.
    Error { message: String },
    Ready {
        labels: Vec<String>,
        series: Vec<Series>,
        axes: Vec<Axis>,
    },
}

impl ChartState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ChartState::Ready { .. })
    }

    /// Placeholder text shown instead of a chart, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            ChartState::Loading => Some("Loading weather data..."),
            ChartState::Empty => Some("Select at least one variable to display."),
            ChartState::Error { message } => Some(message.as_str()),
            ChartState::Ready { .. } => None,
        }
    }
}
