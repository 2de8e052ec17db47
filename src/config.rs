//! Inbound widget configuration.
//!
//! A widget is configured from key/value attributes (`latitude`, `longitude`, `hourly`,
//! `models`, `title`, `location`). When latitude or longitude is missing or zero, a JSON
//! object in the widget's content text overrides the attributes key by key.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::api::{LocationPolicy, RequestBuilder};
use crate::error::ChartError;
use crate::models::RequestConfig;

/// Whether the request uses the pinned point or the configured coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationMode {
    #[default]
    Pinned,
    Configured,
}

impl LocationMode {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pinned" => Some(LocationMode::Pinned),
            "configured" | "config" => Some(LocationMode::Configured),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Requested hourly parameters; empty means "whatever the payload carries".
    pub hourly: Vec<String>,
    pub models: Option<String>,
    pub title: Option<String>,
    pub location: LocationMode,
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}

fn number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl WidgetConfig {
    /// Read the attribute map. Empty or unparseable values are ignored.
    pub fn from_attributes(attrs: &HashMap<String, String>) -> Self {
        let get = |k: &str| attrs.get(k).map(String::as_str).and_then(non_empty);
        Self {
            latitude: get("latitude").and_then(|s| s.parse().ok()),
            longitude: get("longitude").and_then(|s| s.parse().ok()),
            hourly: get("hourly").map(|s| split_list(&s)).unwrap_or_default(),
            models: get("models"),
            title: get("title"),
            location: get("location")
                .and_then(|s| LocationMode::parse(&s))
                .unwrap_or_default(),
        }
    }

    /// Parse a standalone JSON config (e.g. a CLI `--config` file).
    pub fn from_json_str(text: &str) -> Result<Self, ChartError> {
        let obj: Map<String, Value> =
            serde_json::from_str(text).map_err(|source| ChartError::Decode {
                body: text.to_string(),
                source,
            })?;
        let mut cfg = Self::default();
        cfg.apply(&obj);
        Ok(cfg)
    }

    /// True when latitude or longitude is missing or zero.
    pub fn needs_coordinates(&self) -> bool {
        !matches!(self.latitude, Some(v) if v != 0.0) || !matches!(self.longitude, Some(v) if v != 0.0)
    }

    /// Apply a JSON object from content text when coordinates are incomplete.
    ///
    /// Text that does not start with `{` is ignored; malformed JSON is logged and ignored.
    pub fn with_content_override(mut self, content: &str) -> Self {
        if !self.needs_coordinates() {
            return self;
        }
        let txt = content.trim();
        if !txt.starts_with('{') {
            return self;
        }
        match serde_json::from_str::<Map<String, Value>>(txt) {
            Ok(obj) => self.apply(&obj),
            Err(e) => warn!("failed to parse JSON from widget content: {e}"),
        }
        self
    }

    fn apply(&mut self, obj: &Map<String, Value>) {
        if let Some(v) = obj.get("latitude") {
            self.latitude = number(v);
        }
        if let Some(v) = obj.get("longitude") {
            self.longitude = number(v);
        }
        if let Some(v) = obj.get("hourly") {
            self.hourly = match v {
                Value::String(s) => split_list(s),
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(non_empty)
                    .collect(),
                _ => Vec::new(),
            };
        }
        if let Some(v) = obj.get("models") {
            self.models = v.as_str().and_then(non_empty);
        }
        if let Some(v) = obj.get("title") {
            self.title = v.as_str().and_then(non_empty);
        }
        if let Some(mode) = obj
            .get("location")
            .and_then(Value::as_str)
            .and_then(LocationMode::parse)
        {
            self.location = mode;
        }
    }

    pub fn to_request_config(&self) -> RequestConfig {
        RequestConfig {
            latitude: self.latitude.unwrap_or(0.0),
            longitude: self.longitude.unwrap_or(0.0),
            parameters: self.hourly.clone(),
            model_name: self.models.clone(),
            title: self.title.clone(),
        }
    }

    pub fn location_policy(&self) -> LocationPolicy {
        match self.location {
            LocationMode::Pinned => LocationPolicy::default(),
            LocationMode::Configured => LocationPolicy::FromConfig,
        }
    }

    /// Request builder honouring the configured location mode.
    pub fn request_builder(&self) -> RequestBuilder {
        RequestBuilder::default().with_location(self.location_policy())
    }
}
