//! Synchronous client for the **Open-Meteo forecast API**.
//!
//! Two halves:
//! - [`RequestBuilder`] turns a [`RequestConfig`] into a fully-qualified URL (pure).
//! - [`Client`] issues a single GET and decodes the body into a [`RawPayload`].
//!
//! ### Notes
//! - The builder pins the location to one hard-coded point by default; callers opt into
//!   their configured coordinates with [`LocationPolicy::FromConfig`].
//! - There are no retries and no caching: every call hits the network once.
//! - Network timeouts use a sane default (30s) and can be adjusted by editing the client builder.
//!
//! Typical usage:
//! ```no_run
//! # use wxchart_rs::api::{Client, Fetch, build_request};
//! # use wxchart_rs::models::RequestConfig;
//! let cfg = RequestConfig {
//!     parameters: vec!["temperature_2m".into(), "rain".into()],
//!     ..Default::default()
//! };
//! let payload = Client::default().fetch_payload(&build_request(&cfg))?;
//! # Ok::<(), wxchart_rs::ChartError>(())
//! ```
use crate::error::ChartError;
use crate::models::{Coordinates, RawPayload, RequestConfig};
use log::debug;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use std::time::Duration;

pub const FORECAST_ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast";

/// Melbourne CBD.
pub const PINNED_LOCATION: Coordinates = Coordinates {
    latitude: -37.814,
    longitude: 144.9633,
};

pub const DEFAULT_TIMEZONE: &str = "Australia/Sydney";

// Form-style encoding: keep -, _, ., * unescaped; ',' and '/' are escaped.
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'*');

fn enc(s: &str) -> String {
    percent_encoding::utf8_percent_encode(s, QUERY).to_string()
}

/// Where the request's coordinates come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationPolicy {
    /// Always encode these coordinates, ignoring the config.
    Pinned(Coordinates),
    /// Use `RequestConfig::{latitude, longitude}`.
    FromConfig,
}

impl Default for LocationPolicy {
    fn default() -> Self {
        LocationPolicy::Pinned(PINNED_LOCATION)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestBuilder {
    pub endpoint: String,
    pub location: LocationPolicy,
    pub timezone: String,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self {
            endpoint: FORECAST_ENDPOINT.into(),
            location: LocationPolicy::default(),
            timezone: DEFAULT_TIMEZONE.into(),
        }
    }
}

impl RequestBuilder {
    pub fn with_location(mut self, location: LocationPolicy) -> Self {
        self.location = location;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Build the forecast URL for `config`.
    ///
    /// Keys are written in the order `latitude, longitude, hourly, models, timezone`;
    /// `hourly` is omitted for an empty parameter list and `models` for a missing or
    /// empty model name.
    pub fn build(&self, config: &RequestConfig) -> String {
        let coords = match self.location {
            LocationPolicy::Pinned(c) => c,
            LocationPolicy::FromConfig => config.coordinates(),
        };

        let mut url = format!(
            "{}?latitude={}&longitude={}",
            self.endpoint, coords.latitude, coords.longitude
        );
        if !config.parameters.is_empty() {
            url.push_str(&format!("&hourly={}", enc(&config.parameters.join(","))));
        }
        if let Some(model) = config.model_name.as_deref().filter(|m| !m.is_empty()) {
            url.push_str(&format!("&models={}", enc(model)));
        }
        url.push_str(&format!("&timezone={}", enc(&self.timezone)));
        url
    }
}

/// Build a request with the default (pinned) builder.
pub fn build_request(config: &RequestConfig) -> String {
    RequestBuilder::default().build(config)
}

/// Source of forecast payloads. Composing code passes one explicitly; tests pass fakes.
pub trait Fetch {
    fn fetch_payload(&self, url: &str) -> Result<RawPayload, ChartError>;
}

#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("wxchart_rs/", env!("CARGO_PKG_VERSION"))) // set user agent
            .build()
            .expect("reqwest client build");
        Self { http }
    }
}

impl Fetch for Client {
    /// Single GET; a failed attempt is surfaced immediately.
    fn fetch_payload(&self, url: &str) -> Result<RawPayload, ChartError> {
        debug!("GET {url}");
        let resp = self.http.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            // The error body is informational only.
            let body = resp.text().unwrap_or_default();
            return Err(ChartError::Transport {
                status: status.as_u16(),
                body,
            });
        }
        let body = resp.text()?;
        RawPayload::from_json_str(&body)
    }
}
