//! wxchart_rs
//!
//! A small Rust library for fetching hourly forecast data from Open-Meteo and drawing it
//! as a multi-axis line chart. Pairs with the `wxchart` CLI and the `wxchart-gui` panel.
//!
//! ### Features
//! - Build forecast request URLs and fetch them with a blocking client
//! - Group series onto shared y-axes by physical unit, one stable color per series
//! - Render SVG/PNG files or in-memory RGB buffers with one scale per unit
//! - Debounced, generation-checked control panel for interactive hosts
//! - Save a cycle's series as CSV or JSON; quick per-series summary statistics
//!
//! ### Example
//! ```no_run
//! use wxchart_rs::{Client, LabelStyle, RequestBuilder, RequestConfig};
//! use wxchart_rs::viz::ChartSurface;
//!
//! let cfg = RequestConfig {
//!     parameters: vec!["temperature_2m".into(), "rain".into()],
//!     title: Some("Melbourne".into()),
//!     ..Default::default()
//! };
//! let mut surface = ChartSurface::file("forecast.svg", 1000, 480);
//! let grouped = wxchart_rs::panel::run_once(
//!     &Client::default(),
//!     &RequestBuilder::default(),
//!     &cfg,
//!     &mut surface,
//!     LabelStyle::English,
//! )?;
//! wxchart_rs::storage::save_csv(&grouped, "forecast.csv")?;
//! println!("{:#?}", wxchart_rs::stats::series_summary(&grouped.series));
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod grouping;
pub mod models;
pub mod panel;
pub mod stats;
pub mod storage;
pub mod viz;

pub use api::{Client, Fetch, LocationPolicy, RequestBuilder, build_request};
pub use config::WidgetConfig;
pub use error::ChartError;
pub use grouping::{Grouped, LabelStyle, group};
pub use models::{Axis, AxisPosition, ChartState, RawPayload, RequestConfig, Series};
pub use panel::ControlPanel;
