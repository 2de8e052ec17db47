//! Reactive control panel: parameter toggles, debounced recompute, and the
//! `loading → ready | empty | error` state machine around one chart surface.
//!
//! The panel never blocks on the network by itself. A host either calls
//! [`ControlPanel::run_pending`] with a fetcher (CLI, tests) or takes the
//! [`CycleRequest`] from [`ControlPanel::poll`], fetches on a worker thread, and hands the
//! result back through [`ControlPanel::complete`] (GUI). Every cycle carries a generation
//! number; completions from superseded cycles are dropped.

use log::{debug, error, info};
use std::time::{Duration, Instant};

use crate::api::{Fetch, RequestBuilder};
use crate::error::ChartError;
use crate::grouping::{Grouped, LabelStyle, group_with_style};
use crate::models::{ChartState, RawPayload, RequestConfig};
use crate::viz::{ChartHandle, ChartSurface, render};

/// Quiet interval between the last toggle and the recompute.
pub const QUIET_INTERVAL: Duration = Duration::from_millis(300);

/// End-user text of the error state. Details only go to the log.
pub const GENERIC_ERROR: &str = "Error loading weather data";

/// Trailing-edge debounce driven by an explicit clock.
///
/// Scheduling again while a deadline is pending replaces it, so a burst of triggers
/// collapses into one firing `quiet` after the last of them.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(QUIET_INTERVAL)
    }
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    /// True exactly once per scheduled deadline, when `now` has reached it.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Time left until the pending deadline (zero once due).
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// One togglable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterOption {
    /// Control key (`temperature`).
    pub key: &'static str,
    /// Forecast parameter it selects (`temperature_2m`).
    pub parameter: &'static str,
    pub label: &'static str,
}

pub const KNOWN_PARAMETERS: [ParameterOption; 3] = [
    ParameterOption {
        key: "temperature",
        parameter: "temperature_2m",
        label: "Temperature",
    },
    ParameterOption {
        key: "rain",
        parameter: "rain",
        label: "Rain",
    },
    ParameterOption {
        key: "snowfall",
        parameter: "snowfall",
        label: "Snowfall",
    },
];

/// Selection used when nothing is configured.
pub const DEFAULT_SELECTION: [&str; 2] = ["temperature_2m", "rain"];

/// Initial toggle state: configured parameters that are known, else the default pair.
pub fn initial_selection(configured: &[String]) -> Vec<bool> {
    KNOWN_PARAMETERS
        .iter()
        .map(|o| {
            if configured.is_empty() {
                DEFAULT_SELECTION.contains(&o.parameter)
            } else {
                configured.iter().any(|p| p == o.parameter)
            }
        })
        .collect()
}

/// Work order for one fetch, tagged with the cycle that issued it.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleRequest {
    pub generation: u64,
    pub url: String,
    pub parameters: Vec<String>,
}

/// The interactive widget: toggles, debouncer, state and the owned chart surface.
#[derive(Debug)]
pub struct ControlPanel {
    config: RequestConfig,
    builder: RequestBuilder,
    checked: Vec<bool>,
    debouncer: Debouncer,
    generation: u64,
    in_flight: Option<CycleRequest>,
    state: ChartState,
    surface: ChartSurface,
    label_style: LabelStyle,
}

impl ControlPanel {
    /// Mount a panel. The first cycle is scheduled right away, like any toggle.
    pub fn new(
        config: RequestConfig,
        builder: RequestBuilder,
        surface: ChartSurface,
        now: Instant,
    ) -> Self {
        let checked = initial_selection(&config.parameters);
        let mut debouncer = Debouncer::default();
        debouncer.schedule(now);
        Self {
            config,
            builder,
            checked,
            debouncer,
            generation: 0,
            in_flight: None,
            state: ChartState::Loading,
            surface,
            label_style: LabelStyle::default(),
        }
    }

    pub fn with_label_style(mut self, style: LabelStyle) -> Self {
        self.label_style = style;
        self
    }

    /// Swap in new request settings and a new surface, keeping the toggles.
    ///
    /// The generation keeps counting, so results still in flight from the old settings
    /// are dropped when they arrive. A fresh cycle is scheduled.
    pub fn reconfigure(
        &mut self,
        config: RequestConfig,
        builder: RequestBuilder,
        surface: ChartSurface,
        style: LabelStyle,
        now: Instant,
    ) {
        self.teardown();
        self.config = config;
        self.builder = builder;
        self.surface = surface;
        self.label_style = style;
        self.state = ChartState::Loading;
        self.debouncer.schedule(now);
    }

    pub fn options(&self) -> impl Iterator<Item = (&'static ParameterOption, bool)> + '_ {
        KNOWN_PARAMETERS.iter().zip(self.checked.iter().copied())
    }

    /// Selected parameters in control order.
    pub fn selected(&self) -> Vec<String> {
        self.options()
            .filter(|(_, on)| *on)
            .map(|(o, _)| o.parameter.to_string())
            .collect()
    }

    fn index_of(parameter: &str) -> Option<usize> {
        KNOWN_PARAMETERS
            .iter()
            .position(|o| o.parameter == parameter || o.key == parameter)
    }

    /// Set one toggle (by parameter or control key). Returns false, and schedules
    /// nothing, for unknown parameters or when the value did not change.
    pub fn set_checked(&mut self, parameter: &str, on: bool, now: Instant) -> bool {
        let Some(idx) = Self::index_of(parameter) else {
            return false;
        };
        if self.checked[idx] == on {
            return false;
        }
        self.checked[idx] = on;
        self.debouncer.schedule(now);
        true
    }

    pub fn toggle(&mut self, parameter: &str, now: Instant) -> bool {
        match Self::index_of(parameter) {
            Some(idx) => {
                let on = !self.checked[idx];
                self.set_checked(parameter, on, now)
            }
            None => false,
        }
    }

    /// Start a cycle if the debounce deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<CycleRequest> {
        if self.debouncer.fire(now) {
            self.begin_cycle()
        } else {
            None
        }
    }

    /// How long a host may sleep before the next [`poll`](Self::poll) matters.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.debouncer.time_remaining(now)
    }

    /// Start a new generation. An empty selection settles immediately in `Empty`
    /// (no request, prior chart released); otherwise the state becomes `Loading` and the
    /// returned request must be fetched.
    pub fn begin_cycle(&mut self) -> Option<CycleRequest> {
        self.generation += 1;
        let parameters = self.selected();
        if parameters.is_empty() {
            debug!("cycle {}: nothing selected", self.generation);
            self.in_flight = None;
            self.surface.release();
            self.state = ChartState::Empty;
            return None;
        }

        let url = self
            .builder
            .build(&self.config.with_parameters(parameters.clone()));
        info!("cycle {}: fetching {}", self.generation, parameters.join(","));
        let req = CycleRequest {
            generation: self.generation,
            url,
            parameters,
        };
        self.in_flight = Some(req.clone());
        self.state = ChartState::Loading;
        Some(req)
    }

    /// Deliver the fetch result of cycle `generation`. Returns false when the result
    /// belongs to a superseded cycle and was dropped.
    pub fn complete(&mut self, generation: u64, result: Result<RawPayload, ChartError>) -> bool {
        let current = self.in_flight.as_ref().map(|r| r.generation);
        if current != Some(generation) {
            debug!(
                "dropping stale result of cycle {generation} (latest is {})",
                self.generation
            );
            return false;
        }
        let Some(req) = self.in_flight.take() else {
            return false;
        };

        match self.draw(&req.parameters, result) {
            Ok(grouped) => {
                self.state = ChartState::Ready {
                    labels: grouped.labels,
                    series: grouped.series,
                    axes: grouped.axes,
                };
            }
            Err(e) => {
                error!("cycle {generation} failed: {e}");
                self.surface.release();
                self.state = ChartState::Error {
                    message: GENERIC_ERROR.to_string(),
                };
            }
        }
        true
    }

    fn draw(
        &mut self,
        parameters: &[String],
        result: Result<RawPayload, ChartError>,
    ) -> Result<Grouped, ChartError> {
        let payload = result?;
        let grouped = group_with_style(&payload, parameters, self.label_style)?;
        render(
            &mut self.surface,
            &grouped.labels,
            &grouped.series,
            &grouped.axes,
            self.config.title.as_deref(),
        )?;
        Ok(grouped)
    }

    /// Poll and, when a cycle starts, fetch synchronously with `fetcher`.
    /// Returns true if a cycle ran (including one that settled in `Empty`).
    pub fn run_pending<F: Fetch + ?Sized>(&mut self, fetcher: &F, now: Instant) -> bool {
        if !self.debouncer.fire(now) {
            return false;
        }
        self.run_cycle(fetcher);
        true
    }

    /// Skip the debounce and run a cycle now.
    pub fn refresh_now<F: Fetch + ?Sized>(&mut self, fetcher: &F) {
        self.debouncer.cancel();
        self.run_cycle(fetcher);
    }

    fn run_cycle<F: Fetch + ?Sized>(&mut self, fetcher: &F) {
        if let Some(req) = self.begin_cycle() {
            let result = fetcher.fetch_payload(&req.url);
            self.complete(req.generation, result);
        }
    }

    pub fn state(&self) -> &ChartState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn chart(&self) -> Option<&ChartHandle> {
        self.surface.handle()
    }

    pub fn surface(&self) -> &ChartSurface {
        &self.surface
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Unmount: cancel pending work, drop any in-flight result and release the chart.
    pub fn teardown(&mut self) {
        self.debouncer.cancel();
        self.in_flight = None;
        self.generation += 1;
        self.surface.release();
    }
}

/// One non-interactive cycle: build, fetch, group, render.
pub fn run_once<F: Fetch + ?Sized>(
    fetcher: &F,
    builder: &RequestBuilder,
    config: &RequestConfig,
    surface: &mut ChartSurface,
    style: LabelStyle,
) -> Result<Grouped, ChartError> {
    let url = builder.build(config);
    let payload = fetcher.fetch_payload(&url)?;
    let grouped = group_with_style(&payload, &config.parameters, style)?;
    render(
        surface,
        &grouped.labels,
        &grouped.series,
        &grouped.axes,
        config.title.as_deref(),
    )?;
    Ok(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debouncer_collapses_bursts() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(300));
        d.schedule(t0);
        d.schedule(t0 + Duration::from_millis(100));
        d.schedule(t0 + Duration::from_millis(200));
        assert!(!d.fire(t0 + Duration::from_millis(300)));
        assert!(d.fire(t0 + Duration::from_millis(500)));
        assert!(!d.fire(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn initial_selection_defaults_and_intersects() {
        assert_eq!(initial_selection(&[]), vec![true, true, false]);
        let cfg = vec!["snowfall".to_string(), "wind_speed_10m".to_string()];
        assert_eq!(initial_selection(&cfg), vec![false, false, true]);
    }
}
