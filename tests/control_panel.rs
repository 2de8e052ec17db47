use std::cell::RefCell;
use std::time::{Duration, Instant};
use wxchart_rs::api::{Fetch, RequestBuilder};
use wxchart_rs::models::{ChartState, RawPayload, RequestConfig};
use wxchart_rs::panel::{ControlPanel, GENERIC_ERROR, QUIET_INTERVAL};
use wxchart_rs::viz::ChartSurface;
use wxchart_rs::{ChartError, LabelStyle};

const BODY: &str = r#"{
    "utc_offset_seconds": 36000,
    "hourly_units": {"temperature_2m": "°C", "rain": "mm", "snowfall": "cm"},
    "hourly": {
        "time": ["2024-07-05T00:00", "2024-07-05T01:00", "2024-07-05T02:00"],
        "temperature_2m": [9.1, 8.7, 8.2],
        "rain": [0.0, 0.2, 0.6],
        "snowfall": [0.0, 0.0, 0.0]
    }
}"#;

/// Records every URL and answers with a canned body or status.
struct FakeFetch {
    status: Option<u16>,
    body: &'static str,
    urls: RefCell<Vec<String>>,
}

impl FakeFetch {
    fn ok() -> Self {
        Self {
            status: None,
            body: BODY,
            urls: RefCell::new(Vec::new()),
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            status: Some(status),
            body: "internal error",
            urls: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.urls.borrow().len()
    }
}

impl Fetch for FakeFetch {
    fn fetch_payload(&self, url: &str) -> Result<RawPayload, ChartError> {
        self.urls.borrow_mut().push(url.to_string());
        match self.status {
            Some(status) => Err(ChartError::Transport {
                status,
                body: self.body.to_string(),
            }),
            None => RawPayload::from_json_str(self.body),
        }
    }
}

fn panel(parameters: &[&str], t0: Instant) -> ControlPanel {
    let cfg = RequestConfig {
        parameters: parameters.iter().map(|s| s.to_string()).collect(),
        title: Some("Melbourne".into()),
        ..Default::default()
    };
    ControlPanel::new(cfg, RequestBuilder::default(), ChartSurface::memory(320, 200), t0)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn mount_runs_one_debounced_cycle() {
    let t0 = Instant::now();
    let fetch = FakeFetch::ok();
    let mut p = panel(&[], t0);
    assert_eq!(p.state(), &ChartState::Loading);
    assert_eq!(p.selected(), vec!["temperature_2m", "rain"]);

    assert!(!p.run_pending(&fetch, t0 + ms(100)));
    assert_eq!(fetch.calls(), 0);
    assert!(p.run_pending(&fetch, t0 + QUIET_INTERVAL));
    assert_eq!(fetch.calls(), 1);
    assert!(fetch.urls.borrow()[0].contains("hourly=temperature_2m%2Crain"));

    match p.state() {
        ChartState::Ready { labels, series, axes } => {
            assert_eq!(labels.len(), 3);
            assert_eq!(series.len(), 2);
            assert_eq!(axes.len(), 2);
        }
        other => panic!("expected ready, got {other:?}"),
    }
    assert!(p.chart().is_some());
}

#[test]
fn toggle_burst_collapses_into_one_fetch() {
    let t0 = Instant::now();
    let fetch = FakeFetch::ok();
    let mut p = panel(&[], t0);
    p.run_pending(&fetch, t0 + ms(300));

    let t = t0 + ms(1000);
    assert!(p.toggle("snowfall", t));
    assert!(p.toggle("rain", t + ms(100)));
    assert!(p.toggle("rain", t + ms(200)));
    assert!(!p.run_pending(&fetch, t + ms(450)));
    assert!(p.run_pending(&fetch, t + ms(500)));
    assert!(!p.run_pending(&fetch, t + ms(2000)));
    assert_eq!(fetch.calls(), 2);
    assert!(fetch.urls.borrow()[1].contains("hourly=temperature_2m%2Crain%2Csnowfall"));
}

#[test]
fn unchanged_or_unknown_toggles_schedule_nothing() {
    let t0 = Instant::now();
    let fetch = FakeFetch::ok();
    let mut p = panel(&[], t0);
    p.run_pending(&fetch, t0 + ms(300));
    assert!(!p.set_checked("rain", true, t0 + ms(400)));
    assert!(!p.toggle("wind_speed_10m", t0 + ms(400)));
    assert!(p.time_until_due(t0 + ms(400)).is_none());
}

#[test]
fn empty_selection_issues_no_fetch() {
    let t0 = Instant::now();
    let fetch = FakeFetch::ok();
    let mut p = panel(&[], t0);
    p.run_pending(&fetch, t0 + ms(300));
    assert!(p.chart().is_some());

    let t = t0 + ms(1000);
    p.set_checked("temperature_2m", false, t);
    p.set_checked("rain", false, t);
    assert!(p.run_pending(&fetch, t + ms(300)));
    assert_eq!(fetch.calls(), 1);
    assert_eq!(p.state(), &ChartState::Empty);
    assert_eq!(
        p.state().message(),
        Some("Select at least one variable to display.")
    );
    assert!(p.chart().is_none());
}

#[test]
fn http_500_ends_in_error_without_chart() {
    let t0 = Instant::now();
    let fetch = FakeFetch::failing(500);
    let mut p = panel(&["temperature_2m"], t0);
    assert!(p.run_pending(&fetch, t0 + ms(300)));
    assert_eq!(
        p.state(),
        &ChartState::Error {
            message: GENERIC_ERROR.into()
        }
    );
    assert!(p.chart().is_none());
    assert!(!p.is_loading());
}

#[test]
fn stale_results_are_discarded() {
    let t0 = Instant::now();
    let mut p = panel(&[], t0);
    let first = p.poll(t0 + ms(300)).unwrap();

    p.toggle("snowfall", t0 + ms(400));
    let second = p.poll(t0 + ms(700)).unwrap();
    assert!(second.generation > first.generation);

    let payload = RawPayload::from_json_str(BODY).unwrap();
    assert!(!p.complete(first.generation, Ok(payload.clone())));
    assert_eq!(p.state(), &ChartState::Loading);

    assert!(p.complete(second.generation, Ok(payload.clone())));
    match p.state() {
        ChartState::Ready { series, .. } => assert_eq!(series.len(), 3),
        other => panic!("expected ready, got {other:?}"),
    }
    // a late duplicate does not overwrite the settled state
    assert!(!p.complete(second.generation, Err(ChartError::MissingTimeData)));
    assert!(p.state().is_ready());
}

#[test]
fn reconfigure_keeps_generations_counting() {
    let t0 = Instant::now();
    let mut p = panel(&[], t0);
    let old = p.poll(t0 + ms(300)).unwrap();
    p.toggle("snowfall", t0 + ms(350));

    let cfg = RequestConfig {
        parameters: p.selected(),
        model_name: Some("bom_access_global".into()),
        title: Some("Hobart".into()),
        ..Default::default()
    };
    p.reconfigure(
        cfg,
        RequestBuilder::default(),
        ChartSurface::memory(320, 200),
        LabelStyle::English,
        t0 + ms(400),
    );
    assert_eq!(p.state(), &ChartState::Loading);
    assert_eq!(p.config().title.as_deref(), Some("Hobart"));
    assert!(p.generation() > old.generation);
    assert!(p.poll(t0 + ms(650)).is_none());

    let new = p.poll(t0 + ms(700)).unwrap();
    assert!(new.generation > old.generation);
    assert!(new.url.contains("models=bom_access_global"));
    assert!(new.url.contains("hourly=temperature_2m%2Crain%2Csnowfall"));

    let payload = RawPayload::from_json_str(BODY).unwrap();
    assert!(!p.complete(old.generation, Ok(payload.clone())));
    assert_eq!(p.state(), &ChartState::Loading);
    assert!(p.complete(new.generation, Ok(payload)));
    match p.state() {
        ChartState::Ready { series, .. } => assert_eq!(series.len(), 3),
        other => panic!("expected ready, got {other:?}"),
    }
}

#[test]
fn missing_time_data_is_an_error_state() {
    let t0 = Instant::now();
    let mut p = panel(&["rain"], t0);
    let req = p.poll(t0 + ms(300)).unwrap();
    let payload = RawPayload::from_json_str(r#"{"hourly": {"rain": [1.0]}}"#).unwrap();
    p.complete(req.generation, Ok(payload));
    assert_eq!(p.state().message(), Some(GENERIC_ERROR));
}

#[test]
fn configured_parameters_are_intersected_with_known_set() {
    let t0 = Instant::now();
    let p = panel(&["snowfall", "wind_speed_10m"], t0);
    assert_eq!(p.selected(), vec!["snowfall"]);
}

#[test]
fn teardown_releases_chart_and_drops_in_flight() {
    let t0 = Instant::now();
    let fetch = FakeFetch::ok();
    let mut p = panel(&[], t0);
    p.run_pending(&fetch, t0 + ms(300));
    assert!(p.chart().is_some());

    p.toggle("snowfall", t0 + ms(400));
    let req = p.poll(t0 + ms(700)).unwrap();
    p.teardown();
    assert!(p.chart().is_none());
    assert!(!p.complete(req.generation, RawPayload::from_json_str(BODY)));
}

#[test]
fn refresh_now_skips_the_debounce() {
    let t0 = Instant::now();
    let fetch = FakeFetch::ok();
    let mut p = panel(&["rain"], t0);
    p.refresh_now(&fetch);
    assert_eq!(fetch.calls(), 1);
    assert!(p.state().is_ready());
    assert!(!p.run_pending(&fetch, t0 + ms(1000)));
}
