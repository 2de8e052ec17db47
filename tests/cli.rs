use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("wxchart").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("wxchart"));
}

#[test]
fn url_prints_pinned_request() {
    let mut cmd = Command::cargo_bin("wxchart").unwrap();
    cmd.args(["url", "--hourly", "temperature_2m;rain", "--model", "bom_access_global"]);
    cmd.assert().success().stdout(predicate::str::contains(
        "latitude=-37.814&longitude=144.9633&hourly=temperature_2m%2Crain&models=bom_access_global&timezone=Australia%2FSydney",
    ));
}

#[test]
fn url_without_hourly_uses_default_toggles() {
    let mut cmd = Command::cargo_bin("wxchart").unwrap();
    cmd.arg("url");
    cmd.assert().success().stdout(predicate::str::contains(
        "longitude=144.9633&hourly=temperature_2m%2Crain&timezone=Australia%2FSydney",
    ));
}

#[test]
fn url_honours_configured_location_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("widget.json");
    std::fs::write(
        &cfg,
        r#"{"latitude": 52.52, "longitude": 13.41, "hourly": "snowfall", "location": "configured"}"#,
    )
    .unwrap();
    let mut cmd = Command::cargo_bin("wxchart").unwrap();
    cmd.args(["url", "--config"]).arg(&cfg);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("latitude=52.52&longitude=13.41&hourly=snowfall"));
}

#[test]
fn plot_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("wxchart").unwrap();
    cmd.args(["plot", "--endpoint", "http://127.0.0.1:9/v1/forecast", "--plot"])
        .arg(dir.path().join("missing").join("chart.svg"));
    cmd.assert().failure();
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn plot_online_with_stats() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("wxchart").unwrap();
    cmd.args(["plot", "--hourly", "temperature_2m,rain", "--stats", "--locale", "de", "--plot"])
        .arg(dir.path().join("chart.png"))
        .arg("--out")
        .arg(dir.path().join("data.csv"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("temperature_2m"));
}
