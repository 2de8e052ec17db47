use wxchart_rs::api::{FORECAST_ENDPOINT, LocationPolicy, RequestBuilder, build_request};
use wxchart_rs::models::{Coordinates, RequestConfig};

fn cfg(params: &[&str], model: Option<&str>) -> RequestConfig {
    RequestConfig {
        latitude: 52.52,
        longitude: 13.41,
        parameters: params.iter().map(|s| s.to_string()).collect(),
        model_name: model.map(str::to_string),
        title: None,
    }
}

#[test]
fn pinned_location_ignores_config_coordinates() {
    let url = build_request(&cfg(&["temperature_2m", "rain"], None));
    assert_eq!(
        url,
        format!(
            "{FORECAST_ENDPOINT}?latitude=-37.814&longitude=144.9633\
             &hourly=temperature_2m%2Crain&timezone=Australia%2FSydney"
        )
    );
}

#[test]
fn configured_location_uses_request_coordinates() {
    let url = RequestBuilder::default()
        .with_location(LocationPolicy::FromConfig)
        .build(&cfg(&["rain"], None));
    assert!(url.contains("latitude=52.52&longitude=13.41"));
}

#[test]
fn custom_pinned_point() {
    let url = RequestBuilder::default()
        .with_location(LocationPolicy::Pinned(Coordinates {
            latitude: 1.5,
            longitude: -2.25,
        }))
        .build(&cfg(&[], None));
    assert!(url.contains("latitude=1.5&longitude=-2.25"));
}

#[test]
fn hourly_omitted_when_empty() {
    let url = build_request(&cfg(&[], None));
    assert!(!url.contains("hourly="));
    assert!(url.ends_with("&timezone=Australia%2FSydney"));
}

#[test]
fn models_only_when_non_empty() {
    assert!(!build_request(&cfg(&["rain"], Some(""))).contains("models="));
    assert!(!build_request(&cfg(&["rain"], None)).contains("models="));

    let url = build_request(&cfg(&["rain"], Some("bom_access_global")));
    let hourly = url.find("hourly=").unwrap();
    let models = url.find("models=bom_access_global").unwrap();
    let tz = url.find("timezone=").unwrap();
    assert!(hourly < models && models < tz, "key order: {url}");
}

#[test]
fn endpoint_override() {
    let url = RequestBuilder::default()
        .with_endpoint("http://127.0.0.1:9/v1/forecast")
        .build(&cfg(&["rain"], None));
    assert!(url.starts_with("http://127.0.0.1:9/v1/forecast?latitude="));
}
