use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use thermoview::api::{self, AppState, HistoryResponse};
use thermoview::export::CsvOptions;
use thermoview::resample::Sample;
use thermoview::store::MemoryStore;
use thermoview::thermostat::Setpoint;

fn app_with(readings: Vec<Sample>) -> Router {
    let store = MemoryStore::new(Setpoint::new(25.0).unwrap()).with_readings(readings);
    api::router(AppState::new(Arc::new(store), CsvOptions::default()))
}

fn seeded_app() -> Router {
    let at = |m: u32, s: u32| Utc.with_ymd_and_hms(2024, 1, 1, 0, m, s).unwrap();
    app_with(vec![
        Sample::new(at(1, 5), 22.0),
        Sample::new(at(0, 10), 20.0),
        Sample::new(at(0, 50), 21.0),
    ])
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

const RANGE: &str = "start=2024-01-01T00:00:00Z&end=2024-01-01T00:02:00Z";

#[tokio::test]
async fn resampled_history_matches_nearest_samples() {
    let app = seeded_app();

    let response = app
        .oneshot(get(&format!(
            "/temperature/history/resampled?{RANGE}&interval=60"
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: HistoryResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body.labels.len(), 2);
    // 00:00:50 rounds into the 00:01:00 bucket but 00:01:05 is closer to it
    assert_eq!(body.data, vec![Some(20.0), Some(22.0)]);
    assert_eq!(body.statistics.max, Some(22.0));
    assert_eq!(body.statistics.min, Some(20.0));
    assert_eq!(body.statistics.mean, Some(21.0));
    assert_eq!(body.display.mean, "21.00°C");
}

#[tokio::test]
async fn resampled_history_rejects_bad_windows() {
    let app = seeded_app();

    let response = app
        .clone()
        .oneshot(get(&format!(
            "/temperature/history/resampled?{RANGE}&interval=0"
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"]
        .as_str()
        .unwrap()
        .contains("unsupported interval"));

    let response = app
        .oneshot(get(
            "/temperature/history/resampled?start=2024-01-01T00:02:00Z&end=2024-01-01T00:00:00Z",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn history_rejects_non_preset_intervals() {
    let app = seeded_app();

    for interval in ["90", "10000000000000000", "-60"] {
        for path in ["/temperature/history/resampled", "/temperature/history.csv"] {
            let response = app
                .clone()
                .oneshot(get(&format!("{path}?{RANGE}&interval={interval}")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path} {interval}");
        }
    }
}

#[tokio::test]
async fn history_rejects_oversized_grids() {
    let response = seeded_app()
        .oneshot(get(
            "/temperature/history/resampled?start=0001-01-01T00:00:00Z&end=9999-12-31T00:00:00Z&interval=60",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"]
        .as_str()
        .unwrap()
        .contains("buckets"));

    // a decade of hourly buckets stays under the limit
    let response = seeded_app()
        .oneshot(get(
            "/temperature/history/resampled?start=2020-01-01T00:00:00Z&end=2030-01-01T00:00:00Z&interval=3600",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn empty_range_gives_absent_statistics() {
    let response = app_with(Vec::new())
        .oneshot(get(&format!("/temperature/history/resampled?{RANGE}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"], json!([null, null]));
    assert_eq!(body["statistics"]["max"], Value::Null);
    assert_eq!(body["display"]["max"], "N/A");
    assert_eq!(body["scale"]["unit"], "minute");
}

#[tokio::test]
async fn csv_export() {
    let response = seeded_app()
        .oneshot(get(&format!("/temperature/history.csv?{RANGE}&interval=60")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/csv; charset=utf-8"
    );

    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(
        text,
        "\u{feff}date,time,temperature\n2024-01-01,09:00:00,20\n2024-01-01,09:01:00,22\n"
    );
}

#[tokio::test]
async fn raw_history_is_inclusive() {
    let response = seeded_app()
        .oneshot(get(
            "/temperature/history?start=2024-01-01T00:00:10Z&end=2024-01-01T00:00:50Z",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let samples: Vec<Sample> = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(samples.len(), 2);
}

#[tokio::test]
async fn current_temperature_follows_inserts() {
    let app = app_with(Vec::new());

    let response = app
        .clone()
        .oneshot(get("/temperature/current"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(post_json("/temperature", json!({ "temperature": 23.4 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.oneshot(get("/temperature/current")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(23.4));
}

#[tokio::test]
async fn setpoint_round_trip_and_validation() {
    let app = seeded_app();

    let response = app
        .clone()
        .oneshot(get("/temperature/setting"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!(25.0));

    let response = app
        .clone()
        .oneshot(post_json("/temperature/setting", json!({ "value": 305 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(30.5));

    let response = app
        .clone()
        .oneshot(post_json("/temperature/setting", json!({ "value": 700 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(get("/temperature/setting")).await.unwrap();
    assert_eq!(body_json(response).await, json!(30.5));
}

#[tokio::test]
async fn thermostat_toggle() {
    let app = seeded_app();

    let response = app
        .clone()
        .oneshot(get("/thermostat/status"))
        .await
        .unwrap();
    assert_eq!(
        body_json(response).await,
        json!({ "code": 768, "label": "OFF" })
    );

    let response = app
        .clone()
        .oneshot(post_json("/thermostat/control", json!({ "control": 1 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "code": 512, "label": "ON" })
    );

    let response = app
        .clone()
        .oneshot(post_json("/thermostat/control", json!({ "control": 7 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(get("/thermostat/status")).await.unwrap();
    assert_eq!(body_json(response).await["label"], "ON");
}

#[tokio::test]
async fn live_window_starts_empty() {
    let response = seeded_app()
        .oneshot(get("/temperature/live"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}
