//! REST endpoints consumed by the dashboard.
//!
//! The history endpoints hand back raw readings as well as the resampled chart series, so the
//! browser can either plot the bucketed view directly or fetch the CSV export.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::export::{to_csv_string, CsvOptions, StatisticsView};
use crate::history::{HistoryQuery, TimeScale};
use crate::live::DashboardWindow;
use crate::resample::{resample, BucketedSeries, Sample, Statistics};
use crate::store::ReadingStore;
use crate::thermostat::{ControlCommand, Setpoint, StatusReport};

const CSV_FILENAME: &str = "temperature-data.csv";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReadingStore>,
    pub live: Arc<Mutex<DashboardWindow>>,
    pub csv: CsvOptions,
}

impl AppState {
    pub fn new(store: Arc<dyn ReadingStore>, csv: CsvOptions) -> AppState {
        AppState {
            store,
            live: Arc::new(Mutex::new(DashboardWindow::new())),
            csv,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/temperature", post(insert_reading))
        .route("/temperature/current", get(current_temperature))
        .route("/temperature/live", get(live_readings))
        .route("/temperature/setting", get(read_setpoint).post(write_setpoint))
        .route("/temperature/history", get(history))
        .route("/temperature/history/resampled", get(resampled_history))
        .route("/temperature/history.csv", get(history_csv))
        .route("/thermostat/status", get(thermostat_status))
        .route("/thermostat/control", post(thermostat_control))
        .with_state(state)
}

/// Error body returned by every endpoint.
pub struct ApiError(Error);

impl<E: Into<Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            e if e.is_invalid_input() => StatusCode::BAD_REQUEST,
            Error::NoReading => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(status = status.as_u16(), error = %self.0, "request failed");
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct NewReading {
    pub timestamp: Option<DateTime<Utc>>,
    pub temperature: f64,
}

/// POST /temperature
async fn insert_reading(
    State(state): State<AppState>,
    Json(reading): Json<NewReading>,
) -> (StatusCode, Json<Sample>) {
    let sample = Sample::new(
        reading.timestamp.unwrap_or_else(Utc::now),
        reading.temperature,
    );
    state.store.insert(sample);
    debug!(temperature = sample.temperature, at = %sample.timestamp, "reading stored");
    (StatusCode::CREATED, Json(sample))
}

/// GET /temperature/current
async fn current_temperature(State(state): State<AppState>) -> ApiResult<Json<f64>> {
    let latest = state.store.latest().ok_or(Error::NoReading)?;
    Ok(Json(latest.temperature))
}

/// GET /temperature/live
async fn live_readings(State(state): State<AppState>) -> Json<Vec<Sample>> {
    Json(state.live.lock().to_vec())
}

/// GET /temperature/setting
async fn read_setpoint(State(state): State<AppState>) -> Json<Setpoint> {
    Json(state.store.setpoint())
}

#[derive(Debug, Deserialize)]
pub struct SetpointRequest {
    /// Register value, tenths of a degree
    pub value: i32,
}

/// POST /temperature/setting
async fn write_setpoint(
    State(state): State<AppState>,
    Json(req): Json<SetpointRequest>,
) -> ApiResult<Json<Setpoint>> {
    let setpoint = Setpoint::from_register(req.value)?;
    state.store.set_setpoint(setpoint);
    info!(%setpoint, "setpoint updated");
    Ok(Json(setpoint))
}

/// GET /thermostat/status
async fn thermostat_status(State(state): State<AppState>) -> Json<StatusReport> {
    Json(state.store.status().into())
}

#[derive(Debug, Deserialize)]
pub struct ControlRequest {
    pub control: i64,
}

/// POST /thermostat/control
async fn thermostat_control(
    State(state): State<AppState>,
    Json(req): Json<ControlRequest>,
) -> ApiResult<Json<StatusReport>> {
    let command = ControlCommand::from_wire(req.control)?;
    let status = state.store.apply(command);
    info!(?command, status = status.label(), "thermostat control applied");
    Ok(Json(status.into()))
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// GET /temperature/history
async fn history(
    State(state): State<AppState>,
    Query(q): Query<RangeQuery>,
) -> Json<Vec<Sample>> {
    Json(state.store.range(q.start, q.end))
}

/// Resampled history as the chart consumes it: parallel label and value arrays.
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub labels: Vec<DateTime<Utc>>,
    pub data: Vec<Option<f64>>,
    pub statistics: Statistics,
    pub display: StatisticsView,
    pub scale: TimeScale,
}

fn resample_query(state: &AppState, q: &HistoryQuery) -> Result<(BucketedSeries, Statistics)> {
    let window = q.window()?;
    let samples = state.store.range(q.start, q.end);
    let (series, statistics) = resample(&window, &samples);
    debug!(
        samples = samples.len(),
        buckets = series.len(),
        "history resampled"
    );
    Ok((series, statistics))
}

/// GET /temperature/history/resampled
async fn resampled_history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> ApiResult<Json<HistoryResponse>> {
    let (series, statistics) = resample_query(&state, &q)?;

    Ok(Json(HistoryResponse {
        labels: series.times(),
        data: series.temperatures(),
        display: StatisticsView::from(&statistics),
        statistics,
        scale: TimeScale::for_range(q.start, q.end),
    }))
}

/// GET /temperature/history.csv
async fn history_csv(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> ApiResult<Response> {
    let (series, _) = resample_query(&state, &q)?;
    let body = to_csv_string(&series, &state.csv)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CSV_FILENAME}\""),
            ),
        ],
        body,
    )
        .into_response())
}
