//! HTTP API handlers for Stratus.
//!
//! The handlers are a thin boundary over the service layer:
//!
//! - **GET /weather**: the full merged record for a coordinate and window.
//! - **GET /weather/day**: one day's summary selected by signed offset.
//! - **GET /weather/daily**: the combined historical+forecast day table.
//! - **GET /health**: liveness check.
//!
//! Upstream degradation is already absorbed below this layer; the only
//! errors surfaced here are invalid requests (400) and the mandatory
//! forecast source being unavailable (502).

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::model::{Coordinate, TimeWindow, WeatherRecord};
use crate::selection::{DaySummary, Extremum, Occurrence, daily_table, extremum_occurrence, select_day};
use crate::service::{SingleSlotCache, WeatherService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: WeatherService,

    /// Single-slot cache for the resolved fallback location; owned here,
    /// at the composition root.
    pub location: Arc<SingleSlotCache<Coordinate>>,

    /// Location used when a request carries no coordinate (stand-in for an
    /// external geolocation provider).
    pub fallback_location: Option<Coordinate>,
}

/// Query parameters for GET /weather and GET /weather/daily.
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Days of history to include (default: 0).
    #[serde(default)]
    pub past_days: u32,

    /// Days of forecast to include (default: 1).
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
}

fn default_forecast_days() -> u32 {
    1
}

/// Query parameters for GET /weather/day.
#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Signed day offset from today (default: 0).
    #[serde(default)]
    pub offset: i32,
}

/// Response for GET /weather/day.
#[derive(Debug, Serialize)]
pub struct DayResponse {
    pub summary: DaySummary,

    /// When today's high occurs; only reported for offset 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_occurs: Option<Occurrence>,

    /// When today's low occurs; only reported for offset 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_occurs: Option<Occurrence>,
}

/// GET /weather - Fetch the merged weather record.
///
/// # Query Parameters
///
/// - `latitude`, `longitude` (optional as a pair): coordinate to query
/// - `past_days` (optional): days of history (default: 0)
/// - `forecast_days` (optional): days of forecast (default: 1)
#[instrument(skip(state))]
pub async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherRecord>, StatusCode> {
    let coord = resolve_coordinate(&state, query.latitude, query.longitude)?;
    let window = TimeWindow::new(query.past_days, query.forecast_days);

    match state.service.fetch(coord, window).await {
        Ok(record) => {
            info!(
                latitude = coord.latitude,
                longitude = coord.longitude,
                past_days = window.past_days,
                forecast_days = window.forecast_days,
                historical = record.historical.is_some(),
                "Weather record assembled"
            );
            Ok(Json(record))
        }
        Err(e) => {
            warn!(
                latitude = coord.latitude,
                longitude = coord.longitude,
                error = %e,
                "Failed to assemble weather record"
            );
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}

/// GET /weather/day - Select a single day by signed offset.
///
/// Negative offsets require historical coverage; a day the record cannot
/// serve comes back with `available: false` rather than an error.
#[instrument(skip(state))]
pub async fn get_weather_day(
    State(state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Result<Json<DayResponse>, StatusCode> {
    let coord = resolve_coordinate(&state, query.latitude, query.longitude)?;
    let window = TimeWindow::from_day_offset(query.offset);

    match state.service.fetch(coord, window).await {
        Ok(record) => {
            let today = Utc::now().date_naive();
            let summary = select_day(&record, query.offset, today);
            let (high_occurs, low_occurs) = if query.offset == 0 {
                (
                    Some(extremum_occurrence(&record, Extremum::High)),
                    Some(extremum_occurrence(&record, Extremum::Low)),
                )
            } else {
                (None, None)
            };

            info!(
                offset = query.offset,
                available = summary.available,
                origin = ?summary.origin,
                "Day selected"
            );
            Ok(Json(DayResponse {
                summary,
                high_occurs,
                low_occurs,
            }))
        }
        Err(e) => {
            warn!(offset = query.offset, error = %e, "Failed to select day");
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}

/// GET /weather/daily - The combined historical+forecast day table.
///
/// Rows are ordered by date; on a date covered by both blocks the forecast
/// row wins.
#[instrument(skip(state))]
pub async fn get_daily_table(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<Vec<DaySummary>>, StatusCode> {
    let coord = resolve_coordinate(&state, query.latitude, query.longitude)?;
    let window = TimeWindow::new(query.past_days, query.forecast_days);

    match state.service.fetch(coord, window).await {
        Ok(record) => {
            let table = daily_table(&record);
            info!(rows = table.len(), "Daily table assembled");
            Ok(Json(table))
        }
        Err(e) => {
            warn!(error = %e, "Failed to assemble daily table");
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Resolve the request coordinate: an explicit pair wins, then the cached
/// fallback. The coordinate must be a complete, in-range pair.
fn resolve_coordinate(
    state: &AppState,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Coordinate, StatusCode> {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => {
            Coordinate::new(latitude, longitude).map_err(|e| {
                warn!(error = %e, "Rejecting out-of-range coordinate");
                StatusCode::BAD_REQUEST
            })
        }
        (None, None) => {
            let now = Instant::now();
            if let Some(coord) = state.location.get(now) {
                return Ok(coord);
            }
            match state.fallback_location {
                Some(coord) => {
                    state.location.put(coord, now);
                    Ok(coord)
                }
                None => {
                    warn!("No coordinate supplied and no fallback location configured");
                    Err(StatusCode::BAD_REQUEST)
                }
            }
        }
        _ => {
            warn!("Latitude and longitude must be supplied together");
            Err(StatusCode::BAD_REQUEST)
        }
    }
}
