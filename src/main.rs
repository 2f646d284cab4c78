//! Stratus - a multi-source weather aggregation and normalization service.
//!
//! # Overview
//!
//! Stratus aggregates forecast, historical, air-quality and UV data from
//! public upstream APIs into one merged weather record per location, and
//! serves it over a small JSON API.
//!
//! # API Endpoints
//!
//! - `GET /weather` - Fetch the merged weather record for a coordinate
//! - `GET /weather/day` - Select a single day by signed offset
//! - `GET /weather/daily` - Combined historical+forecast day table
//! - `GET /health` - Health check

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use stratus::aggregation::Aggregator;
use stratus::api::{AppState, get_daily_table, get_weather, get_weather_day, health_check};
use stratus::model::Coordinate;
use stratus::service::{SingleSlotCache, WeatherService};

/// Default port if not specified via environment variable.
const DEFAULT_PORT: u16 = 3000;

/// How long a resolved fallback location stays cached.
const LOCATION_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with environment filter
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("stratus=info".parse()?))
        .init();

    // Load configuration from environment
    let port: u16 = env::var("STRATUS_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let fallback_location = fallback_location_from_env();

    info!(port, fallback = fallback_location.is_some(), "Starting Stratus server");

    let service = WeatherService::new(Aggregator::new());
    let state = AppState {
        service,
        location: Arc::new(SingleSlotCache::new(LOCATION_CACHE_TTL)),
        fallback_location,
    };

    // Build router
    let app = Router::new()
        .route("/weather", get(get_weather))
        .route("/weather/day", get(get_weather_day))
        .route("/weather/daily", get(get_daily_table))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "Stratus is listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Read the optional fallback coordinate from the environment, dropping it
/// if out of range.
fn fallback_location_from_env() -> Option<Coordinate> {
    let latitude: f64 = env::var("STRATUS_DEFAULT_LATITUDE").ok()?.parse().ok()?;
    let longitude: f64 = env::var("STRATUS_DEFAULT_LONGITUDE").ok()?.parse().ok()?;
    Coordinate::new(latitude, longitude).ok()
}
