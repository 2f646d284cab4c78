//! Stratus - a multi-source weather aggregation and normalization service.
//!
//! # Overview
//!
//! Stratus takes a geographic coordinate plus a requested time window and
//! produces one consistent, unit-agnostic weather record by merging results
//! from four independent, differently-shaped upstream services: forecast,
//! historical re-forecast, air quality, and UV index. Each upstream may
//! fail or be partially unavailable; only the forecast source is mandatory,
//! everything else degrades gracefully.
//!
//! On top of the merged record sit pure layers: unit conversion, derived
//! metrics (feels-like temperature, AQI rescaling), and day/range selection
//! under an injectable clock.
//!
//! # Modules
//!
//! - [`model`]: the data model: coordinates, windows, series, the merged
//!   [`model::WeatherRecord`], and the closed WMO code classification
//! - [`units`]: unit conversion between the supported measurement families
//! - [`metrics`]: derived metrics computed from normalized observations
//! - [`data_sources`]: one client per upstream, each absorbing its own
//!   failures into a typed sentinel
//! - [`aggregation`]: concurrent fan-out and the merge policy
//! - [`selection`]: day and range selection over a merged record
//! - [`service`]: retry, staleness and caching policies at the caller boundary
//! - [`api`]: HTTP API handlers

pub mod aggregation;
pub mod api;
pub mod data_sources;
pub mod metrics;
pub mod model;
pub mod selection;
pub mod service;
pub mod units;
