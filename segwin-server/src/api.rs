// Segwin Server - HTTP API
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! HTTP routes.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /api/metrics?metric=&start=&end=` | Range aggregate for one metric |
//! | `GET /api/health` | Liveness probe |
//! | `GET /api/status` | Uptime and per-metric ingest counts |
//! | `GET /metrics` | Prometheus exposition |

use crate::error::ApiError;
use crate::metrics::{encode_metrics, record_query, QueryOutcome};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use segwin::{MetricRegistry, SegwinError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

/// Lookback used when the caller gives no `start`.
pub const DEFAULT_START_OFFSET: usize = 60;

/// Metric label for queries whose parameters failed to parse.
const UNPARSED_METRIC_LABEL: &str = "_unparsed";

/// Application state shared across handlers.
pub struct AppState {
    pub registry: Arc<MetricRegistry>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(registry: Arc<MetricRegistry>) -> Self {
        Self {
            registry,
            start_time: Instant::now(),
        }
    }
}

/// Build the router with permissive CORS for browser dashboards.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/metrics", get(metrics_query_handler))
        .route("/api/health", get(health_handler))
        .route("/api/status", get(status_handler))
        .route("/metrics", get(prometheus_handler))
        .layer(cors)
        .with_state(state)
}

/// Query string for `/api/metrics`.
#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    /// Metric name, e.g. `cpu`.
    pub metric: String,
    /// Older edge, in ticks ago.
    #[serde(default = "default_start")]
    pub start: usize,
    /// Newer edge, in ticks ago.
    #[serde(default)]
    pub end: usize,
}

fn default_start() -> usize {
    DEFAULT_START_OFFSET
}

/// Range aggregate response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub sum: f64,
    pub max: f64,
    pub min: f64,
    pub avg: f64,
}

/// Aggregate a lookback range of one metric.
pub async fn metrics_query_handler(
    State(state): State<Arc<AppState>>,
    params: Result<Query<MetricsQuery>, QueryRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => {
            debug!("rejected query string: {}", rejection.body_text());
            // No metric name to attribute it to
            record_query(UNPARSED_METRIC_LABEL, QueryOutcome::InvalidArgument);
            return Err(ApiError::from(rejection));
        }
    };

    debug!(
        "query metric={} start={} end={}",
        params.metric, params.start, params.end
    );

    match state
        .registry
        .query_range(&params.metric, params.start, params.end)
    {
        Ok(summary) => {
            record_query(&params.metric, QueryOutcome::Ok);
            Ok(Json(QueryResponse {
                sum: summary.sum,
                max: summary.max,
                min: summary.min,
                avg: summary.avg,
            }))
        }
        Err(e) => {
            let outcome = match e {
                SegwinError::UnknownMetric(_) => QueryOutcome::UnknownMetric,
                _ => QueryOutcome::InvalidArgument,
            };
            record_query(&params.metric, outcome);
            Err(ApiError::from(e))
        }
    }
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub tree_type: &'static str,
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        tree_type: "segment_tree",
    })
}

/// Per-metric status.
#[derive(Debug, Serialize)]
pub struct MetricStatus {
    pub name: String,
    pub samples_ingested: u64,
    pub warm: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<f64>,
}

/// Status information response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub version: String,
    pub engine_version: String,
    pub uptime_secs: u64,
    pub window_size: usize,
    pub metrics: Vec<MetricStatus>,
}

/// Status handler - returns JSON status information.
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let registry = &state.registry;
    let metrics = registry
        .names()
        .iter()
        .map(|name| {
            registry.with_engine(name, |engine| MetricStatus {
                name: name.clone(),
                samples_ingested: engine.samples_ingested(),
                warm: engine.is_warm(),
                latest: engine.latest(),
            })
        })
        .collect::<segwin::Result<Vec<_>>>()?;

    Ok(Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine_version: segwin::VERSION.to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        window_size: registry.window_size(),
        metrics,
    }))
}

/// Metrics handler - returns Prometheus text format.
pub async fn prometheus_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        encode_metrics(),
    )
}
