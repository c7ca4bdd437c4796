// Segwin Server - Prometheus metrics definitions
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Prometheus metrics for the segwin server.
//!
//! Tracks what flows through the engines: samples ingested, the latest value
//! per metric, and query outcomes.

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge_vec, CounterVec, Encoder, GaugeVec, TextEncoder,
};

lazy_static! {
    /// Samples accepted per metric.
    pub static ref SAMPLES_INGESTED: CounterVec = register_counter_vec!(
        "segwin_samples_ingested_total",
        "Samples ingested into the window, per metric",
        &["metric"]
    ).unwrap();

    /// Most recent sample per metric.
    pub static ref LATEST_VALUE: GaugeVec = register_gauge_vec!(
        "segwin_latest_value",
        "Most recently ingested sample, per metric",
        &["metric"]
    ).unwrap();

    /// Range queries served, by outcome.
    pub static ref QUERIES: CounterVec = register_counter_vec!(
        "segwin_queries_total",
        "Range queries served, per metric and outcome",
        &["metric", "outcome"]
    ).unwrap();
}

/// Outcome label for a range query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    Ok,
    UnknownMetric,
    InvalidArgument,
}

impl QueryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOutcome::Ok => "ok",
            QueryOutcome::UnknownMetric => "unknown_metric",
            QueryOutcome::InvalidArgument => "invalid_argument",
        }
    }
}

/// Record an accepted sample.
pub fn record_ingest(metric: &str, value: f64) {
    SAMPLES_INGESTED.with_label_values(&[metric]).inc();
    LATEST_VALUE.with_label_values(&[metric]).set(value);
}

/// Record a served query.
///
/// Unknown names are folded into one label value to keep cardinality bounded.
pub fn record_query(metric: &str, outcome: QueryOutcome) {
    let label = match outcome {
        QueryOutcome::UnknownMetric => "_unknown",
        _ => metric,
    };
    QUERIES.with_label_values(&[label, outcome.as_str()]).inc();
}

/// Encode all registered metrics in Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
