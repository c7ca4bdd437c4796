//! Metric registry
//!
//! Maps metric names to independently locked [`MetricsEngine`]s. The registry
//! is built once at startup and shared by reference (typically in an `Arc`)
//! between the producer and the query path.
//!
//! Each engine sits behind its own mutex, so an ingest and a query on the same
//! metric never interleave, while different metrics never contend.

use crate::config::RegistryConfig;
use crate::engine::{MetricsEngine, RangeSummary};
use crate::error::{Result, SegwinError};
use log::debug;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Named collection of metrics engines.
#[derive(Debug)]
pub struct MetricRegistry {
    engines: HashMap<String, Mutex<MetricsEngine>>,
    /// Registration order, for stable listings.
    names: Vec<String>,
    window_size: usize,
}

impl MetricRegistry {
    /// Create one engine per configured metric name.
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        if config.metrics.is_empty() {
            return Err(SegwinError::InvalidConfig(
                "at least one metric is required".to_string(),
            ));
        }

        let engine_config = config.engine_config();
        let mut engines = HashMap::with_capacity(config.metrics.len());
        let mut names = Vec::with_capacity(config.metrics.len());

        for name in &config.metrics {
            if name.is_empty() {
                return Err(SegwinError::InvalidConfig(
                    "metric names must not be empty".to_string(),
                ));
            }
            if engines.contains_key(name) {
                return Err(SegwinError::DuplicateMetric(name.clone()));
            }
            engines.insert(
                name.clone(),
                Mutex::new(MetricsEngine::with_config(&engine_config)?),
            );
            names.push(name.clone());
        }

        debug!(
            "metric registry created: metrics={:?}, window_size={}",
            names, config.window_size
        );

        Ok(Self {
            engines,
            names,
            window_size: config.window_size,
        })
    }

    /// Ingest one sample into the named metric.
    pub fn ingest(&self, metric: &str, value: f64) -> Result<()> {
        self.with_engine_mut(metric, |engine| engine.ingest(value))?
    }

    /// Aggregate a lookback range of the named metric.
    pub fn query_range(
        &self,
        metric: &str,
        start_offset: usize,
        end_offset: usize,
    ) -> Result<RangeSummary> {
        self.with_engine(metric, |engine| {
            engine.query_range(start_offset, end_offset)
        })?
    }

    /// Run `f` with shared access to the named engine, under its lock.
    pub fn with_engine<T>(&self, metric: &str, f: impl FnOnce(&MetricsEngine) -> T) -> Result<T> {
        let guard = self.lock(metric)?;
        Ok(f(&*guard))
    }

    /// Run `f` with exclusive access to the named engine, under its lock.
    pub fn with_engine_mut<T>(
        &self,
        metric: &str,
        f: impl FnOnce(&mut MetricsEngine) -> T,
    ) -> Result<T> {
        let mut guard = self.lock(metric)?;
        Ok(f(&mut *guard))
    }

    /// Metric names in registration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Check whether a metric is registered.
    pub fn contains(&self, metric: &str) -> bool {
        self.engines.contains_key(metric)
    }

    /// Number of registered metrics.
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Check if the registry is empty (never true for a constructed registry).
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Window size shared by every engine.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    fn lock(&self, metric: &str) -> Result<MutexGuard<'_, MetricsEngine>> {
        let engine = self
            .engines
            .get(metric)
            .ok_or_else(|| SegwinError::UnknownMetric(metric.to_string()))?;

        // Engines validate before mutating, so a poisoned lock still guards
        // a consistent buffer/cursor/tree tuple.
        Ok(engine.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
