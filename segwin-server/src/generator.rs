// Segwin Server - Synthetic sample producer
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Synthetic producer feeding one sample per metric per tick.
//!
//! The engines assume exactly one ingest per tick, so the producer runs on a
//! fixed interval and skips missed ticks instead of bursting to catch up.

use crate::metrics::record_ingest;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use segwin::MetricRegistry;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Value distribution for one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueProfile {
    /// Uniform real value in `[low, high)`.
    Uniform { low: f64, high: f64 },
    /// Uniform integer in `[low, high]`.
    Integer { low: i64, high: i64 },
}

impl ValueProfile {
    /// Profile for a well-known metric name.
    pub fn for_metric(name: &str) -> Self {
        match name {
            "cpu" => ValueProfile::Uniform {
                low: 20.0,
                high: 80.0,
            },
            "memory" => ValueProfile::Uniform {
                low: 30.0,
                high: 90.0,
            },
            "requests" => ValueProfile::Integer {
                low: 100,
                high: 1000,
            },
            _ => ValueProfile::Uniform {
                low: 0.0,
                high: 100.0,
            },
        }
    }

    /// Draw one sample.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            ValueProfile::Uniform { low, high } => rng.gen_range(low..high),
            ValueProfile::Integer { low, high } => rng.gen_range(low..=high) as f64,
        }
    }
}

/// Configuration for the producer.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Tick length in milliseconds.
    pub tick_ms: u64,
    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            seed: None,
        }
    }
}

/// Shared producer state.
#[derive(Debug, Default)]
pub struct GeneratorState {
    /// Ticks completed.
    pub ticks: AtomicU64,
    /// Whether the producer loop is running.
    pub running: AtomicBool,
}

/// Periodic producer writing into every registered metric.
pub struct Generator {
    registry: Arc<MetricRegistry>,
    profiles: Vec<(String, ValueProfile)>,
    config: GeneratorConfig,
    state: Arc<GeneratorState>,
}

impl Generator {
    pub fn new(registry: Arc<MetricRegistry>, config: GeneratorConfig) -> Self {
        let profiles = registry
            .names()
            .iter()
            .map(|name| (name.clone(), ValueProfile::for_metric(name)))
            .collect();

        Self {
            registry,
            profiles,
            config,
            state: Arc::new(GeneratorState::default()),
        }
    }

    /// Get the producer state.
    pub fn state(&self) -> Arc<GeneratorState> {
        Arc::clone(&self.state)
    }

    /// Ingest one sample into every metric. Returns the number accepted.
    pub fn tick<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let mut accepted = 0;
        for (name, profile) in &self.profiles {
            let value = profile.sample(rng);
            match self.registry.ingest(name, value) {
                Ok(()) => {
                    record_ingest(name, value);
                    accepted += 1;
                }
                Err(e) => warn!("Failed to ingest into {}: {}", name, e),
            }
        }
        self.state.ticks.fetch_add(1, Ordering::SeqCst);
        accepted
    }

    /// Run the producer loop until stopped.
    pub async fn run(self) {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut ticker = interval(Duration::from_millis(self.config.tick_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.state.running.store(true, Ordering::SeqCst);
        info!(
            "Starting producer: {} metrics, tick={}ms",
            self.profiles.len(),
            self.config.tick_ms
        );

        while self.state.running.load(Ordering::SeqCst) {
            ticker.tick().await;
            let accepted = self.tick(&mut rng);
            debug!(
                "tick {}: {} samples ingested",
                self.state.ticks.load(Ordering::SeqCst),
                accepted
            );
        }

        info!("Producer stopped");
    }
}
