// Segwin Server - HTTP front end for segwin windowed metrics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Segwin Server
//!
//! Serves range aggregates over the last hour of per-second samples, fed by a
//! synthetic producer.
//!
//! ## Usage
//!
//! ```bash
//! # Defaults: port 8000, one-hour window, cpu/memory/requests
//! segwin-server
//!
//! # Custom metrics, five-minute window, reproducible samples
//! segwin-server --metric disk --metric net --window-size 300 --seed 42
//!
//! # Last ten minutes of cpu
//! curl 'http://localhost:8000/api/metrics?metric=cpu&start=600&end=0'
//! ```

mod api;
mod error;
mod generator;
mod metrics;

use api::{create_router, AppState};
use clap::Parser;
use error::ServerError;
use generator::{Generator, GeneratorConfig};
use segwin::{MetricRegistry, RegistryConfig, DEFAULT_METRICS, DEFAULT_WINDOW_SIZE};
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Segwin metrics server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Window capacity in samples (one per tick)
    #[arg(short, long, default_value_t = DEFAULT_WINDOW_SIZE)]
    window_size: usize,

    /// Tick length in milliseconds
    #[arg(short, long, default_value = "1000")]
    tick_ms: u64,

    /// Metric name to serve (repeatable)
    #[arg(short, long = "metric")]
    metrics: Vec<String>,

    /// Random seed for the synthetic producer
    #[arg(long)]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn registry_config(&self) -> RegistryConfig {
        let config = if self.metrics.is_empty() {
            RegistryConfig::with_metrics(DEFAULT_METRICS)
        } else {
            RegistryConfig::with_metrics(self.metrics.iter().cloned())
        };
        config.window_size(self.window_size)
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Segwin Server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), ServerError> {
    let registry = Arc::new(MetricRegistry::new(&args.registry_config())?);
    info!(
        "Serving {} metrics {:?}, window={} samples",
        registry.len(),
        registry.names(),
        registry.window_size()
    );

    // Start producer in background
    let generator = Generator::new(
        Arc::clone(&registry),
        GeneratorConfig {
            tick_ms: args.tick_ms,
            seed: args.seed,
        },
    );
    let producer_state = generator.state();
    let producer = tokio::spawn(generator.run());

    let app = create_router(Arc::new(AppState::new(registry)));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting server on http://{}", addr);
    info!("Query endpoint: http://{}/api/metrics?metric=cpu&start=60&end=0", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Window contents are discarded on exit
    producer_state.running.store(false, Ordering::SeqCst);
    producer.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
