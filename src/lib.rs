//! # segwin - Segment-tree windowed metrics
//!
//! Fixed-capacity time-series aggregation: a circular window of the last `W`
//! samples with O(log W) ingest and O(log W) sum / max / min / average over
//! any lookback range.
//!
//! ## Key Features
//!
//! - **Generic merge tree**: array-backed segment tree over any associative
//!   merge with an identity element
//! - **Circular window**: the newest sample overwrites the oldest slot
//! - **Wraparound queries**: ranges crossing the end of the buffer are split
//!   in two and recombined
//! - **Registry**: one independently locked engine per metric name
//!
//! ## Quick Start
//!
//! ```rust
//! use segwin::{MetricRegistry, RegistryConfig};
//!
//! let registry = MetricRegistry::new(&RegistryConfig::default().window_size(60)).unwrap();
//!
//! // One sample per tick
//! registry.ingest("cpu", 42.0).unwrap();
//! registry.ingest("cpu", 58.0).unwrap();
//!
//! // Last two ticks: offsets 2 ("two ticks ago") to 1 ("most recent write")
//! let summary = registry.query_range("cpu", 2, 1).unwrap();
//! assert_eq!(summary.sum, 100.0);
//! assert_eq!(summary.max, 58.0);
//! assert_eq!(summary.avg, 50.0);
//!
//! // Unknown names are reported, not guessed
//! assert!(registry.query_range("disk", 1, 0).is_err());
//! ```
//!
//! ## Modules
//!
//! - [`tree`]: Associative merge tree and the `Sum` / `Max` / `Min` strategies
//! - [`engine`]: Circular window with three trees and lookback queries
//! - [`registry`]: Metric name to engine mapping with per-engine locking
//! - [`config`]: Window and registry configuration
//! - [`error`]: Error taxonomy

// Modules
pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod tree;

// Re-exports for convenient access
pub use config::{EngineConfig, RegistryConfig, DEFAULT_METRICS, DEFAULT_WINDOW_SIZE};
pub use engine::{MetricsEngine, RangeSummary};
pub use error::{Result, SegwinError, TreeError};
pub use registry::MetricRegistry;
pub use tree::{Max, Merge, MergeTree, Min, Sum};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
