//! Error types for segwin
//!
//! Every error here is a caller contract violation or a lookup miss.
//! Nothing is retried and nothing is silently clamped.

use thiserror::Error;

/// Result type alias for segwin operations
pub type Result<T> = std::result::Result<T, SegwinError>;

/// Main error type for segwin operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SegwinError {
    /// Merge tree contract violation
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    /// Lookback offsets outside the window or in the wrong order
    #[error(
        "Invalid offsets: start={start_offset}, end={end_offset} \
         (need end <= start < {window_size})"
    )]
    InvalidOffsets {
        start_offset: usize,
        end_offset: usize,
        window_size: usize,
    },

    /// Sample value is not a finite number (NaN, Inf)
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No engine registered under this name
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// Metric registered twice
    #[error("Metric already exists: {0}")]
    DuplicateMetric(String),
}

impl SegwinError {
    /// True for caller contract violations (bad index, range, offsets or value).
    ///
    /// Lookup misses and configuration problems are not argument errors.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            SegwinError::Tree(_) | SegwinError::InvalidOffsets { .. } | SegwinError::InvalidValue(_)
        )
    }
}

/// Errors raised by [`MergeTree`](crate::tree::MergeTree)
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// A tree needs at least one leaf
    #[error("Cannot build a tree over an empty sequence")]
    Empty,

    /// Point update outside `[0, len)`
    #[error("Index out of bounds: {index} (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Range query with `low > high` or `high >= len`
    #[error("Invalid range: [{low}, {high}] (len {len})")]
    InvalidRange { low: usize, high: usize, len: usize },
}
