//! Windowed metrics engine
//!
//! A fixed-capacity circular buffer of raw samples with three merge trees
//! (sum, max, min) kept over the same slots. Every [`MetricsEngine::ingest`]
//! writes the slot under the cursor, updates all three trees at that index and
//! advances the cursor, so the trees never disagree with the buffer.
//!
//! Ranges are addressed by lookback offsets rather than timestamps. Offset `k`
//! designates slot `(cursor - k) mod W`; the engine assumes exactly one ingest
//! per tick and has no notion of wall-clock time.
//!
//! ```rust
//! use segwin::MetricsEngine;
//!
//! let mut engine = MetricsEngine::new(4).unwrap();
//! for value in [10.0, 20.0, 30.0, 40.0] {
//!     engine.ingest(value).unwrap();
//! }
//!
//! let summary = engine.query_range(3, 0).unwrap();
//! assert_eq!(summary.sum, 100.0);
//! assert_eq!(summary.avg, 25.0);
//! ```

use crate::config::EngineConfig;
use crate::error::{Result, SegwinError};
use crate::tree::{Max, Merge, MergeTree, Min, Sum};
use log::{debug, trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Aggregates over a range of window slots.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangeSummary {
    pub sum: f64,
    pub max: f64,
    pub min: f64,
    /// `sum / count`, or 0 when nothing is covered.
    pub avg: f64,
    /// Number of slots covered.
    pub count: usize,
}

impl RangeSummary {
    fn new(sum: f64, max: f64, min: f64, count: usize) -> Self {
        let avg = if count > 0 { sum / count as f64 } else { 0.0 };
        Self {
            sum,
            max,
            min,
            avg,
            count,
        }
    }

    /// Combine two disjoint segments of the window.
    fn combine(&self, other: &RangeSummary) -> RangeSummary {
        RangeSummary::new(
            Sum::merge(&self.sum, &other.sum),
            Max::merge(&self.max, &other.max),
            Min::merge(&self.min, &other.min),
            self.count + other.count,
        )
    }
}

/// Circular window of samples with O(log W) ingest and range aggregation.
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    window_size: usize,
    buffer: Vec<f64>,
    /// Next slot to overwrite.
    cursor: usize,
    /// Total accepted ingests.
    ingested: u64,
    sums: MergeTree<Sum>,
    maxima: MergeTree<Max>,
    minima: MergeTree<Min>,
}

impl MetricsEngine {
    /// Value every slot holds before its first write.
    pub const INITIAL_VALUE: f64 = 0.0;

    /// Create an engine holding `window_size` samples.
    pub fn new(window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(SegwinError::InvalidConfig(
                "window_size must be at least 1".to_string(),
            ));
        }

        let buffer = vec![Self::INITIAL_VALUE; window_size];
        let engine = Self {
            window_size,
            sums: MergeTree::new(&buffer)?,
            maxima: MergeTree::new(&buffer)?,
            minima: MergeTree::new(&buffer)?,
            buffer,
            cursor: 0,
            ingested: 0,
        };

        debug!("metrics engine created: window_size={}", window_size);
        Ok(engine)
    }

    /// Create an engine from a configuration.
    pub fn with_config(config: &EngineConfig) -> Result<Self> {
        Self::new(config.window_size)
    }

    /// Overwrite the slot under the cursor with `value` and advance the cursor.
    ///
    /// Non-finite values are rejected before anything is mutated.
    pub fn ingest(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            warn!("rejected non-finite sample: {}", value);
            return Err(SegwinError::InvalidValue(value.to_string()));
        }

        let slot = self.cursor;
        self.buffer[slot] = value;
        self.sums.update(slot, value)?;
        self.maxima.update(slot, value)?;
        self.minima.update(slot, value)?;

        self.cursor = (slot + 1) % self.window_size;
        self.ingested += 1;
        Ok(())
    }

    /// Aggregate the slots between `start_offset` (older edge) and
    /// `end_offset` (newer edge), both inclusive.
    ///
    /// Requires `end_offset <= start_offset < window_size`.
    pub fn query_range(&self, start_offset: usize, end_offset: usize) -> Result<RangeSummary> {
        let (start_idx, end_idx) = self.resolve(start_offset, end_offset)?;

        if start_idx <= end_idx {
            return self.segment(start_idx, end_idx);
        }

        // Range crosses the end of the buffer: [start, W-1] then [0, end]
        trace!(
            "wraparound query: [{}, {}] + [0, {}]",
            start_idx,
            self.window_size - 1,
            end_idx
        );
        let tail = self.segment(start_idx, self.window_size - 1)?;
        let head = self.segment(0, end_idx)?;
        Ok(tail.combine(&head))
    }

    /// Copy of the slots [`query_range`](Self::query_range) would cover,
    /// oldest first.
    pub fn window_snapshot(&self, start_offset: usize, end_offset: usize) -> Result<Vec<f64>> {
        let (start_idx, _) = self.resolve(start_offset, end_offset)?;
        let count = start_offset - end_offset + 1;

        Ok((0..count)
            .map(|k| self.buffer[(start_idx + k) % self.window_size])
            .collect())
    }

    /// Window capacity in samples.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Next slot to be overwritten.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total samples accepted since creation.
    pub fn samples_ingested(&self) -> u64 {
        self.ingested
    }

    /// True once every initial slot has been overwritten.
    pub fn is_warm(&self) -> bool {
        self.ingested >= self.window_size as u64
    }

    /// Most recently ingested value.
    pub fn latest(&self) -> Option<f64> {
        if self.ingested == 0 {
            return None;
        }
        let slot = (self.cursor + self.window_size - 1) % self.window_size;
        Some(self.buffer[slot])
    }

    /// Map lookback offsets to absolute slot indices.
    fn resolve(&self, start_offset: usize, end_offset: usize) -> Result<(usize, usize)> {
        if start_offset >= self.window_size || end_offset > start_offset {
            return Err(SegwinError::InvalidOffsets {
                start_offset,
                end_offset,
                window_size: self.window_size,
            });
        }

        let w = self.window_size;
        let start_idx = (self.cursor + w - start_offset) % w;
        let end_idx = (self.cursor + w - end_offset) % w;
        Ok((start_idx, end_idx))
    }

    /// Aggregate a contiguous, non-wrapping slot range.
    fn segment(&self, low: usize, high: usize) -> Result<RangeSummary> {
        Ok(RangeSummary::new(
            self.sums.query(low, high)?,
            self.maxima.query(low, high)?,
            self.minima.query(low, high)?,
            high - low + 1,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn engine_with(window_size: usize, values: &[f64]) -> MetricsEngine {
        let mut engine = MetricsEngine::new(window_size).unwrap();
        for &v in values {
            engine.ingest(v).unwrap();
        }
        engine
    }

    #[test]
    fn test_engine_new() {
        let engine = MetricsEngine::new(60).unwrap();
        assert_eq!(engine.window_size(), 60);
        assert_eq!(engine.cursor(), 0);
        assert_eq!(engine.samples_ingested(), 0);
        assert!(!engine.is_warm());
        assert_eq!(engine.latest(), None);
    }

    #[test]
    fn test_engine_zero_window() {
        let err = MetricsEngine::new(0).unwrap_err();
        assert!(matches!(err, SegwinError::InvalidConfig(_)));
    }

    #[test]
    fn test_engine_initial_window_is_zero() {
        let engine = MetricsEngine::new(10).unwrap();
        let summary = engine.query_range(9, 0).unwrap();
        assert_eq!(summary.sum, 0.0);
        assert_eq!(summary.max, 0.0);
        assert_eq!(summary.min, 0.0);
        assert_eq!(summary.count, 10);
    }

    #[test]
    fn test_engine_cursor_wraps() {
        let engine = engine_with(3, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(engine.cursor(), 1);
        assert_eq!(engine.samples_ingested(), 4);
        assert_eq!(engine.latest(), Some(4.0));
        assert!(engine.is_warm());
    }

    #[test]
    fn test_engine_full_window_then_overwrite() {
        let mut engine = engine_with(4, &[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(engine.cursor(), 0);

        let full = engine.query_range(3, 0).unwrap();
        assert_eq!(full.sum, 100.0);
        assert_eq!(full.max, 40.0);
        assert_eq!(full.min, 10.0);
        assert_relative_eq!(full.avg, 25.0);

        engine.ingest(5.0).unwrap();
        assert_eq!(engine.cursor(), 1);

        let full = engine.query_range(3, 0).unwrap();
        assert_eq!(full.sum, 95.0);
        assert_eq!(full.max, 40.0);
        assert_eq!(full.min, 5.0);
        assert_relative_eq!(full.avg, 23.75);
        assert_eq!(full.count, 4);
    }

    #[test]
    fn test_engine_non_wrapping_range() {
        // cursor = 3; offset 3 -> slot 0, offset 1 -> slot 2
        let engine = engine_with(6, &[1.0, 2.0, 3.0]);
        let summary = engine.query_range(3, 1).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.sum, 6.0);
        assert_eq!(summary.max, 3.0);
        assert_eq!(summary.min, 1.0);
        assert_relative_eq!(summary.avg, 2.0);
    }

    #[test]
    fn test_engine_wrapping_range() {
        // cursor = 1; offset 3 -> slot 3, offset 0 -> slot 1
        let engine = engine_with(5, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(engine.cursor(), 1);

        let summary = engine.query_range(3, 0).unwrap();
        // slots 3, 4, 0, 1 -> 4, 5, 6, 2
        assert_eq!(summary.count, 4);
        assert_eq!(summary.sum, 17.0);
        assert_eq!(summary.max, 6.0);
        assert_eq!(summary.min, 2.0);
        assert_eq!(engine.window_snapshot(3, 0).unwrap(), vec![4.0, 5.0, 6.0, 2.0]);
    }

    #[test]
    fn test_engine_single_offset() {
        let engine = engine_with(8, &[7.0, 8.0, 9.0]);
        let summary = engine.query_range(1, 1).unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.sum, 9.0);
        assert_eq!(summary.avg, 9.0);
    }

    #[test]
    fn test_engine_window_of_one() {
        let mut engine = MetricsEngine::new(1).unwrap();
        for v in [3.0, -4.0, 12.5] {
            engine.ingest(v).unwrap();
            let summary = engine.query_range(0, 0).unwrap();
            assert_eq!(summary.count, 1);
            assert_eq!(summary.sum, v);
            assert_eq!(summary.max, v);
            assert_eq!(summary.min, v);
            assert_eq!(summary.avg, v);
        }
        assert_eq!(engine.cursor(), 0);
    }

    #[test]
    fn test_engine_invalid_offsets() {
        let engine = MetricsEngine::new(10).unwrap();

        // newer edge older than the older edge
        let err = engine.query_range(2, 5).unwrap_err();
        assert!(matches!(err, SegwinError::InvalidOffsets { .. }));

        // older edge outside the window
        let err = engine.query_range(10, 0).unwrap_err();
        assert!(matches!(
            err,
            SegwinError::InvalidOffsets {
                start_offset: 10,
                end_offset: 0,
                window_size: 10
            }
        ));
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_engine_rejects_non_finite() {
        let mut engine = engine_with(4, &[1.0]);
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = engine.ingest(bad).unwrap_err();
            assert!(matches!(err, SegwinError::InvalidValue(_)));
        }
        assert_eq!(engine.cursor(), 1);
        assert_eq!(engine.samples_ingested(), 1);
        assert_eq!(engine.query_range(3, 0).unwrap().sum, 1.0);
    }

    #[test]
    fn test_engine_with_config() {
        let engine = MetricsEngine::with_config(&EngineConfig::with_window_size(12)).unwrap();
        assert_eq!(engine.window_size(), 12);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_range_summary_serializes() {
        let engine = engine_with(2, &[1.0, 3.0]);
        let json = serde_json::to_value(engine.query_range(1, 0).unwrap()).unwrap();
        assert_eq!(json["sum"], 4.0);
        assert_eq!(json["avg"], 2.0);
        assert_eq!(json["count"], 2);
    }

    #[test]
    fn test_range_summary_empty_avg() {
        let summary = RangeSummary::new(0.0, Max::identity(), Min::identity(), 0);
        assert_eq!(summary.avg, 0.0);
    }
}
