//! Read-only point values handed out by registry snapshots.

use serde::Serialize;

/// Value of a Counter, UpDownCounter or Gauge series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SumPoint {
    pub value: f64,
    pub monotonic: bool,
}

/// Value of a Histogram series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramPoint {
    pub count: u64,
    pub sum: f64,
    /// `+inf` until the first observation.
    pub min: f64,
    /// `-inf` until the first observation.
    pub max: f64,
    pub boundaries: Vec<f64>,
    /// `boundaries.len() + 1` entries; the last one is the +Inf bucket.
    pub bucket_counts: Vec<u64>,
    /// Prefix sums of `bucket_counts`.
    pub cumulative_counts: Vec<u64>,
}

impl HistogramPoint {
    /// Observations at or below `boundaries[i]`, or `count` for the +Inf bucket.
    pub fn cumulative(&self, i: usize) -> u64 {
        self.cumulative_counts.get(i).copied().unwrap_or(self.count)
    }
}

/// Aggregated state of one (metric, label-set) pair.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregatedPoint {
    Sum(SumPoint),
    Histogram(HistogramPoint),
}
