//! Fixed-boundary histogram aggregation.
//!
//! Boundaries are chosen when the series is created and never change after
//! that. Raw per-bucket counts are stored; the Prometheus-style cumulative
//! view is derived on read so the two can never disagree.

use crate::error::{MetricsError, Result};
use crate::point::HistogramPoint;

/// Boundaries used when the deployment does not configure its own.
pub const DEFAULT_BOUNDARIES: [f64; 15] = [
    0.0, 5.0, 10.0, 25.0, 50.0, 75.0, 100.0, 250.0, 500.0, 750.0, 1_000.0, 2_500.0, 5_000.0,
    7_500.0, 10_000.0,
];

/// Check that a boundary list is non-empty, finite and strictly ascending.
pub fn validate_boundaries(boundaries: &[f64]) -> Result<()> {
    if boundaries.is_empty() {
        return Err(MetricsError::Config(
            "histogram boundaries must not be empty".into(),
        ));
    }
    if let Some(b) = boundaries.iter().find(|b| !b.is_finite()) {
        return Err(MetricsError::Config(format!(
            "histogram boundary must be finite: {b}"
        )));
    }
    if let Some(w) = boundaries.windows(2).find(|w| w[0] >= w[1]) {
        return Err(MetricsError::Config(format!(
            "histogram boundaries must be strictly ascending: {} >= {}",
            w[0], w[1]
        )));
    }
    Ok(())
}

/// Index of the first boundary `value` does not exceed, or `boundaries.len()`
/// for the +Inf bucket.
pub fn bucket_index(value: f64, boundaries: &[f64]) -> usize {
    boundaries.partition_point(|&b| b < value)
}

/// Running prefix sum of raw bucket counts.
pub fn cumulative_counts(bucket_counts: &[u64]) -> Vec<u64> {
    bucket_counts
        .iter()
        .scan(0u64, |acc, &c| {
            *acc += c;
            Some(*acc)
        })
        .collect()
}

/// Histogram state for one (metric, label-set) pair.
#[derive(Debug, Clone)]
pub struct Histogram {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    boundaries: Vec<f64>,
    bucket_counts: Vec<u64>,
}

impl Histogram {
    pub fn new(boundaries: Vec<f64>) -> Self {
        let buckets = boundaries.len() + 1;
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            boundaries,
            bucket_counts: vec![0; buckets],
        }
    }

    /// Record one observation. Returns the bucket it landed in.
    pub fn observe(&mut self, value: f64) -> usize {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let idx = bucket_index(value, &self.boundaries);
        self.bucket_counts[idx] += 1;
        idx
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    pub fn point(&self) -> HistogramPoint {
        HistogramPoint {
            count: self.count,
            sum: self.sum,
            min: self.min,
            max: self.max,
            boundaries: self.boundaries.clone(),
            bucket_counts: self.bucket_counts.clone(),
            cumulative_counts: cumulative_counts(&self.bucket_counts),
        }
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new(DEFAULT_BOUNDARIES.to_vec())
    }
}
