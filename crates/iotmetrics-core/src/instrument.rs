//! Instrument kinds and their per-series aggregation rules.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::MetricsError;
use crate::histogram::Histogram;
use crate::point::{AggregatedPoint, SumPoint};

/// OpenTelemetry synchronous instrument kinds accepted by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentKind {
    Counter,
    UpDownCounter,
    Histogram,
    Gauge,
}

impl InstrumentKind {
    pub const ALL: [InstrumentKind; 4] = [
        InstrumentKind::Counter,
        InstrumentKind::UpDownCounter,
        InstrumentKind::Histogram,
        InstrumentKind::Gauge,
    ];

    /// Name used in submissions (`instrument_type`).
    pub fn as_str(self) -> &'static str {
        match self {
            InstrumentKind::Counter => "counter",
            InstrumentKind::UpDownCounter => "updowncounter",
            InstrumentKind::Histogram => "histogram",
            InstrumentKind::Gauge => "gauge",
        }
    }

    /// Prometheus `# TYPE` for this kind.
    pub fn prom_type(self) -> &'static str {
        match self {
            InstrumentKind::Counter => "counter",
            InstrumentKind::UpDownCounter | InstrumentKind::Gauge => "gauge",
            InstrumentKind::Histogram => "histogram",
        }
    }

    /// Label names the exposition writes itself for this kind.
    pub fn reserved_labels(self) -> &'static [&'static str] {
        match self {
            InstrumentKind::Histogram => &["le"],
            _ => &[],
        }
    }

    /// Short human description shown by the listing endpoint.
    pub fn semantic(self) -> &'static str {
        match self {
            InstrumentKind::Counter => "monotonically_increasing",
            InstrumentKind::UpDownCounter => "accumulates_can_increase_decrease",
            InstrumentKind::Histogram => "value_distribution",
            InstrumentKind::Gauge => "absolute_value",
        }
    }
}

impl fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstrumentKind {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstrumentKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| MetricsError::UnsupportedInstrument(s.to_string()))
    }
}

/// Per-series aggregation capability.
pub trait Aggregator {
    /// Fold one submitted value into the series.
    fn record(&mut self, value: f64);
    /// Current aggregated value.
    fn point(&self) -> AggregatedPoint;
}

/// Monotonic running total.
#[derive(Debug, Clone, Default)]
pub struct Counter {
    total: f64,
}

impl Aggregator for Counter {
    fn record(&mut self, value: f64) {
        // Negative increments are rejected before they get here.
        self.total += value.max(0.0);
    }

    fn point(&self) -> AggregatedPoint {
        AggregatedPoint::Sum(SumPoint { value: self.total, monotonic: true })
    }
}

/// Running sum of signed deltas.
#[derive(Debug, Clone, Default)]
pub struct UpDownCounter {
    total: f64,
}

impl Aggregator for UpDownCounter {
    fn record(&mut self, value: f64) {
        self.total += value;
    }

    fn point(&self) -> AggregatedPoint {
        AggregatedPoint::Sum(SumPoint { value: self.total, monotonic: false })
    }
}

/// Last submitted absolute value.
#[derive(Debug, Clone, Default)]
pub struct Gauge {
    last: f64,
}

impl Aggregator for Gauge {
    fn record(&mut self, value: f64) {
        self.last = value;
    }

    fn point(&self) -> AggregatedPoint {
        AggregatedPoint::Sum(SumPoint { value: self.last, monotonic: false })
    }
}

impl Aggregator for Histogram {
    fn record(&mut self, value: f64) {
        self.observe(value);
    }

    fn point(&self) -> AggregatedPoint {
        AggregatedPoint::Histogram(Histogram::point(self))
    }
}

/// Stored state for one (metric, label-set), selected by the metric's kind.
#[derive(Debug, Clone)]
pub enum Series {
    Counter(Counter),
    UpDownCounter(UpDownCounter),
    Gauge(Gauge),
    Histogram(Histogram),
}

impl Series {
    /// Fresh series for `kind`. Histograms copy `boundaries`.
    pub fn new(kind: InstrumentKind, boundaries: &[f64]) -> Self {
        match kind {
            InstrumentKind::Counter => Series::Counter(Counter::default()),
            InstrumentKind::UpDownCounter => Series::UpDownCounter(UpDownCounter::default()),
            InstrumentKind::Gauge => Series::Gauge(Gauge::default()),
            InstrumentKind::Histogram => Series::Histogram(Histogram::new(boundaries.to_vec())),
        }
    }

    fn aggregator(&self) -> &dyn Aggregator {
        match self {
            Series::Counter(a) => a,
            Series::UpDownCounter(a) => a,
            Series::Gauge(a) => a,
            Series::Histogram(a) => a,
        }
    }

    fn aggregator_mut(&mut self) -> &mut dyn Aggregator {
        match self {
            Series::Counter(a) => a,
            Series::UpDownCounter(a) => a,
            Series::Gauge(a) => a,
            Series::Histogram(a) => a,
        }
    }
}

impl Aggregator for Series {
    fn record(&mut self, value: f64) {
        self.aggregator_mut().record(value);
    }

    fn point(&self) -> AggregatedPoint {
        self.aggregator().point()
    }
}
