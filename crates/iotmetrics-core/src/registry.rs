//! In-memory instrument registry.
//!
//! Families are stored in a `DashMap` keyed by their sanitized (exported)
//! metric name. The shard lock held through `entry()` covers the family's
//! descriptor and every series in it, so a `record` is applied in full
//! before any reader or other writer on the same family can see it.
//! Families on different shards update in parallel.
//!
//! Each family also tracks the sanitized label identity of its series, so no
//! two submissions can end up as the same exposition family or sample line.

use std::collections::{BTreeMap, BTreeSet};

use dashmap::DashMap;
use serde::Serialize;

use crate::error::{MetricsError, Result};
use crate::exposition::sanitize_metric_name;
use crate::histogram::{validate_boundaries, DEFAULT_BOUNDARIES};
use crate::instrument::{Aggregator, InstrumentKind, Series};
use crate::labels::LabelSet;
use crate::point::AggregatedPoint;

/// Name, kind and metadata of one instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: String,
    pub kind: InstrumentKind,
    pub unit: String,
    pub description: String,
}

#[derive(Debug)]
struct SeriesEntry {
    labels: LabelSet,
    series: Series,
}

#[derive(Debug)]
struct Family {
    descriptor: MetricDescriptor,
    /// Label key -> series, in label key order.
    series: BTreeMap<String, SeriesEntry>,
    /// Sanitized label identities of the series above.
    exposed: BTreeSet<String>,
    /// Label key touched by the most recent record.
    last_key: String,
}

impl Family {
    fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            descriptor: self.descriptor.clone(),
            series: self
                .series
                .iter()
                .map(|(key, e)| SeriesSnapshot {
                    key: key.clone(),
                    labels: e.labels.clone(),
                    point: e.series.point(),
                })
                .collect(),
        }
    }
}

/// One series inside a [`MetricSnapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSnapshot {
    pub key: String,
    pub labels: LabelSet,
    pub point: AggregatedPoint,
}

/// Copy of one metric family taken under its lock.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSnapshot {
    pub descriptor: MetricDescriptor,
    pub series: Vec<SeriesSnapshot>,
}

impl MetricSnapshot {
    /// Series for the given label set, if one was recorded.
    pub fn get(&self, labels: &LabelSet) -> Option<&AggregatedPoint> {
        let key = labels.key();
        self.series.iter().find(|s| s.key == key).map(|s| &s.point)
    }
}

/// Listing summary for one metric.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSummary {
    pub instrument_type: InstrumentKind,
    pub description: String,
    pub unit: String,
    pub semantic: &'static str,
    pub series: usize,
    /// Sum-kind value, or histogram sum, of the most recently updated series.
    pub value: f64,
    /// Observation count for histograms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

/// Registered instrument totals per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InstrumentCounts {
    pub counters: usize,
    pub updowncounters: usize,
    pub histograms: usize,
    pub gauges: usize,
}

/// Process-lifetime store of all aggregated metric state.
pub struct Registry {
    families: DashMap<String, Family>,
    boundaries: Vec<f64>,
}

impl Registry {
    /// Registry whose histograms use `boundaries`.
    pub fn new(boundaries: Vec<f64>) -> Result<Self> {
        validate_boundaries(&boundaries)?;
        Ok(Self {
            families: DashMap::new(),
            boundaries,
        })
    }

    pub fn histogram_boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    /// Fold one measurement into the (name, labels) series.
    ///
    /// `unit` and `description` replace the stored ones when given.
    /// Fails with [`MetricsError::KindMismatch`] if `name` already belongs to
    /// another kind, with [`MetricsError::NameCollision`] if another metric
    /// exports under the same sanitized name, and with a validation error
    /// if the labels clash after sanitization. The existing family is left
    /// untouched in every case.
    pub fn record(
        &self,
        name: &str,
        kind: InstrumentKind,
        value: f64,
        labels: &LabelSet,
        unit: Option<&str>,
        description: Option<&str>,
    ) -> Result<()> {
        labels.check_names(kind.reserved_labels())?;

        let exported = sanitize_metric_name(name);
        let mut family = self
            .families
            .entry(exported.clone())
            .or_insert_with(|| Family {
                descriptor: MetricDescriptor {
                    name: name.to_string(),
                    kind,
                    unit: String::new(),
                    description: String::new(),
                },
                series: BTreeMap::new(),
                exposed: BTreeSet::new(),
                last_key: String::new(),
            });

        if family.descriptor.name != name {
            return Err(MetricsError::NameCollision {
                name: name.to_string(),
                existing: family.descriptor.name.clone(),
                exported,
            });
        }
        if family.descriptor.kind != kind {
            return Err(MetricsError::KindMismatch {
                name: name.to_string(),
                existing: family.descriptor.kind,
                requested: kind,
            });
        }

        let key = labels.key();
        if !family.series.contains_key(&key) && !family.exposed.insert(labels.exposed_key()) {
            return Err(MetricsError::Validation(format!(
                "attributes of {name} export the same labels as an existing series"
            )));
        }

        if let Some(unit) = unit {
            family.descriptor.unit = unit.to_string();
        }
        if let Some(description) = description {
            family.descriptor.description = description.to_string();
        }

        let entry = family.series.entry(key.clone()).or_insert_with(|| {
            tracing::debug!(metric = %name, kind = %kind, labels = %key, "new series");
            SeriesEntry {
                labels: labels.clone(),
                series: Series::new(kind, &self.boundaries),
            }
        });
        entry.series.record(value);
        family.last_key = key;
        Ok(())
    }

    /// Per-family consistent copy of every metric, ordered by name.
    pub fn snapshot(&self) -> Vec<MetricSnapshot> {
        let mut out: Vec<MetricSnapshot> = self
            .families
            .iter()
            .map(|r| r.value().snapshot())
            .collect();
        out.sort_by(|a, b| a.descriptor.name.cmp(&b.descriptor.name));
        out
    }

    /// Snapshot of a single metric.
    pub fn get(&self, name: &str) -> Option<MetricSnapshot> {
        self.families
            .get(&sanitize_metric_name(name))
            .filter(|r| r.value().descriptor.name == name)
            .map(|r| r.value().snapshot())
    }

    /// Introspection summary per metric name.
    pub fn list(&self) -> BTreeMap<String, MetricSummary> {
        self.families
            .iter()
            .map(|r| {
                let family = r.value();
                let d = &family.descriptor;
                let latest = family
                    .series
                    .get(&family.last_key)
                    .map(|e| e.series.point());
                let (value, count) = match latest {
                    Some(AggregatedPoint::Sum(p)) => (p.value, None),
                    Some(AggregatedPoint::Histogram(h)) => (h.sum, Some(h.count)),
                    None => (0.0, None),
                };
                let summary = MetricSummary {
                    instrument_type: d.kind,
                    description: d.description.clone(),
                    unit: d.unit.clone(),
                    semantic: d.kind.semantic(),
                    series: family.series.len(),
                    value,
                    count,
                };
                (d.name.clone(), summary)
            })
            .collect()
    }

    /// Number of registered metrics per instrument kind.
    pub fn stats(&self) -> InstrumentCounts {
        let mut counts = InstrumentCounts::default();
        for r in self.families.iter() {
            match r.value().descriptor.kind {
                InstrumentKind::Counter => counts.counters += 1,
                InstrumentKind::UpDownCounter => counts.updowncounters += 1,
                InstrumentKind::Histogram => counts.histograms += 1,
                InstrumentKind::Gauge => counts.gauges += 1,
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            families: DashMap::new(),
            boundaries: DEFAULT_BOUNDARIES.to_vec(),
        }
    }
}
