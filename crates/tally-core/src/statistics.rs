//! Immutable statistics snapshots and control-plane descriptors.
//!
//! These types are produced by drain-and-reset collection and consumed by
//! reporting sinks. Once created they never change.

use serde::{Deserialize, Serialize};

use crate::name::MetricName;

/// Snapshot of one accumulator over a collection interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueStatistics {
    /// Epoch milliseconds at which the interval began accumulating.
    pub start_time: u64,
    /// Events recorded since the interval began.
    pub count: u64,
    /// Sum of all recorded values.
    pub total: u64,
    /// Largest single recorded value.
    pub max: u64,
}

impl ValueStatistics {
    /// Create a snapshot.
    pub fn new(start_time: u64, count: u64, total: u64, max: u64) -> Self {
        Self {
            start_time,
            count,
            total,
            max,
        }
    }

    /// An empty snapshot for an interval that saw no events.
    pub fn empty(start_time: u64) -> Self {
        Self::new(start_time, 0, 0, 0)
    }

    /// Mean value, rounded to the nearest integer; 0 when no events.
    pub fn mean(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            (self.total + self.count / 2) / self.count
        }
    }

    /// True when the interval saw no events.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Seconds covered by this interval relative to the collection time.
    pub fn duration_secs(&self, collected_at: u64) -> u64 {
        collected_at.saturating_sub(self.start_time) / 1000
    }
}

/// Success/error statistics pair drained from a timed metric.
///
/// When only one half saw events the other half is still present (empty);
/// reporters suppress whole metrics, not halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedStatistics {
    /// Statistics for operations that completed normally.
    pub success: ValueStatistics,
    /// Statistics for operations that failed.
    pub error: ValueStatistics,
}

impl TimedStatistics {
    /// Create a success/error pair.
    pub fn new(success: ValueStatistics, error: ValueStatistics) -> Self {
        Self { success, error }
    }

    /// True when neither half saw any events.
    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.error.is_empty()
    }
}

/// Statistics for one metric, tagged by metric kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricStatistics {
    /// Single-accumulator value metric.
    Value(ValueStatistics),
    /// Paired success/error timed metric.
    Timed(TimedStatistics),
}

impl MetricStatistics {
    /// True when the underlying statistics saw no events.
    pub fn is_empty(&self) -> bool {
        match self {
            MetricStatistics::Value(stats) => stats.is_empty(),
            MetricStatistics::Timed(stats) => stats.is_empty(),
        }
    }
}

/// One drained metric: its name plus the interval statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    /// The metric's registered name.
    pub name: MetricName,
    /// The drained statistics.
    pub statistics: MetricStatistics,
}

impl MetricSnapshot {
    /// Create a snapshot entry.
    pub fn new(name: MetricName, statistics: MetricStatistics) -> Self {
        Self { name, statistics }
    }
}

/// Control-plane descriptor for a timed metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingMetricInfo {
    /// The metric's name in string form.
    pub name: String,
    /// The metric's current collection depth.
    pub collection_depth: u64,
}

impl TimingMetricInfo {
    /// Create a descriptor.
    pub fn new(name: impl Into<String>, collection_depth: u64) -> Self {
        Self {
            name: name.into(),
            collection_depth,
        }
    }
}
