//! The reporter contract and the batch shape handed to sinks.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tally_core::MetricSnapshot;

use crate::error::ReportError;

/// One collection interval's worth of drained snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportBatch {
    /// Epoch milliseconds at which the interval was drained.
    pub collected_at: u64,
    /// The drained snapshots, ordered by metric name.
    pub snapshots: Vec<MetricSnapshot>,
}

impl ReportBatch {
    /// Create a batch with an explicit collection time.
    pub fn new(collected_at: u64, snapshots: Vec<MetricSnapshot>) -> Self {
        Self {
            collected_at,
            snapshots,
        }
    }

    /// Create a batch collected now.
    pub fn now(snapshots: Vec<MetricSnapshot>) -> Self {
        Self::new(Utc::now().timestamp_millis() as u64, snapshots)
    }

    /// True when the interval drained nothing.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// A sink consuming drained snapshot batches.
///
/// Implementations are owned by the report manager, which delivers each
/// batch to every configured reporter in order and logs (rather than
/// propagates) individual failures.
pub trait Reporter {
    /// Deliver one batch to the sink.
    fn report(&mut self, batch: &ReportBatch) -> Result<(), ReportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{MetricName, MetricStatistics, ValueStatistics};

    #[test]
    fn test_batch_round_trips_through_json() {
        let batch = ReportBatch::new(
            1_700_000_000_000,
            vec![MetricSnapshot::new(
                MetricName::new("svc.op"),
                MetricStatistics::Value(ValueStatistics::new(1_699_999_940_000, 4, 100, 40)),
            )],
        );

        let json = serde_json::to_string(&batch).unwrap();
        let back: ReportBatch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, batch);
    }

    #[test]
    fn test_batch_now_stamps_collection_time() {
        let batch = ReportBatch::now(Vec::new());
        assert!(batch.is_empty());
        assert!(batch.collected_at > 1_600_000_000_000);
    }
}
