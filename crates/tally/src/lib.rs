//! Tally - An in-process metrics collection engine.
//!
//! Application code records timed operations and counted values under
//! dotted names; a background worker periodically drains the accumulated
//! statistics into immutable snapshots for export. The [`Metrics`] handle
//! bundles a registry with the reporting lifecycle; the underlying pieces
//! are re-exported for direct use.
//!
//! # Usage
//!
//! ```ignore
//! use std::time::Duration;
//! use tally::report::{ConsoleReporter, ReportConfig};
//! use tally::Metrics;
//!
//! let metrics = Metrics::new();
//! let _manager = metrics.start_reporting(
//!     vec![Box::new(ConsoleReporter::new())],
//!     ReportConfig { frequency: Duration::from_secs(60) },
//! );
//!
//! let timed = metrics.timed("web.api.getOrder")?;
//! timed.time(|| {
//!     // ... handle the request ...
//! });
//! ```

use std::sync::Arc;

use tracing::debug;

pub use tally_core::{
    Error, Metric, MetricName, MetricRegistry, MetricSnapshot, MetricStatistics, NamePattern,
    TimedEvent, TimedMetric, TimedStatistics, TimingMetricInfo, ValueAccumulator, ValueMetric,
    ValueStatistics,
};

/// Reporting sinks and the background report manager.
#[cfg(feature = "report")]
pub mod report {
    pub use tally_report::{
        ConsoleReporter, CsvFileReporter, CsvFormat, JsonFileReporter, JsonFormat, ReportBatch,
        ReportConfig, ReportError, ReportManager, Reporter, RollingFileWriter,
    };
}

/// A shared handle over a metric registry.
///
/// Cloning is cheap; all clones record into the same registry.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<MetricRegistry>,
}

impl Metrics {
    /// Create a handle over a fresh registry.
    pub fn new() -> Self {
        debug!("created metrics registry");
        Self {
            registry: Arc::new(MetricRegistry::new()),
        }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &Arc<MetricRegistry> {
        &self.registry
    }

    /// The timed metric registered under `name`, created on first use.
    pub fn timed(&self, name: &str) -> Result<Arc<TimedMetric>, Error> {
        self.registry.get_or_create_timed(name)
    }

    /// As [`timed`], with an initial collection depth applied on creation.
    ///
    /// [`timed`]: Metrics::timed
    pub fn timed_with_depth(&self, name: &str, depth: u64) -> Result<Arc<TimedMetric>, Error> {
        self.registry.get_or_create_timed_with_depth(name, depth)
    }

    /// The value metric registered under `name`, created on first use.
    pub fn value(&self, name: &str) -> Result<Arc<ValueMetric>, Error> {
        self.registry.get_or_create_value(name)
    }

    /// Drain every non-idle metric, ordered by name.
    pub fn collect(&self) -> Vec<MetricSnapshot> {
        self.registry.collect_all_snapshots()
    }

    /// Set the collection depth for an exact metric name.
    pub fn set_request_timing_collection(&self, name: &str, depth: u64) -> bool {
        self.registry.set_request_timing_collection(name, depth)
    }

    /// Set the collection depth for every metric matching a pattern.
    pub fn set_request_timing_collection_using_match(
        &self,
        pattern: &str,
        depth: u64,
    ) -> Result<Vec<TimingMetricInfo>, Error> {
        self.registry
            .set_request_timing_collection_using_match(pattern, depth)
    }

    /// Descriptors for every timed metric.
    pub fn all_timing_metrics(
        &self,
        filter: Option<&str>,
    ) -> Result<Vec<TimingMetricInfo>, Error> {
        self.registry.all_timing_metrics(filter)
    }

    /// Descriptors for the timed metrics with request timing active.
    pub fn request_timing_metrics(
        &self,
        filter: Option<&str>,
    ) -> Result<Vec<TimingMetricInfo>, Error> {
        self.registry.request_timing_metrics(filter)
    }

    /// Start background reporting against this registry.
    ///
    /// The returned manager stops (with a final flush) when dropped.
    #[cfg(feature = "report")]
    pub fn start_reporting(
        &self,
        reporters: Vec<Box<dyn report::Reporter + Send>>,
        config: report::ReportConfig,
    ) -> report::ReportManager {
        report::ReportManager::start(Arc::clone(&self.registry), reporters, config)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_same_instance() {
        let metrics = Metrics::new();
        let first = metrics.timed("org.test.mytimed").unwrap();
        let second = metrics.timed("org.test.mytimed").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_clone_shares_registry() {
        let metrics = Metrics::new();
        let clone = metrics.clone();

        metrics.value("jobs.size").unwrap().record(5);

        let snapshots = clone.collect();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].name.as_str(), "jobs.size");
    }

    #[test]
    fn test_control_plane_passthrough() {
        let metrics = Metrics::new();
        metrics.timed("org.req.A").unwrap();
        metrics.timed("org.req.B").unwrap();

        let changed = metrics
            .set_request_timing_collection_using_match("org.req*", 2)
            .unwrap();
        assert_eq!(changed.len(), 2);

        let active = metrics.request_timing_metrics(None).unwrap();
        assert_eq!(active.len(), 2);
        assert!(metrics.set_request_timing_collection("org.req.A", 0));
        assert_eq!(metrics.request_timing_metrics(None).unwrap().len(), 1);
    }

    #[cfg(feature = "report")]
    #[test]
    fn test_reporting_lifecycle() {
        use std::time::Duration;

        let dir = tempfile::tempdir().unwrap();
        let metrics = Metrics::new();

        let manager = metrics.start_reporting(
            vec![Box::new(report::CsvFileReporter::new(dir.path(), "app"))],
            report::ReportConfig {
                frequency: Duration::from_secs(3600),
            },
        );

        metrics.timed("svc.op").unwrap().record_nanos(1_000, true);
        manager.stop();

        let written = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(written, 1);
    }
}
