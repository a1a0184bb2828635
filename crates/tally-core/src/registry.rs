//! Thread-safe name to metric store with get-or-create semantics.
//!
//! The registry owns the only globally shared structure in the engine:
//! the name map. Its lock covers lookup, insertion and cloning the handle
//! list for scans; recording and draining always run against the shared
//! metric handles outside the lock.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::Error;
use crate::matcher::NamePattern;
use crate::metric::{Metric, TimedMetric, ValueMetric};
use crate::name::MetricName;
use crate::statistics::{MetricSnapshot, TimingMetricInfo};

/// Process-wide store mapping names to metric instances.
///
/// At most one metric exists per distinct name; concurrent first access
/// for the same name yields one winning instance shared by all callers.
pub struct MetricRegistry {
    metrics: RwLock<HashMap<MetricName, Metric>>,
}

impl MetricRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            metrics: RwLock::new(HashMap::new()),
        }
    }

    /// Return the timed metric registered under `name`, creating it with
    /// a collection depth of zero on first use.
    pub fn get_or_create_timed(&self, name: &str) -> Result<Arc<TimedMetric>, Error> {
        self.get_or_create_timed_with_depth(name, 0)
    }

    /// As [`get_or_create_timed`], with an initial collection depth that
    /// applies only when this call creates the metric.
    ///
    /// [`get_or_create_timed`]: MetricRegistry::get_or_create_timed
    pub fn get_or_create_timed_with_depth(
        &self,
        name: &str,
        initial_depth: u64,
    ) -> Result<Arc<TimedMetric>, Error> {
        let name = checked_name(name)?;

        if let Some(metric) = self.metrics.read().get(&name) {
            return as_timed(metric, &name);
        }

        match self.metrics.write().entry(name.clone()) {
            // Another creator won the race between the read and write locks
            Entry::Occupied(entry) => as_timed(entry.get(), &name),
            Entry::Vacant(entry) => {
                let metric = Arc::new(TimedMetric::with_collection(name.clone(), initial_depth));
                entry.insert(Metric::Timed(Arc::clone(&metric)));
                debug!(name = %name, "registered timed metric");
                Ok(metric)
            }
        }
    }

    /// Return the value metric registered under `name`, creating it on
    /// first use.
    pub fn get_or_create_value(&self, name: &str) -> Result<Arc<ValueMetric>, Error> {
        let name = checked_name(name)?;

        if let Some(metric) = self.metrics.read().get(&name) {
            return as_value(metric, &name);
        }

        match self.metrics.write().entry(name.clone()) {
            Entry::Occupied(entry) => as_value(entry.get(), &name),
            Entry::Vacant(entry) => {
                let metric = Arc::new(ValueMetric::new(name.clone()));
                entry.insert(Metric::Value(Arc::clone(&metric)));
                debug!(name = %name, "registered value metric");
                Ok(metric)
            }
        }
    }

    /// Drain every non-idle metric into a snapshot list ordered by name.
    ///
    /// The membership is captured when the call starts; metrics registered
    /// while the drain runs are left for the next interval.
    pub fn collect_all_snapshots(&self) -> Vec<MetricSnapshot> {
        self.collect_snapshots_where(|_| true)
    }

    /// As [`collect_all_snapshots`], restricted to names accepted by
    /// `pred`. Metrics filtered out are not drained.
    ///
    /// [`collect_all_snapshots`]: MetricRegistry::collect_all_snapshots
    pub fn collect_snapshots_where(&self, pred: impl Fn(&str) -> bool) -> Vec<MetricSnapshot> {
        let handles = self.handles();

        let mut snapshots: Vec<MetricSnapshot> = handles
            .into_iter()
            .filter(|metric| pred(metric.name().as_str()))
            .filter_map(|metric| metric.collect_snapshot())
            .collect();
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        snapshots
    }

    /// Set the collection depth for the timed metric registered under the
    /// exact `name`.
    ///
    /// Returns `false` without side effects when the name is unknown or
    /// refers to a value metric; a miss is an expected outcome for
    /// administrative probes, not an error.
    pub fn set_request_timing_collection(&self, name: &str, depth: u64) -> bool {
        let found = match self.metrics.read().get(&MetricName::new(name)) {
            Some(Metric::Timed(metric)) => Some(Arc::clone(metric)),
            _ => None,
        };

        match found {
            Some(metric) => {
                metric.set_request_timing_collection(depth);
                true
            }
            None => false,
        }
    }

    /// Apply `depth` to every currently-registered timed metric whose name
    /// matches `pattern`, returning descriptors for the matches ordered by
    /// name.
    ///
    /// Only the membership at call start is affected; metrics registered
    /// afterwards are untouched even when their names match.
    pub fn set_request_timing_collection_using_match(
        &self,
        pattern: &str,
        depth: u64,
    ) -> Result<Vec<TimingMetricInfo>, Error> {
        let pattern = NamePattern::parse(pattern)?;

        let mut matched: Vec<Arc<TimedMetric>> = self
            .timed_handles()
            .into_iter()
            .filter(|metric| pattern.matches(metric.name().as_str()))
            .collect();
        matched.sort_by(|a, b| a.name().cmp(b.name()));

        Ok(matched
            .into_iter()
            .map(|metric| {
                metric.set_request_timing_collection(depth);
                TimingMetricInfo::new(metric.name().as_str(), metric.request_timing_collection())
            })
            .collect())
    }

    /// Descriptors for every timed metric, optionally restricted by a
    /// match pattern, ordered by name.
    pub fn all_timing_metrics(&self, filter: Option<&str>) -> Result<Vec<TimingMetricInfo>, Error> {
        self.timing_metrics_where(filter, |_| true)
    }

    /// Descriptors for the timed metrics with request timing active,
    /// optionally restricted by a match pattern, ordered by name.
    pub fn request_timing_metrics(
        &self,
        filter: Option<&str>,
    ) -> Result<Vec<TimingMetricInfo>, Error> {
        self.timing_metrics_where(filter, TimedMetric::is_request_timing)
    }

    /// Number of registered metrics.
    pub fn metric_count(&self) -> usize {
        self.metrics.read().len()
    }

    /// True when no metrics have been registered.
    pub fn is_empty(&self) -> bool {
        self.metrics.read().is_empty()
    }

    /// Clone the current handle list; the lock is held only for the copy.
    fn handles(&self) -> Vec<Metric> {
        self.metrics.read().values().cloned().collect()
    }

    fn timed_handles(&self) -> Vec<Arc<TimedMetric>> {
        self.metrics
            .read()
            .values()
            .filter_map(|metric| match metric {
                Metric::Timed(timed) => Some(Arc::clone(timed)),
                Metric::Value(_) => None,
            })
            .collect()
    }

    fn timing_metrics_where(
        &self,
        filter: Option<&str>,
        keep: impl Fn(&TimedMetric) -> bool,
    ) -> Result<Vec<TimingMetricInfo>, Error> {
        let pattern = filter.map(NamePattern::parse).transpose()?;

        let mut infos: Vec<TimingMetricInfo> = self
            .timed_handles()
            .into_iter()
            .filter(|metric| keep(metric))
            .filter(|metric| {
                pattern
                    .as_ref()
                    .map_or(true, |p| p.matches(metric.name().as_str()))
            })
            .map(|metric| {
                TimingMetricInfo::new(metric.name().as_str(), metric.request_timing_collection())
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(infos)
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn checked_name(name: &str) -> Result<MetricName, Error> {
    if name.is_empty() {
        Err(Error::EmptyName)
    } else {
        Ok(MetricName::new(name))
    }
}

fn as_timed(metric: &Metric, name: &MetricName) -> Result<Arc<TimedMetric>, Error> {
    match metric {
        Metric::Timed(timed) => Ok(Arc::clone(timed)),
        Metric::Value(_) => Err(Error::KindMismatch {
            name: name.to_string(),
            existing: "value",
        }),
    }
}

fn as_value(metric: &Metric, name: &MetricName) -> Result<Arc<ValueMetric>, Error> {
    match metric {
        Metric::Value(value) => Ok(Arc::clone(value)),
        Metric::Timed(_) => Err(Error::KindMismatch {
            name: name.to_string(),
            existing: "timed",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::MetricStatistics;

    #[test]
    fn test_get_or_create_returns_same_instance() {
        let registry = MetricRegistry::new();

        let first = registry.get_or_create_timed("svc.op").unwrap();
        let second = registry.get_or_create_timed("svc.op").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.metric_count(), 1);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let registry = MetricRegistry::new();
        assert!(matches!(
            registry.get_or_create_timed(""),
            Err(Error::EmptyName)
        ));
        assert!(matches!(
            registry.get_or_create_value(""),
            Err(Error::EmptyName)
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_kind_mismatch_leaves_registry_unchanged() {
        let registry = MetricRegistry::new();
        registry.get_or_create_value("x").unwrap();

        match registry.get_or_create_timed("x") {
            Err(err) => assert_eq!(
                err,
                Error::KindMismatch {
                    name: "x".to_string(),
                    existing: "value",
                }
            ),
            Ok(_) => panic!("expected a kind mismatch"),
        }
        assert_eq!(registry.metric_count(), 1);

        // And the mirror case
        registry.get_or_create_timed("y").unwrap();
        assert!(matches!(
            registry.get_or_create_value("y"),
            Err(Error::KindMismatch { existing: "timed", .. })
        ));
    }

    #[test]
    fn test_collect_skips_idle_metrics() {
        let registry = MetricRegistry::new();
        let busy = registry.get_or_create_timed("svc.busy").unwrap();
        registry.get_or_create_timed("svc.idle").unwrap();
        let counter = registry.get_or_create_value("svc.size").unwrap();

        busy.record_nanos(1_000, true);
        counter.record(3);

        let snapshots = registry.collect_all_snapshots();
        let names: Vec<&str> = snapshots.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["svc.busy", "svc.size"]);
    }

    #[test]
    fn test_collect_ordered_by_name() {
        let registry = MetricRegistry::new();
        for name in ["b.two", "a.one", "c.three"] {
            registry
                .get_or_create_timed(name)
                .unwrap()
                .record_nanos(1, true);
        }

        let names: Vec<String> = registry
            .collect_all_snapshots()
            .into_iter()
            .map(|s| s.name.to_string())
            .collect();
        assert_eq!(names, vec!["a.one", "b.two", "c.three"]);
    }

    #[test]
    fn test_collect_where_filters_without_draining() {
        let registry = MetricRegistry::new();
        let kept = registry.get_or_create_timed("keep.op").unwrap();
        let skipped = registry.get_or_create_timed("skip.op").unwrap();
        kept.record_nanos(1, true);
        skipped.record_nanos(1, true);

        let snapshots = registry.collect_snapshots_where(|name| name.starts_with("keep."));
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].name.as_str(), "keep.op");

        // The filtered-out metric kept its live state
        assert!(!skipped.is_empty());
    }

    #[test]
    fn test_set_request_timing_by_exact_name() {
        let registry = MetricRegistry::new();
        let metric = registry.get_or_create_timed("svc.op").unwrap();
        registry.get_or_create_value("svc.count").unwrap();

        assert!(registry.set_request_timing_collection("svc.op", 3));
        assert_eq!(metric.request_timing_collection(), 3);

        // Unknown name and value-metric name both miss
        assert!(!registry.set_request_timing_collection("svc.unknown", 1));
        assert!(!registry.set_request_timing_collection("svc.count", 1));
    }

    #[test]
    fn test_match_affects_only_matching_metrics() {
        let registry = MetricRegistry::new();
        let a = registry.get_or_create_timed("org.req.A").unwrap();
        let b = registry.get_or_create_timed("org.req.B").unwrap();
        let c = registry.get_or_create_timed("org.other.C").unwrap();

        let changed = registry
            .set_request_timing_collection_using_match("org.req*", 3)
            .unwrap();

        let names: Vec<&str> = changed.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["org.req.A", "org.req.B"]);
        assert!(changed.iter().all(|i| i.collection_depth == 3));

        assert_eq!(a.request_timing_collection(), 3);
        assert_eq!(b.request_timing_collection(), 3);
        assert_eq!(c.request_timing_collection(), 0);
    }

    #[test]
    fn test_match_rejects_invalid_pattern() {
        let registry = MetricRegistry::new();
        assert_eq!(
            registry.set_request_timing_collection_using_match("a*b", 1),
            Err(Error::InvalidPattern("a*b".to_string()))
        );
    }

    #[test]
    fn test_timing_metric_descriptors() {
        let registry = MetricRegistry::new();
        let m0 = registry.get_or_create_timed("org.req.m0").unwrap();
        registry.get_or_create_timed("org.req.m1").unwrap();
        registry.get_or_create_value("org.req.count").unwrap();

        let all = registry.all_timing_metrics(None).unwrap();
        let names: Vec<&str> = all.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["org.req.m0", "org.req.m1"]);

        assert!(registry.request_timing_metrics(None).unwrap().is_empty());

        m0.set_request_timing_collection(1);
        let active = registry.request_timing_metrics(None).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "org.req.m0");
        assert_eq!(active[0].collection_depth, 1);

        m0.decrement_collection_count();
        assert!(registry.request_timing_metrics(None).unwrap().is_empty());
    }

    #[test]
    fn test_descriptor_filter_pattern() {
        let registry = MetricRegistry::new();
        registry.get_or_create_timed("org.req.m0").unwrap();
        registry.get_or_create_timed("web.api.get").unwrap();

        let filtered = registry.all_timing_metrics(Some("web.*")).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "web.api.get");

        assert!(registry.all_timing_metrics(Some("*web")).is_err());
    }

    #[test]
    fn test_value_snapshot_shape() {
        let registry = MetricRegistry::new();
        registry.get_or_create_value("jobs.size").unwrap().record(9);

        let snapshots = registry.collect_all_snapshots();
        assert_eq!(snapshots.len(), 1);
        match &snapshots[0].statistics {
            MetricStatistics::Value(stats) => {
                assert_eq!(stats.count, 1);
                assert_eq!(stats.max, 9);
            }
            other => panic!("expected value statistics, got {other:?}"),
        }
    }
}
