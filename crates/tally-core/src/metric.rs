//! Value and timed metrics plus the timed event handle.
//!
//! A [`ValueMetric`] accumulates single values; a [`TimedMetric`] keeps
//! separate success and error duration accumulators and carries the
//! per-request collection depth used by the control plane. Both are held
//! behind `Arc` handles in the registry and share the two-case [`Metric`]
//! tag for bulk operations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::accumulator::ValueAccumulator;
use crate::name::MetricName;
use crate::statistics::{MetricSnapshot, MetricStatistics, TimedStatistics, ValueStatistics};

/// A named metric recording single values.
pub struct ValueMetric {
    name: MetricName,
    accumulator: ValueAccumulator,
}

impl ValueMetric {
    pub(crate) fn new(name: MetricName) -> Self {
        Self {
            name,
            accumulator: ValueAccumulator::new(),
        }
    }

    /// The metric's registered name.
    pub fn name(&self) -> &MetricName {
        &self.name
    }

    /// Record a single value.
    pub fn record(&self, value: u64) {
        self.accumulator.add(value);
    }

    /// True when nothing was recorded in the live interval.
    pub fn is_empty(&self) -> bool {
        self.accumulator.is_empty()
    }

    /// Drain the interval; `None` when nothing was recorded.
    ///
    /// An idle metric is left untouched so its interval keeps running
    /// until it sees activity.
    pub fn collect_snapshot(&self) -> Option<ValueStatistics> {
        if self.accumulator.is_empty() {
            None
        } else {
            Some(self.accumulator.collect_and_reset())
        }
    }
}

/// A named metric recording success and error durations separately.
///
/// Carries a nestable collection depth: while the depth is above zero,
/// per-request detail capture is considered active for this metric.
pub struct TimedMetric {
    name: MetricName,
    success: ValueAccumulator,
    error: ValueAccumulator,
    /// Current nesting depth; request timing is active while above zero.
    collection_depth: AtomicU64,
    /// Depth recorded at the last explicit set, the configured baseline.
    collection_initial: AtomicU64,
}

impl TimedMetric {
    pub(crate) fn new(name: MetricName) -> Self {
        Self::with_collection(name, 0)
    }

    pub(crate) fn with_collection(name: MetricName, initial_depth: u64) -> Self {
        Self {
            name,
            success: ValueAccumulator::new(),
            error: ValueAccumulator::new(),
            collection_depth: AtomicU64::new(initial_depth),
            collection_initial: AtomicU64::new(initial_depth),
        }
    }

    /// The metric's registered name.
    pub fn name(&self) -> &MetricName {
        &self.name
    }

    /// Record a completed operation.
    pub fn record_duration(&self, duration: Duration, success: bool) {
        self.record_nanos(duration.as_nanos() as u64, success);
    }

    /// Record a completed operation from a raw nanosecond duration.
    pub fn record_nanos(&self, nanos: u64, success: bool) {
        if success {
            self.success.add(nanos);
        } else {
            self.error.add(nanos);
        }
    }

    /// Record the time elapsed since `start`.
    pub fn record_since(&self, start: Instant, success: bool) {
        self.record_duration(start.elapsed(), success);
    }

    /// Begin timing an event.
    ///
    /// Ending consumes the handle, so each event records exactly once.
    pub fn start_event(&self) -> TimedEvent<'_> {
        TimedEvent {
            metric: self,
            start: Instant::now(),
        }
    }

    /// Time `op`, recording a success when it returns.
    ///
    /// If `op` panics the duration is recorded on the error path and the
    /// panic continues unwinding; the metric never swallows the failure.
    pub fn time<T>(&self, op: impl FnOnce() -> T) -> T {
        let guard = TimingGuard::new(self);
        let out = op();
        guard.success();
        out
    }

    /// Time a fallible `op`, recording success for `Ok` and error for
    /// `Err`, returning the result unchanged. Panic-safe like [`time`].
    ///
    /// [`time`]: TimedMetric::time
    pub fn try_time<T, E>(&self, op: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let guard = TimingGuard::new(self);
        let out = op();
        match &out {
            Ok(_) => guard.success(),
            Err(_) => guard.error(),
        }
        out
    }

    /// Set the collection depth and record it as the configured baseline.
    pub fn set_request_timing_collection(&self, depth: u64) {
        self.collection_depth.store(depth, Ordering::Relaxed);
        self.collection_initial.store(depth, Ordering::Relaxed);
    }

    /// Decrement the collection depth, stopping at zero.
    pub fn decrement_collection_count(&self) {
        let mut current = self.collection_depth.load(Ordering::Relaxed);
        while current > 0 {
            match self.collection_depth.compare_exchange_weak(
                current,
                current - 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }

    /// True while per-request timing capture is active.
    pub fn is_request_timing(&self) -> bool {
        self.collection_depth.load(Ordering::Relaxed) > 0
    }

    /// The current collection depth.
    pub fn request_timing_collection(&self) -> u64 {
        self.collection_depth.load(Ordering::Relaxed)
    }

    /// The baseline depth recorded at the last explicit set.
    pub fn collection_initial(&self) -> u64 {
        self.collection_initial.load(Ordering::Relaxed)
    }

    /// True when neither accumulator recorded anything this interval.
    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.error.is_empty()
    }

    /// Drain both accumulators; `None` when neither saw any events.
    ///
    /// When only one half saw events the snapshot still carries both, so
    /// reporters can suppress whole metrics without losing the pairing.
    pub fn collect_snapshot(&self) -> Option<TimedStatistics> {
        if self.is_empty() {
            return None;
        }
        Some(TimedStatistics::new(
            self.success.collect_and_reset(),
            self.error.collect_and_reset(),
        ))
    }
}

/// Handle for one in-flight timed event.
///
/// Ending consumes the handle; an event that is never ended records
/// nothing.
#[must_use = "an event records nothing until it is ended"]
pub struct TimedEvent<'a> {
    metric: &'a TimedMetric,
    start: Instant,
}

impl TimedEvent<'_> {
    /// End the event on the success or error path.
    pub fn end(self, success: bool) {
        self.metric.record_since(self.start, success);
    }

    /// End the event as a normal completion.
    pub fn end_with_success(self) {
        self.end(true);
    }

    /// End the event as a failure.
    pub fn end_with_error(self) {
        self.end(false);
    }

    /// Time elapsed since the event started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Records the error path on drop unless explicitly completed, closing
/// the timing region on every exit path including unwinding.
struct TimingGuard<'a> {
    metric: &'a TimedMetric,
    start: Instant,
    armed: bool,
}

impl<'a> TimingGuard<'a> {
    fn new(metric: &'a TimedMetric) -> Self {
        Self {
            metric,
            start: Instant::now(),
            armed: true,
        }
    }

    fn success(mut self) {
        self.armed = false;
        self.metric.record_since(self.start, true);
    }

    fn error(mut self) {
        self.armed = false;
        self.metric.record_since(self.start, false);
    }
}

impl Drop for TimingGuard<'_> {
    fn drop(&mut self) {
        // Reached while armed only when the timed operation panicked.
        if self.armed {
            self.metric.record_since(self.start, false);
        }
    }
}

/// A registered metric, tagged by kind.
///
/// Value metrics never need the success/error split or collection depth,
/// so the two cases stay separate behind this shared tag.
#[derive(Clone)]
pub enum Metric {
    /// Single-accumulator value metric.
    Value(Arc<ValueMetric>),
    /// Paired success/error timed metric.
    Timed(Arc<TimedMetric>),
}

impl Metric {
    /// The metric's registered name.
    pub fn name(&self) -> &MetricName {
        match self {
            Metric::Value(metric) => metric.name(),
            Metric::Timed(metric) => metric.name(),
        }
    }

    /// Kind label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Metric::Value(_) => "value",
            Metric::Timed(_) => "timed",
        }
    }

    /// True when the metric recorded nothing this interval.
    pub fn is_empty(&self) -> bool {
        match self {
            Metric::Value(metric) => metric.is_empty(),
            Metric::Timed(metric) => metric.is_empty(),
        }
    }

    /// Drain this metric; `None` when idle.
    pub fn collect_snapshot(&self) -> Option<MetricSnapshot> {
        match self {
            Metric::Value(metric) => metric.collect_snapshot().map(|stats| {
                MetricSnapshot::new(metric.name().clone(), MetricStatistics::Value(stats))
            }),
            Metric::Timed(metric) => metric.collect_snapshot().map(|stats| {
                MetricSnapshot::new(metric.name().clone(), MetricStatistics::Timed(stats))
            }),
        }
    }
}
