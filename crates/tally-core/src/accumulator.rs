//! Concurrently-updatable value accumulator with drain-and-reset collection.
//!
//! Writers vastly outnumber the single periodic collector, so the write
//! path takes no lock: the live counters sit in a bucket behind an
//! [`ArcSwap`] and writers update its atomics through a loaded handle.
//! Collection swaps in a fresh bucket, then waits until the collector holds
//! the only reference to the old one before reading it out, so every
//! in-flight add lands wholly in either the drained snapshot or the new
//! live interval.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use arc_swap::ArcSwap;

use crate::statistics::ValueStatistics;

/// Current wall-clock time in epoch milliseconds.
pub(crate) fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

/// Live counters for one collection interval.
struct Bucket {
    /// Epoch milliseconds when this interval began.
    start_time: u64,
    count: AtomicU64,
    total: AtomicU64,
    max: AtomicU64,
}

impl Bucket {
    fn new(start_time: u64) -> Self {
        Self {
            start_time,
            count: AtomicU64::new(0),
            total: AtomicU64::new(0),
            max: AtomicU64::new(0),
        }
    }

    fn add(&self, value: u64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(value, Ordering::Relaxed);

        // Raise max via compare-and-swap
        let mut current = self.max.load(Ordering::Relaxed);
        while value > current {
            match self.max.compare_exchange_weak(
                current,
                value,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }
    }
}

/// A concurrently-updatable counter tracking count, total and max.
///
/// `add` never blocks and never retries; `collect_and_reset` briefly waits
/// for in-flight adds against the drained interval to land. Each
/// accumulator is owned exclusively by its parent metric.
pub struct ValueAccumulator {
    bucket: ArcSwap<Bucket>,
}

impl ValueAccumulator {
    /// Create an accumulator whose first interval starts now.
    pub fn new() -> Self {
        Self {
            bucket: ArcSwap::from_pointee(Bucket::new(epoch_millis())),
        }
    }

    /// Record a single value.
    pub fn add(&self, value: u64) {
        // load_full keeps the bucket handle alive until the update lands,
        // which is exactly what collect_and_reset waits on.
        let bucket = self.bucket.load_full();
        bucket.add(value);
    }

    /// Drain the live interval into an immutable snapshot and reset the
    /// live state to `(0, 0, 0, now)`.
    ///
    /// A value added concurrently with this call is attributed to exactly
    /// one of the returned snapshot or the new live interval.
    pub fn collect_and_reset(&self) -> ValueStatistics {
        let old = self.bucket.swap(Arc::new(Bucket::new(epoch_millis())));

        // Writers that loaded the drained bucket may still be mid-add;
        // their handles keep its reference count above one. The wait is
        // bounded by the longest in-flight add.
        while Arc::strong_count(&old) > 1 {
            std::hint::spin_loop();
        }

        ValueStatistics::new(
            old.start_time,
            old.count.load(Ordering::Relaxed),
            old.total.load(Ordering::Relaxed),
            old.max.load(Ordering::Relaxed),
        )
    }

    /// True when nothing has been recorded in the live interval.
    pub fn is_empty(&self) -> bool {
        self.bucket.load().count.load(Ordering::Relaxed) == 0
    }

    /// Events recorded in the live interval so far.
    pub fn count(&self) -> u64 {
        self.bucket.load().count.load(Ordering::Relaxed)
    }

    /// Epoch milliseconds when the live interval began.
    pub fn start_time(&self) -> u64 {
        self.bucket.load().start_time
    }
}

impl Default for ValueAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
