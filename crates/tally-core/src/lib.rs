//! Tally Core - Concurrent metric registry and accumulators.
//!
//! This crate provides the core of the tally metrics engine: named
//! metrics recording counted values or timed success/error durations,
//! drained periodically into immutable snapshots by a single collector.
//!
//! # Usage
//!
//! ```ignore
//! use tally_core::MetricRegistry;
//!
//! let registry = MetricRegistry::new();
//!
//! // Record a timed operation
//! let timed = registry.get_or_create_timed("web.api.getOrder")?;
//! let event = timed.start_event();
//! // ... handle the request ...
//! event.end_with_success();
//!
//! // Periodically drain everything that saw activity
//! for snapshot in registry.collect_all_snapshots() {
//!     println!("{}", snapshot.name);
//! }
//! ```

pub mod accumulator;
pub mod error;
pub mod matcher;
pub mod metric;
pub mod name;
pub mod registry;
pub mod statistics;

pub use accumulator::ValueAccumulator;
pub use error::Error;
pub use matcher::NamePattern;
pub use metric::{Metric, TimedEvent, TimedMetric, ValueMetric};
pub use name::MetricName;
pub use registry::MetricRegistry;
pub use statistics::{
    MetricSnapshot, MetricStatistics, TimedStatistics, TimingMetricInfo, ValueStatistics,
};
