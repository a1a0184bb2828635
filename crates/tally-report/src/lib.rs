//! Tally Report - Periodic snapshot reporting.
//!
//! This crate drains a [`tally_core::MetricRegistry`] on a fixed period and
//! hands the resulting batches to reporting sinks: CSV or JSON lines,
//! written to daily-rolling files or the console.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tally_core::MetricRegistry;
//! use tally_report::{CsvFileReporter, ReportConfig, ReportManager};
//!
//! let registry = Arc::new(MetricRegistry::new());
//! let reporter = CsvFileReporter::new("./metrics", "app-metrics");
//!
//! let manager = ReportManager::start(
//!     Arc::clone(&registry),
//!     vec![Box::new(reporter)],
//!     ReportConfig { frequency: Duration::from_secs(60) },
//! );
//!
//! // ... application runs, metrics accumulate ...
//!
//! manager.stop();
//! ```

pub mod console;
pub mod csv;
pub mod error;
pub mod file;
pub mod json;
pub mod manager;
pub mod reporter;

pub use console::ConsoleReporter;
pub use csv::CsvFormat;
pub use error::ReportError;
pub use file::{CsvFileReporter, JsonFileReporter, RollingFileWriter};
pub use json::JsonFormat;
pub use manager::{ReportConfig, ReportManager};
pub use reporter::{ReportBatch, Reporter};
