//! Core error types.

use thiserror::Error;

/// Errors raised by the registry and name handling.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Metric name is empty.
    #[error("metric name must not be empty")]
    EmptyName,

    /// A metric with this name is registered as a different kind.
    #[error("metric {name:?} is already registered as a {existing} metric")]
    KindMismatch {
        /// The requested metric name.
        name: String,
        /// Kind of the metric already registered under that name.
        existing: &'static str,
    },

    /// Match pattern is neither a literal nor a trailing-wildcard prefix.
    #[error("invalid match pattern {0:?}: only a single trailing '*' is supported")]
    InvalidPattern(String),
}
