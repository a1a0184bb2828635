//! Reporting error types.

use thiserror::Error;

/// Errors raised while delivering a report batch to a sink.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Writing to the underlying sink failed.
    #[error("report io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing a batch failed.
    #[error("report serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
