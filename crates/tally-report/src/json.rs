//! JSON-lines rendering of report batches.

use crate::error::ReportError;
use crate::reporter::ReportBatch;

/// Renders a batch as one JSON object per line.
pub struct JsonFormat;

impl JsonFormat {
    /// Render the whole batch as a single JSON line.
    pub fn render(batch: &ReportBatch) -> Result<String, ReportError> {
        let mut line = serde_json::to_string(batch)?;
        line.push('\n');
        Ok(line)
    }
}
