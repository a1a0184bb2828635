//! Console output for drained batches.

use std::io::{self, Write};

use crate::csv::CsvFormat;
use crate::error::ReportError;
use crate::reporter::{ReportBatch, Reporter};

/// Writes CSV batch lines to a sink, stdout by default.
pub struct ConsoleReporter<W: Write = io::Stdout> {
    out: W,
}

impl ConsoleReporter {
    /// Create a reporter writing to stdout.
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> ConsoleReporter<W> {
    /// Create a reporter writing to an arbitrary sink.
    pub fn with_sink(out: W) -> Self {
        Self { out }
    }

    /// The sink, for inspection after reporting.
    pub fn sink(&self) -> &W {
        &self.out
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report(&mut self, batch: &ReportBatch) -> Result<(), ReportError> {
        self.out.write_all(CsvFormat::render(batch).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}
