//! Daily-rolling file output.
//!
//! Batches append to `<base>.<YYYY-MM-DD>.txt` inside a target directory;
//! when the local date changes the writer closes the current file and
//! opens the next day's. The directory is created on first write.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};

use crate::csv::CsvFormat;
use crate::error::ReportError;
use crate::json::JsonFormat;
use crate::reporter::{ReportBatch, Reporter};

/// Appends text to a dated file, rolling on local date change.
pub struct RollingFileWriter {
    directory: PathBuf,
    base_name: String,
    current: Option<(NaiveDate, File)>,
}

impl RollingFileWriter {
    /// Create a writer targeting `directory/<base_name>.<date>.txt`.
    pub fn new(directory: impl Into<PathBuf>, base_name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            base_name: base_name.into(),
            current: None,
        }
    }

    /// The path written for a given date.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.directory
            .join(format!("{}.{}.txt", self.base_name, date.format("%Y-%m-%d")))
    }

    /// Append `text` to today's file, rolling first if the date changed.
    pub fn write_all(&mut self, text: &str) -> Result<(), ReportError> {
        let today = Local::now().date_naive();

        let rolled = match &self.current {
            Some((date, _)) => *date != today,
            None => true,
        };
        if rolled {
            self.current = Some((today, self.open(today)?));
        }

        // The open above guarantees a current file
        if let Some((_, file)) = self.current.as_mut() {
            file.write_all(text.as_bytes())?;
            file.flush()?;
        }
        Ok(())
    }

    fn open(&self, date: NaiveDate) -> Result<File, ReportError> {
        if !self.directory.as_os_str().is_empty() {
            std::fs::create_dir_all(&self.directory)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(date))?;
        Ok(file)
    }
}

/// Writes CSV batches to a daily-rolling file.
pub struct CsvFileReporter {
    writer: RollingFileWriter,
}

impl CsvFileReporter {
    /// Create a reporter writing under `directory` with the given base name.
    pub fn new(directory: impl Into<PathBuf>, base_name: impl Into<String>) -> Self {
        Self {
            writer: RollingFileWriter::new(directory, base_name),
        }
    }
}

impl Reporter for CsvFileReporter {
    fn report(&mut self, batch: &ReportBatch) -> Result<(), ReportError> {
        self.writer.write_all(&CsvFormat::render(batch))
    }
}

/// Writes JSON-lines batches to a daily-rolling file.
pub struct JsonFileReporter {
    writer: RollingFileWriter,
}

impl JsonFileReporter {
    /// Create a reporter writing under `directory` with the given base name.
    pub fn new(directory: impl Into<PathBuf>, base_name: impl Into<String>) -> Self {
        Self {
            writer: RollingFileWriter::new(directory, base_name),
        }
    }
}

impl Reporter for JsonFileReporter {
    fn report(&mut self, batch: &ReportBatch) -> Result<(), ReportError> {
        self.writer.write_all(&JsonFormat::render(batch)?)
    }
}
