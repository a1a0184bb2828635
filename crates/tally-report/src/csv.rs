//! CSV rendering of report batches.
//!
//! One line per non-empty statistics half: the collection time of day, the
//! metric name (error halves under the derived `.error` name), then the
//! count/avg/max/total columns and the interval length in seconds. An
//! all-empty metric never reaches a batch, so only halves are suppressed
//! here.

use chrono::{Local, TimeZone};
use tally_core::{MetricName, MetricStatistics, ValueStatistics};

use crate::reporter::ReportBatch;

/// Renders batches into CSV lines.
pub struct CsvFormat;

impl CsvFormat {
    /// Render a whole batch, one line per non-empty statistics half.
    pub fn render(batch: &ReportBatch) -> String {
        let time = Self::time_of_day(batch.collected_at);
        let mut out = String::new();

        for snapshot in &batch.snapshots {
            match &snapshot.statistics {
                MetricStatistics::Value(stats) => {
                    Self::render_line(&mut out, &time, &snapshot.name, stats, batch.collected_at);
                }
                MetricStatistics::Timed(stats) => {
                    if !stats.success.is_empty() {
                        Self::render_line(
                            &mut out,
                            &time,
                            &snapshot.name,
                            &stats.success,
                            batch.collected_at,
                        );
                    }
                    if !stats.error.is_empty() {
                        Self::render_line(
                            &mut out,
                            &time,
                            &snapshot.name.error_name(),
                            &stats.error,
                            batch.collected_at,
                        );
                    }
                }
            }
        }

        out
    }

    fn render_line(
        out: &mut String,
        time: &str,
        name: &MetricName,
        stats: &ValueStatistics,
        collected_at: u64,
    ) {
        out.push_str(&format!(
            "{}, {}, count={}, avg={}, max={}, total={}, dur={}\n",
            time,
            name,
            stats.count,
            stats.mean(),
            stats.max,
            stats.total,
            stats.duration_secs(collected_at),
        ));
    }

    fn time_of_day(collected_at: u64) -> String {
        Local
            .timestamp_millis_opt(collected_at as i64)
            .single()
            .map(|time| time.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "00:00:00".to_string())
    }
}
