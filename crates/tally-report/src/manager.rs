//! Background report scheduling.
//!
//! The manager owns the single collector the core's concurrency model
//! assumes: a background thread drains the registry once per period and
//! fans the batch out to the configured reporters. Reporter failures are
//! logged and never stop the schedule.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

use tally_core::MetricRegistry;

use crate::reporter::{ReportBatch, Reporter};

/// Configuration for the report manager.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// How often to drain the registry and report.
    pub frequency: Duration,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            frequency: Duration::from_secs(60),
        }
    }
}

/// Background worker that periodically drains a registry into reporters.
pub struct ReportManager {
    /// Shutdown signal.
    shutdown: Arc<AtomicBool>,
    /// Worker thread handle.
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ReportManager {
    /// Start the background reporting thread.
    pub fn start(
        registry: Arc<MetricRegistry>,
        reporters: Vec<Box<dyn Reporter + Send>>,
        config: ReportConfig,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = Arc::clone(&shutdown);

        let handle = thread::spawn(move || {
            Self::worker_loop(registry, reporters, config, shutdown_clone);
        });

        Self {
            shutdown,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Stop the worker and wait for it to finish.
    ///
    /// Performs one final drain before joining so activity recorded since
    /// the last period is not lost.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.lock().take() {
            let _ = handle.join();
        }
    }

    /// Check if the worker is still running.
    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// The main worker loop.
    fn worker_loop(
        registry: Arc<MetricRegistry>,
        mut reporters: Vec<Box<dyn Reporter + Send>>,
        config: ReportConfig,
        shutdown: Arc<AtomicBool>,
    ) {
        let poll = Duration::from_millis(50).min(config.frequency);
        let mut next_report = Instant::now() + config.frequency;

        loop {
            if shutdown.load(Ordering::SeqCst) {
                // Flush whatever the final partial interval holds
                Self::report_once(&registry, &mut reporters);
                break;
            }

            if Instant::now() >= next_report {
                Self::report_once(&registry, &mut reporters);
                next_report = Instant::now() + config.frequency;
            }

            thread::sleep(poll);
        }
    }

    /// Drain the registry and deliver the batch to every reporter.
    fn report_once(registry: &MetricRegistry, reporters: &mut [Box<dyn Reporter + Send>]) {
        let snapshots = registry.collect_all_snapshots();
        if snapshots.is_empty() {
            debug!("no metric activity, skipping report");
            return;
        }

        let batch = ReportBatch::now(snapshots);
        debug!(metrics = batch.snapshots.len(), "reporting interval batch");

        for reporter in reporters.iter_mut() {
            if let Err(error) = reporter.report(&batch) {
                warn!(%error, "reporter failed, continuing with remaining reporters");
            }
        }
    }
}

impl Drop for ReportManager {
    fn drop(&mut self) {
        self.stop();
    }
}
