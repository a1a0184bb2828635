//! Tally Traffic Demo
//!
//! Drives a handful of writer threads against a shared metrics registry
//! while a console reporter drains it every couple of seconds, then
//! flips request timing on for one name group mid-run.
//!
//! Run with: cargo run --release

use std::thread;
use std::time::Duration;

use tally::report::{ConsoleReporter, ReportConfig};
use tally::Metrics;
use tracing::info;
use tracing_subscriber::EnvFilter;

const RUN_SECS: u64 = 10;

fn main() -> Result<(), tally::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let metrics = Metrics::new();
    let manager = metrics.start_reporting(
        vec![Box::new(ConsoleReporter::new())],
        ReportConfig {
            frequency: Duration::from_secs(2),
        },
    );

    info!("starting {RUN_SECS}s of simulated traffic");

    let writers: Vec<_> = (0..4)
        .map(|worker| {
            let metrics = metrics.clone();
            thread::spawn(move || simulate_traffic(&metrics, worker))
        })
        .collect();

    // Half-way through, enable request timing for the order endpoints
    thread::sleep(Duration::from_secs(RUN_SECS / 2));
    let changed = metrics.set_request_timing_collection_using_match("web.api.order*", 1)?;
    for descriptor in &changed {
        info!(name = %descriptor.name, depth = descriptor.collection_depth, "request timing enabled");
    }

    for writer in writers {
        writer.join().expect("writer thread panicked");
    }

    info!("traffic finished, flushing final interval");
    manager.stop();
    Ok(())
}

fn simulate_traffic(metrics: &Metrics, worker: usize) {
    let order = metrics.timed("web.api.orderStatus").expect("timed metric");
    let search = metrics.timed("web.api.search").expect("timed metric");
    let queue = metrics.value("web.queue.depth").expect("value metric");

    let deadline = std::time::Instant::now() + Duration::from_secs(RUN_SECS);
    let mut tick = worker as u64;

    while std::time::Instant::now() < deadline {
        tick += 1;

        order.time(|| thread::sleep(Duration::from_micros(200 + tick % 800)));

        let result: Result<(), &str> = search.try_time(|| {
            thread::sleep(Duration::from_micros(100 + tick % 300));
            // Every 25th search hits the degraded backend
            if tick % 25 == 0 {
                Err("backend timeout")
            } else {
                Ok(())
            }
        });
        let _ = result;

        queue.record(tick % 32);
    }
}
