//! End-to-end collection scenarios against a single registry.

use tally_core::{MetricRegistry, MetricStatistics};

#[test]
fn timed_metric_interval_scenario() {
    let registry = MetricRegistry::new();
    let metric = registry.get_or_create_timed("svc.op").unwrap();

    for _ in 0..3 {
        metric.record_nanos(5_000_000, true);
    }
    metric.record_nanos(2_000_000, false);

    let snapshots = registry.collect_all_snapshots();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].name.as_str(), "svc.op");

    let stats = match snapshots[0].statistics {
        MetricStatistics::Timed(stats) => stats,
        MetricStatistics::Value(_) => panic!("expected timed statistics"),
    };
    assert_eq!(stats.success.count, 3);
    assert_eq!(stats.success.total, 15_000_000);
    assert_eq!(stats.success.max, 5_000_000);
    assert_eq!(stats.success.mean(), 5_000_000);
    assert_eq!(stats.error.count, 1);
    assert_eq!(stats.error.total, 2_000_000);
    assert_eq!(stats.error.max, 2_000_000);
    assert_eq!(stats.error.mean(), 2_000_000);

    // No new activity: the next interval yields nothing at all
    assert!(registry.collect_all_snapshots().is_empty());
}

#[test]
fn mixed_registry_drains_both_kinds() {
    let registry = MetricRegistry::new();

    let timed = registry.get_or_create_timed("web.api.getOrder").unwrap();
    let queue = registry.get_or_create_value("web.queue.depth").unwrap();

    timed.time(|| std::hint::black_box(3 * 7));
    let failed: Result<(), &str> = timed.try_time(|| Err("downstream fault"));
    assert!(failed.is_err());
    queue.record(12);

    let snapshots = registry.collect_all_snapshots();
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].name.as_str(), "web.api.getOrder");
    assert_eq!(snapshots[1].name.as_str(), "web.queue.depth");

    match snapshots[0].statistics {
        MetricStatistics::Timed(stats) => {
            assert_eq!(stats.success.count, 1);
            assert_eq!(stats.error.count, 1);
        }
        MetricStatistics::Value(_) => panic!("expected timed statistics"),
    }
}

#[test]
fn depth_overrides_follow_admin_lifecycle() {
    let registry = MetricRegistry::new();
    registry.get_or_create_timed("org.req.A").unwrap();
    registry.get_or_create_timed("org.req.B").unwrap();
    registry.get_or_create_timed("org.other.C").unwrap();

    let changed = registry
        .set_request_timing_collection_using_match("org.req*", 3)
        .unwrap();
    let names: Vec<&str> = changed.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["org.req.A", "org.req.B"]);

    let active = registry.request_timing_metrics(None).unwrap();
    assert_eq!(active.len(), 2);

    // A metric registered after the bulk call is unaffected by it
    let late = registry.get_or_create_timed("org.req.Z").unwrap();
    assert!(!late.is_request_timing());

    // Nested enable on A: one decrement per finished request
    let a = registry.get_or_create_timed("org.req.A").unwrap();
    a.decrement_collection_count();
    a.decrement_collection_count();
    a.decrement_collection_count();
    assert!(!a.is_request_timing());
    a.decrement_collection_count();
    assert_eq!(a.request_timing_collection(), 0);

    let still_active = registry.request_timing_metrics(None).unwrap();
    assert_eq!(still_active.len(), 1);
    assert_eq!(still_active[0].name, "org.req.B");
}
