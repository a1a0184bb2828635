//! Hot write-path benchmarks.
//!
//! Measures the per-event cost application threads pay: raw accumulator
//! adds, timed metric recording, and registry lookup on the hit path.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tally_bench::fixtures;
use tally_core::{MetricRegistry, ValueAccumulator};

fn bench_accumulator_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("record/add");

    let durations = fixtures::durations(1024);

    group.bench_function("value_accumulator", |b| {
        let acc = ValueAccumulator::new();
        let mut idx = 0;
        b.iter(|| {
            acc.add(durations[idx % durations.len()]);
            idx += 1;
        });
    });

    group.bench_function("timed_metric", |b| {
        let registry = MetricRegistry::new();
        let metric = registry.get_or_create_timed("bench.op").unwrap();
        let mut idx = 0;
        b.iter(|| {
            metric.record_nanos(durations[idx % durations.len()], idx % 16 != 0);
            idx += 1;
        });
    });

    group.finish();
}

fn bench_registry_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("record/lookup");

    let names = fixtures::metric_names(100);
    let registry = MetricRegistry::new();
    for name in &names {
        registry.get_or_create_timed(name).unwrap();
    }

    group.bench_function("get_or_create_hit", |b| {
        let mut idx = 0;
        b.iter(|| {
            let name = &names[idx % names.len()];
            idx += 1;
            black_box(registry.get_or_create_timed(name).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_accumulator_add, bench_registry_lookup);
criterion_main!(benches);
