//! Benchmark fixtures for the tally metrics engine.

pub mod fixtures {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Deterministic set of dotted metric names spread over a few groups.
    pub fn metric_names(count: usize) -> Vec<String> {
        (0..count)
            .map(|i| format!("svc.group{}.op{i}", i % 8))
            .collect()
    }

    /// Deterministic pseudo-random durations in nanoseconds.
    pub fn durations(count: usize) -> Vec<u64> {
        let mut rng = StdRng::seed_from_u64(42);
        (0..count)
            .map(|_| rng.gen_range(1_000..50_000_000))
            .collect()
    }
}
