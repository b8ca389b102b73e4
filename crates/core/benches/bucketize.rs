use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gas_core::{bucketize, GasSample, DEFAULT_OHLC_INTERVAL_MS, HISTORY_CAPACITY};

fn full_history() -> Vec<GasSample> {
    (0..HISTORY_CAPACITY as u64)
        .map(|i| GasSample::new(i * 6_000, 20.0 + (i % 7) as f64, 1.5))
        .collect()
}

fn bench_bucketize(c: &mut Criterion) {
    let samples = full_history();

    c.bench_function("bucketize_full_window", |b| {
        b.iter(|| bucketize(black_box(&samples), black_box(DEFAULT_OHLC_INTERVAL_MS)))
    });

    c.bench_function("bucketize_one_minute", |b| {
        b.iter(|| bucketize(black_box(&samples), black_box(60_000)))
    });
}

criterion_group!(benches, bench_bucketize);
criterion_main!(benches);
