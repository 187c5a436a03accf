//! Benchmarks for flip sampling and descent on naive matrix multiplication.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use flipgraph::{generate, DescentConfig, DescentDriver, NoProgress, Scheme, Term};
use rand::rngs::StdRng;
use rand::SeedableRng;

const FLIPS: u64 = 10_000;

fn naive3() -> Scheme<u64> {
    let terms: Vec<Term<u64>> = generate::naive_matmul(3);
    Scheme::new(9, terms).unwrap()
}

fn config(seed: u64) -> DescentConfig {
    DescentConfig {
        budget: FLIPS,
        progress_interval: 0,
        seed: Some(seed),
        audit: false,
    }
}

fn bench_construct(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheme_construct");
    group.throughput(Throughput::Elements(27));

    group.bench_function("naive_3x3", |b| {
        let terms: Vec<Term<u64>> = generate::naive_matmul(3);
        b.iter(|| black_box(Scheme::new(9, black_box(terms.clone()))));
    });

    group.finish();
}

fn bench_flips(c: &mut Criterion) {
    let mut group = c.benchmark_group("descent");
    group.throughput(Throughput::Elements(FLIPS));

    group.bench_function("naive_3x3_u64", |b| {
        b.iter_batched(
            || DescentDriver::new(naive3(), &config(42)),
            |mut driver| black_box(driver.run(&mut NoProgress)),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("naive_3x3_u128", |b| {
        let terms: Vec<Term<u128>> = generate::naive_matmul(3);
        b.iter_batched(
            || DescentDriver::new(Scheme::new(9, terms.clone()).unwrap(), &config(42)),
            |mut driver| black_box(driver.run(&mut NoProgress)),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampler");
    group.throughput(Throughput::Elements(1));

    group.bench_function("sample_naive_3x3", |b| {
        let scheme = naive3();
        let mut rng = StdRng::seed_from_u64(7);
        b.iter(|| black_box(flipgraph::FlipSampler.sample(scheme.index(), &mut rng)));
    });

    group.finish();
}

criterion_group!(benches, bench_construct, bench_flips, bench_sample);
criterion_main!(benches);
