//! Benchmarks comparing the two queue backends.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ctxpool::{wait_all, BackendKind, Config, ContextPool};

fn pool_with(kind: BackendKind, num_threads: usize) -> ContextPool {
    let config = Config::builder()
        .num_threads(num_threads)
        .backend(kind)
        .build()
        .unwrap();
    ContextPool::with_config(config).unwrap()
}

fn backend_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("fan_out_fan_in");

    for (name, kind) in [
        ("channel", BackendKind::Channel),
        ("locked", BackendKind::Locked),
    ] {
        for tasks in [100usize, 1_000, 10_000] {
            let pool = pool_with(kind, 4);
            group.bench_with_input(BenchmarkId::new(name, tasks), &tasks, |b, &tasks| {
                b.iter(|| {
                    let handles: Vec<_> = (0..tasks)
                        .map(|n| pool.submit(move || black_box(n * 2)).unwrap())
                        .collect();
                    wait_all(handles).unwrap()
                });
            });
        }
    }

    group.finish();
}

fn submit_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_one");

    for (name, kind) in [
        ("channel", BackendKind::Channel),
        ("locked", BackendKind::Locked),
    ] {
        let pool = pool_with(kind, 2);
        group.bench_function(name, |b| {
            b.iter(|| {
                pool.submit(|| black_box(1u64)).unwrap().wait().unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, backend_throughput, submit_latency);
criterion_main!(benches);
