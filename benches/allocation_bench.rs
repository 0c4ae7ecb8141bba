use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use tempfile::TempDir;

use portreg::config::{Config, ConfigBuilder};
use portreg::engine::Engine;

const BULK_ALLOCATION_SIZES: &[usize] = &[1, 10, 50];
const PREPOPULATED_SIZES: &[usize] = &[10, 100, 500];

fn benchmark_config(temp_dir: &TempDir) -> Config {
    ConfigBuilder::new()
        .registry_dir(temp_dir.path())
        .min_port(45000)
        .max_port(49000)
        .build()
        .expect("failed to build benchmark configuration")
}

fn setup_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().expect("failed to create temporary directory");
    let config = benchmark_config(&temp_dir);
    (temp_dir, Engine::new(config))
}

fn populate(engine: &Engine, count: usize) {
    if count > 0 {
        engine
            .get_multiple(count, Some("prepopulated"))
            .expect("prepopulation should succeed");
    }
}

fn bench_get_single(c: &mut Criterion) {
    c.bench_function("get_single", |b| {
        b.iter_batched(
            setup_engine,
            |(temp_dir, engine)| {
                let allocation = engine.get(Some("bench")).expect("allocation should succeed");
                black_box(allocation);
                drop(temp_dir);
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_get_multiple(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_multiple");

    for &count in BULK_ALLOCATION_SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter_batched(
                setup_engine,
                |(temp_dir, engine)| {
                    let allocations = engine
                        .get_multiple(count, Some("bulk"))
                        .expect("bulk allocation should succeed");
                    black_box(allocations);
                    drop(temp_dir);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_get_against_prepopulated_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_against_prepopulated");

    for &size in PREPOPULATED_SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let (temp_dir, engine) = setup_engine();
                    populate(&engine, size);
                    (temp_dir, engine)
                },
                |(temp_dir, engine)| {
                    let allocation = engine.get(Some("probe")).expect("allocation should succeed");
                    black_box(allocation);
                    drop(temp_dir);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_release(c: &mut Criterion) {
    c.bench_function("release", |b| {
        b.iter_batched(
            || {
                let (temp_dir, engine) = setup_engine();
                let allocation = engine.get(Some("release-me")).expect("allocation should succeed");
                (temp_dir, engine, allocation.port)
            },
            |(temp_dir, engine, port)| {
                engine.release(port).expect("release should succeed");
                drop(temp_dir);
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_reserve_range(c: &mut Criterion) {
    c.bench_function("reserve_range", |b| {
        b.iter_batched(
            setup_engine,
            |(temp_dir, engine)| {
                let allocations = engine
                    .reserve_range(46000, 8, Some("contiguous"))
                    .expect("range reservation should succeed");
                black_box(allocations);
                drop(temp_dir);
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_get_single,
    bench_get_multiple,
    bench_get_against_prepopulated_registry,
    bench_release,
    bench_reserve_range
);
criterion_main!(benches);
