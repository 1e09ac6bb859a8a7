use checkin_kiosk::checkin::{CooldownFilter, SessionRegistry};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::{Duration, Instant};

// Helper to build a registry holding `size` checked-in students
fn populated_registry(size: usize) -> SessionRegistry {
    let mut registry = SessionRegistry::new();
    for i in 0..size {
        registry.record(format!("STU{:06}", i), "08:00:00".to_string());
    }
    registry
}

// 1. Filter decisions under decoder chatter
fn bench_admit_chatter(c: &mut Criterion) {
    let registry = populated_registry(500);
    let start = Instant::now();

    c.bench_function("admit_within_cooldown", |b| {
        let mut filter = CooldownFilter::new(Duration::from_millis(3000));
        filter.admit("STU999999", start, &registry);
        let mut offset = 0u64;
        b.iter(|| {
            offset = (offset + 1) % 2999;
            black_box(filter.admit(
                black_box("STU999999"),
                start + Duration::from_millis(offset),
                &registry,
            ))
        })
    });
}

// 2. Duplicate lookups as the session grows
fn bench_admit_duplicate(c: &mut Criterion) {
    let mut group = c.benchmark_group("admit_duplicate");
    for size in [10usize, 1_000, 100_000] {
        let registry = populated_registry(size);
        let start = Instant::now();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            let mut filter = CooldownFilter::new(Duration::ZERO);
            let mut n = 0u64;
            b.iter(|| {
                n += 1;
                black_box(filter.admit(
                    black_box("STU000007"),
                    start + Duration::from_nanos(n),
                    &registry,
                ))
            })
        });
    }
    group.finish();
}

// 3. Snapshot handed to the renderer after each success
fn bench_registry_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_snapshot");
    for size in [10usize, 500, 5_000] {
        let registry = populated_registry(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &registry, |b, registry| {
            b.iter(|| black_box(registry.snapshot()))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_admit_chatter,
    bench_admit_duplicate,
    bench_registry_snapshot
);
criterion_main!(benches);
