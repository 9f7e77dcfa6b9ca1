//! Benchmark for the single-valued delta maps.
//!
//! Measures the cost of the overlay lifecycle (rebase, staged writes, commit,
//! deep copy) against the size of the committed pool.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use delta_cache::delta::{
    Copyable, DeltaMap, ImmutableObjectDeltaMap, MutableObjectAwareDeltaMap, TransactionalOverlay,
};
use std::hint::black_box;

#[derive(Debug, Clone)]
struct Balance {
    amount: u64,
    nonce: u64,
}

impl Copyable for Balance {
    fn copy(&self) -> Self {
        self.clone()
    }
}

fn immutable_base(size: u64) -> ImmutableObjectDeltaMap<u64, u64> {
    (0..size).map(|key| (key, key * 2)).collect()
}

fn mutable_base(size: u64) -> MutableObjectAwareDeltaMap<u64, Balance> {
    (0..size)
        .map(|key| (key, Balance { amount: key, nonce: 0 }))
        .collect()
}

// =============================================================================
// rebase Benchmark
// =============================================================================

fn benchmark_rebase(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("rebase");

    for size in [1_000, 10_000, 100_000] {
        let base = immutable_base(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &base, |bencher, base| {
            bencher.iter(|| black_box(base.rebase()));
        });
    }

    group.finish();
}

// =============================================================================
// get Benchmark
// =============================================================================

fn benchmark_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("get");

    for size in [1_000, 10_000] {
        // Reads falling through to the committed pool
        let base = immutable_base(size);
        let overlay = base.rebase();
        group.bench_with_input(
            BenchmarkId::new("ImmutableObjectDeltaMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    for key in 0..size {
                        black_box(overlay.get(&black_box(key)));
                    }
                });
            },
        );

        // Reads duplicating a mutable value
        let base = mutable_base(size);
        let overlay = base.rebase();
        group.bench_with_input(
            BenchmarkId::new("MutableObjectAwareDeltaMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    for key in 0..size {
                        black_box(overlay.get(&black_box(key)));
                    }
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// commit Benchmark
// =============================================================================

fn benchmark_commit(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("commit");

    for pending in [100, 1_000, 10_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(pending),
            &pending,
            |bencher, &pending| {
                bencher.iter(|| {
                    let base = immutable_base(1_000);
                    let mut overlay = base.rebase();
                    for key in 0..pending {
                        overlay.put(black_box(key + 500), key).unwrap();
                    }
                    overlay.remove(&0).unwrap();
                    overlay.commit().unwrap();
                    black_box(base)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// get_mut Benchmark
// =============================================================================

fn benchmark_get_mut(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("get_mut");

    for size in [1_000, 10_000] {
        let base = mutable_base(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut overlay = base.rebase();
                for key in 0..size {
                    if let Ok(Some(balance)) = overlay.get_mut(&key) {
                        balance.nonce += balance.amount;
                    }
                }
                black_box(overlay)
            });
        });
    }

    group.finish();
}

// =============================================================================
// deep_copy Benchmark
// =============================================================================

fn benchmark_deep_copy(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("deep_copy");

    for size in [1_000, 10_000, 100_000] {
        let base = immutable_base(size);
        group.bench_with_input(
            BenchmarkId::new("ImmutableObjectDeltaMap", size),
            &base,
            |bencher, base| {
                bencher.iter(|| black_box(base.deep_copy()));
            },
        );

        let base = mutable_base(size);
        group.bench_with_input(
            BenchmarkId::new("MutableObjectAwareDeltaMap", size),
            &base,
            |bencher, base| {
                bencher.iter(|| black_box(base.deep_copy()));
            },
        );
    }

    group.finish();
}

// =============================================================================
// Criterion Group and Main
// =============================================================================

criterion_group!(
    benches,
    benchmark_rebase,
    benchmark_get,
    benchmark_commit,
    benchmark_get_mut,
    benchmark_deep_copy
);

criterion_main!(benches);
