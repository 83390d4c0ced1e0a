//! Benchmarks for registry broadcast.
//!
//! Run with: `cargo bench --package pb-mediator --bench broadcast_bench`
//!
//! Covers:
//! - broadcast over all-strong registries of increasing size
//! - broadcast with a sender excluded
//! - broadcast over a registry that is half dead weak entries (includes pruning)

use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pb_mediator::{ColleagueId, Mediator, Ownership};

const SIZES: [usize; 3] = [8, 64, 512];

fn strong_registry(size: usize) -> (Mediator<Cell<u64>>, Vec<Rc<Cell<u64>>>) {
    let mediator = Mediator::new();
    let colleagues: Vec<_> = (0..size).map(|_| Rc::new(Cell::new(0))).collect();
    for colleague in &colleagues {
        mediator.add_colleague(colleague, Ownership::Strong);
    }
    (mediator, colleagues)
}

fn bench_broadcast(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast/all");
    for size in SIZES {
        let (mediator, _colleagues) = strong_registry(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &mediator, |b, m| {
            b.iter(|| black_box(m.invoke_colleagues(None, |cell| cell.set(cell.get() + 1))));
        });
    }
    group.finish();
}

fn bench_broadcast_excluding(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast/excluding");
    for size in SIZES {
        let (mediator, colleagues) = strong_registry(size);
        let sender = ColleagueId::of(&colleagues[size / 2]);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &mediator, |b, m| {
            b.iter(|| {
                black_box(m.invoke_colleagues(Some(sender), |cell| cell.set(cell.get() + 1)))
            });
        });
    }
    group.finish();
}

fn bench_broadcast_with_dead_weak(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast/half_dead");
    for size in SIZES {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter_batched(
                || {
                    let mediator = Mediator::new();
                    let mut kept = Vec::with_capacity(size / 2);
                    for i in 0..size {
                        let colleague = Rc::new(Cell::new(0_u64));
                        mediator.add_colleague(&colleague, Ownership::Weak);
                        if i % 2 == 0 {
                            kept.push(colleague);
                        }
                    }
                    (mediator, kept)
                },
                |(mediator, kept)| {
                    black_box(mediator.invoke_colleagues(None, |cell| cell.set(1)));
                    (mediator, kept)
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_broadcast,
    bench_broadcast_excluding,
    bench_broadcast_with_dead_weak
);
criterion_main!(benches);
