use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use std::time::Duration;
use striped_collections::{SyncQueue, SyncStack, SyncString, SyncVec};

fn bench_vector(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector");
    group.throughput(Throughput::Elements(10_000));
    group.bench_function("push_10k_from_1", |b| {
        b.iter_batched(
            || SyncVec::with_capacity(1).unwrap(),
            |v| {
                for i in 0..10_000u64 {
                    v.push(i).unwrap();
                }
                black_box(v)
            },
            BatchSize::SmallInput,
        )
    });
    group.bench_function("get_10k", |b| {
        let v = SyncVec::new();
        for i in 0..10_000u64 {
            v.push(i).unwrap();
        }
        b.iter(|| {
            for i in 0..10_000 {
                black_box(v.get(i).unwrap());
            }
        })
    });
    group.finish();
}

fn bench_stack_queue(c: &mut Criterion) {
    c.bench_function("stack::push_pop_10k", |b| {
        let s = SyncStack::new();
        b.iter(|| {
            for i in 0..10_000u64 {
                s.push(i).unwrap();
            }
            while let Some(x) = s.pop().unwrap() {
                black_box(x);
            }
        })
    });
    c.bench_function("queue::push_pop_10k", |b| {
        let q = SyncQueue::new();
        b.iter(|| {
            for i in 0..10_000u64 {
                q.push(i).unwrap();
            }
            while let Some(x) = q.pop().unwrap() {
                black_box(x);
            }
        })
    });
}

fn bench_string(c: &mut Criterion) {
    c.bench_function("string::append_1k", |b| {
        b.iter_batched(
            || SyncString::new("").unwrap(),
            |s| {
                for _ in 0..1_000 {
                    s.append("chunk").unwrap();
                }
                black_box(s)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_vector, bench_stack_queue, bench_string
}
criterion_main!(benches);
