//! Ordered store benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mvindex_storage::{InMemoryStore, OrderedMap, OrderedStore};

fn key(i: u64) -> Vec<u8> {
    i.to_be_bytes().to_vec()
}

fn filled_map(count: u64) -> mvindex_storage::InMemoryMap {
    let map = InMemoryStore::new().open_map("bench_1").unwrap();
    for i in 0..count {
        map.put(key(i * 2), Vec::new()).unwrap();
    }
    map
}

/// Benchmark map puts.
fn bench_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_put");
    group.throughput(Throughput::Elements(1));

    group.bench_function("sequential", |b| {
        let map = InMemoryStore::new().open_map("bench_1").unwrap();
        let mut i = 0u64;
        b.iter(|| {
            map.put(black_box(key(i)), Vec::new()).unwrap();
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark ceiling lookups, the core of the uniqueness check.
fn bench_ceiling(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_ceiling");

    for count in [1_000u64, 100_000].iter() {
        let map = filled_map(*count);
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            let mut i = 0u64;
            b.iter(|| {
                let probe = key((i * 7919) % (count * 2) | 1);
                black_box(map.ceiling_key(black_box(&probe)).unwrap());
                i += 1;
            });
        });
    }

    group.finish();
}

/// Benchmark lazy key iteration.
fn bench_key_iter(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_key_iter");

    for take in [10usize, 1_000].iter() {
        let map = filled_map(10_000);
        group.throughput(Throughput::Elements(*take as u64));
        group.bench_with_input(BenchmarkId::from_parameter(take), take, |b, &take| {
            b.iter(|| {
                let from = key(5_000);
                let n = map
                    .key_iter(Some(from.as_slice()))
                    .unwrap()
                    .take(take)
                    .filter_map(Result::ok)
                    .count();
                black_box(n);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_put, bench_ceiling, bench_key_iter);
criterion_main!(benches);
