//! Secondary index benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mvindex_bench::utils::{bench_table, generate_rows};
use mvindex_codec::{SortDirection, Value};

/// Benchmark inserts into a table with a non-unique and a unique index.
fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_insert");
    group.throughput(Throughput::Elements(1));

    for unique in [false, true] {
        let name = if unique { "unique" } else { "non_unique" };
        group.bench_function(name, |b| {
            let mut table = bench_table();
            table
                .create_index("bench_email", &[("email", SortDirection::Ascending)], unique)
                .unwrap();
            let mut i = 0u64;
            b.iter(|| {
                let values = vec![
                    Value::Text(format!("user{i}@example.com")),
                    Value::Integer((i % 100) as i64),
                    Value::Null,
                ];
                black_box(table.insert(values).unwrap());
                i += 1;
            });
        });
    }

    group.finish();
}

/// Benchmark bounded range scans on an age index.
fn bench_range_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_range_scan");
    group.sample_size(50);

    for count in [1_000usize, 10_000].iter() {
        let mut table = bench_table();
        table
            .create_index("bench_age", &[("age", SortDirection::Ascending)], false)
            .unwrap();
        for values in generate_rows(*count, 16) {
            table.insert(values).unwrap();
        }
        let lower = table.template_row().with_value(1, 40i64);
        let upper = table.template_row().with_value(1, 49i64);

        group.bench_with_input(BenchmarkId::new("keys", count), count, |b, _| {
            b.iter(|| {
                let n = table
                    .find("bench_age", Some(&lower), Some(&upper))
                    .unwrap()
                    .count();
                black_box(n);
            });
        });

        group.bench_with_input(BenchmarkId::new("rows", count), count, |b, _| {
            b.iter(|| {
                let rows = table
                    .find("bench_age", Some(&lower), Some(&upper))
                    .unwrap()
                    .into_rows()
                    .unwrap();
                black_box(rows);
            });
        });
    }

    group.finish();
}

/// Benchmark first/last retrieval past a run of NULL leading values.
fn bench_first_or_last(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_first_last");

    for nulls in [0usize, 100, 1_000].iter() {
        let mut table = bench_table();
        table
            .create_index("bench_age", &[("age", SortDirection::Ascending)], false)
            .unwrap();
        for i in 0..*nulls {
            table
                .insert(vec![Value::Text(format!("n{i}")), Value::Null, Value::Null])
                .unwrap();
        }
        for values in generate_rows(1_000, 0) {
            table.insert(values).unwrap();
        }

        group.bench_with_input(BenchmarkId::from_parameter(nulls), nulls, |b, _| {
            b.iter(|| {
                let mut cursor = table.find_first_or_last("bench_age", true).unwrap();
                black_box(cursor.current().unwrap().is_some());
            });
        });
    }

    group.finish();
}

/// Benchmark cost estimation for a planner probing several predicates.
fn bench_estimate_cost(c: &mut Criterion) {
    use mvindex_core::IndexCondition;

    let mut table = bench_table();
    table
        .create_index("bench_age", &[("age", SortDirection::Ascending)], false)
        .unwrap();
    let masks = [IndexCondition::NONE, IndexCondition::RANGE, IndexCondition::NONE];
    let index = table.index("bench_age").unwrap();

    c.bench_function("index_estimate_cost", |b| {
        b.iter(|| black_box(index.estimate_cost(Some(black_box(&masks[..]))).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_insert,
    bench_range_scan,
    bench_first_or_last,
    bench_estimate_cost
);
criterion_main!(benches);
