//! Key and row codec benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mvindex_bench::utils::random_text;
use mvindex_codec::{decode_row, encode_row, KeyDecoder, KeyEncoder, SortDirection, Value};

/// Encode one component per value, then a row id.
fn encode_key(values: &[Value], direction: SortDirection) -> Vec<u8> {
    let mut encoder = KeyEncoder::with_capacity(64);
    for value in values {
        encoder.push_value(value, direction).unwrap();
    }
    encoder.push_row_id(42);
    encoder.finish()
}

/// Benchmark encoding single key components.
fn bench_encode_component(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_component");

    let cases = [
        ("null", Value::Null),
        ("integer", Value::Integer(-123_456)),
        ("text_short", Value::Text("hello".into())),
        ("text_nul", Value::Text("a\0b\0c".into())),
    ];
    for (name, value) in cases {
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let id = format!("{name}_{direction:?}");
            group.bench_function(id, |b| {
                b.iter(|| {
                    let key = encode_key(black_box(std::slice::from_ref(&value)), direction);
                    black_box(key);
                });
            });
        }
    }

    group.finish();
}

/// Benchmark encoding and decoding composite keys of growing text size.
fn bench_composite_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite_key");

    for len in [8, 64, 512].iter() {
        let values = vec![Value::Integer(7), Value::Text(random_text(*len)), Value::Null];
        let encoded = encode_key(&values, SortDirection::Ascending);
        group.throughput(Throughput::Bytes(encoded.len() as u64));

        group.bench_with_input(BenchmarkId::new("encode", len), &values, |b, values| {
            b.iter(|| black_box(encode_key(black_box(values), SortDirection::Ascending)));
        });

        group.bench_with_input(BenchmarkId::new("decode", len), &encoded, |b, encoded| {
            b.iter(|| {
                let mut decoder = KeyDecoder::new(black_box(encoded));
                for _ in 0..3 {
                    black_box(decoder.read_value(SortDirection::Ascending).unwrap());
                }
                black_box(decoder.read_row_id().unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark row payload encoding.
fn bench_row_payload(c: &mut Criterion) {
    let mut group = c.benchmark_group("row_payload");
    let values = vec![
        Value::Text("alice@example.com".into()),
        Value::Integer(30),
        Value::Bytes(vec![0xAB; 256]),
    ];
    let encoded = encode_row(&values).unwrap();

    group.bench_function("encode", |b| {
        b.iter(|| black_box(encode_row(black_box(&values)).unwrap()));
    });
    group.bench_function("decode", |b| {
        b.iter(|| black_box(decode_row(black_box(&encoded)).unwrap()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_encode_component,
    bench_composite_keys,
    bench_row_payload
);
criterion_main!(benches);
