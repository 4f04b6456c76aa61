//! Benchmark utilities.

use mvindex_codec::{ColumnType, Value};
use mvindex_core::{Column, IndexConfig, Table, TableId};
use mvindex_storage::InMemoryStore;
use rand::Rng;

/// Generate random bytes of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate a random lowercase string of the specified length.
pub fn random_text(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

/// Columns of the benchmark table: `email`, `age`, `payload`.
pub fn bench_columns() -> Vec<Column> {
    vec![
        Column::new(0, "email", ColumnType::Varchar),
        Column::new(1, "age", ColumnType::Integer),
        Column::new(2, "payload", ColumnType::Varbinary),
    ]
}

/// Generate row values with unique emails and ages in `0..100`.
pub fn generate_rows(count: usize, payload_size: usize) -> Vec<Vec<Value>> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            vec![
                Value::Text(format!("{}{i}@example.com", random_text(6))),
                Value::Integer(rng.gen_range(0..100)),
                Value::Bytes(random_data(payload_size)),
            ]
        })
        .collect()
}

/// Creates an empty benchmark table in a fresh in-memory store.
pub fn bench_table() -> Table<InMemoryStore> {
    Table::create(
        InMemoryStore::new(),
        TableId::new(1),
        "bench",
        bench_columns(),
        IndexConfig::default(),
    )
    .expect("Failed to create table")
}
