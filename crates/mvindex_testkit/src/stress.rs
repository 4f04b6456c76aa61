//! Stress tests for mvindex.
//!
//! These helpers drive a table under heavy load and concurrent access and
//! report throughput.

use crate::fixtures::{person, TestTable, AGE_INDEX};
use mvindex_core::{RowId, SearchRow};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations to perform.
    pub operations: usize,
    /// Number of concurrent threads (for concurrent tests).
    pub threads: usize,
    /// Number of distinct email values; inserts beyond this collide.
    pub distinct_keys: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            threads: 4,
            distinct_keys: 1_000,
        }
    }
}

fn email(i: usize) -> String {
    format!("user{i}@example.com")
}

/// Inserts rows whose emails repeat every `distinct_keys` rows. Failures
/// are the duplicate-key rejections of the unique email index.
pub fn stress_unique_inserts(table: &TestTable, config: &StressConfig) -> StressTestResult {
    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for i in 0..config.operations {
        let key = email(i % config.distinct_keys);
        match table.insert(person("u", Some(&key), Some((i % 100) as i64))) {
            Ok(_) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Alternates inserts and deletes; every delete must find its index
/// entries.
pub fn stress_insert_delete(table: &TestTable, config: &StressConfig) -> StressTestResult {
    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;
    let mut live: Vec<RowId> = Vec::new();

    for i in 0..config.operations {
        let result = if i % 3 == 2 {
            match live.pop() {
                Some(id) => table.delete(id).map(|_| ()),
                None => Ok(()),
            }
        } else {
            table
                .insert(person("u", Some(&email(i)), Some((i % 100) as i64)))
                .map(|id| live.push(id))
        };

        match result {
            Ok(()) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Runs bounded age scans from several threads at once.
///
/// A scan fails if it yields a row outside its bounds or out of order.
pub fn stress_concurrent_scans(table: Arc<TestTable>, config: &StressConfig) -> StressTestResult {
    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let ops_per_thread = config.operations / config.threads.max(1);

    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let table = Arc::clone(&table);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);

            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let low = ((t + i) % 50) as i64;
                    let ok = scan_in_bounds(&table, low, low + 10);
                    if ok {
                        successful.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    StressTestResult::new(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start.elapsed(),
    )
}

fn scan_in_bounds(table: &TestTable, low: i64, high: i64) -> bool {
    let lower = SearchRow::new(3).with_value(2, low);
    let upper = SearchRow::new(3).with_value(2, high);
    let Ok(cursor) = table.find(AGE_INDEX, Some(&lower), Some(&upper)) else {
        return false;
    };
    let mut previous = low;
    for entry in cursor {
        let Ok(entry) = entry else {
            return false;
        };
        let Some(age) = entry.values[2].as_ref().and_then(|v| v.as_integer()) else {
            return false;
        };
        if age < previous || age > high {
            return false;
        }
        previous = age;
    }
    true
}
