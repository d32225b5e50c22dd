//! Criterion benchmarks for jonx core operations.
//!
//! Benchmarks cover:
//! - Full-file encode (`encode_records`) at a few record counts
//! - Selective single-column read against a wider file (`get_column`)
//! - Indexed vs. linear-scan `find_min`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;

use jonx::{encode_records, JonxReader, Record};

fn build_records(n: usize, extra_fields: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            let mut record = Record::new();
            record.insert("id".to_string(), json!(i as i64));
            record.insert("name".to_string(), json!(format!("row-{i}")));
            record.insert("score".to_string(), json!((i as f64) * 1.5));
            for f in 0..extra_fields {
                record.insert(format!("extra_{f}"), json!(i as i64 + f as i64));
            }
            record
        })
        .collect()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_records");
    for &n in &[100usize, 1_000, 10_000] {
        let records = build_records(n, 2);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &records, |b, records| {
            b.iter(|| black_box(encode_records(records).unwrap()));
        });
    }
    group.finish();
}

fn bench_selective_column_read(c: &mut Criterion) {
    let records = build_records(10_000, 20);
    let bytes = encode_records(&records).unwrap();

    let mut group = c.benchmark_group("get_column");
    group.throughput(Throughput::Elements(records.len() as u64));
    group.bench_function("single_column_of_23", |b| {
        b.iter(|| {
            let mut reader = JonxReader::open_bytes(bytes.clone()).unwrap();
            black_box(reader.get_column("id").unwrap());
        });
    });
    group.finish();
}

fn bench_find_min(c: &mut Criterion) {
    let records = build_records(50_000, 0);
    let bytes = encode_records(&records).unwrap();

    let mut group = c.benchmark_group("find_min");
    group.bench_function("with_index", |b| {
        b.iter(|| {
            let mut reader = JonxReader::open_bytes(bytes.clone()).unwrap();
            black_box(reader.find_min("id", true).unwrap());
        });
    });
    group.bench_function("linear_scan", |b| {
        b.iter(|| {
            let mut reader = JonxReader::open_bytes(bytes.clone()).unwrap();
            black_box(reader.find_min("id", false).unwrap());
        });
    });
    group.finish();
}

criterion_group!(benches, bench_encode, bench_selective_column_read, bench_find_min);
criterion_main!(benches);
