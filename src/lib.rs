//! JONX: a columnar, zstd-compressed binary container for homogeneous JSON
//! record data.
//!
//! A JONX file stores a sequence of JSON objects that share one schema
//! (field names and types inferred from the data) as a compressed,
//! column-oriented file: one frame per field instead of one frame per row.
//! Numeric columns optionally carry a sort-order index for O(1) min/max
//! lookup without a full scan.
//!
//! # Library API
//!
//! ```toml
//! [dependencies]
//! jonx = "0.1"
//! ```
//!
//! ## Quick example
//!
//! ```no_run
//! use jonx::{encode_records, JonxReader, Record};
//! use serde_json::json;
//!
//! let mut record = Record::new();
//! record.insert("id".to_string(), json!(1));
//! record.insert("name".to_string(), json!("Alice"));
//!
//! let bytes = encode_records(&[record]).unwrap();
//!
//! let mut reader = JonxReader::open_bytes(bytes).unwrap();
//! let ids = reader.get_column("id").unwrap();
//! println!("{ids:?}");
//! ```
//!
//! ## Key entry points
//!
//! | Type / Function | Purpose |
//! |-----------------|---------|
//! | [`encode_records`](jonx::encode_records) | Records in memory -> a complete JONX file |
//! | [`encode_file`](jonx::encode_file) | JSON file on disk -> JONX file on disk |
//! | [`JonxReader`](jonx::JonxReader) | Open a JONX file, read columns lazily |
//! | [`decode_bytes`](jonx::decode_bytes) | Full materialization back into records |
//! | [`Schema`](jonx::Schema) | Field list, inferred types, row count |
//! | [`PhysicalType`](jonx::PhysicalType) | The seven physical column types JONX supports |
//! | [`JonxError`](jonx::JonxError) | The crate's unified error type |
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`jonx::frame`] | Length-prefixed, zstd-compressed frame primitive |
//! | [`jonx::infer`] | Type inference over a column's raw JSON values |
//! | [`jonx::column`] | Per-type column encode/decode |
//! | [`jonx::index`] | Argsort permutation index build/validate |
//! | [`jonx::writer`] | Record transpose + schema + frame assembly |
//! | [`jonx::reader`] | Lazy directory walk, column reads, aggregates |

pub mod jonx;

pub use jonx::{
    decode_bytes, encode_file, encode_records, CheckReport, FileInfo, JonxError, JonxReader,
    PhysicalType, Record, Result, Schema, Value,
};
