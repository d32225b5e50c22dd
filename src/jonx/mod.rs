//! JONX: columnar, compressed binary container for homogeneous JSON record
//! data. See the crate root for an overview of the five components wired
//! together here: framing, type inference, column codec, index, and the
//! file assembler (writer + lazy reader).

pub mod column;
pub mod constants;
pub mod error;
pub mod float16;
pub mod frame;
pub mod index;
pub mod infer;
pub mod reader;
pub mod schema;
pub mod types;
pub mod value;
pub mod writer;

pub use error::{JonxError, Result};
pub use reader::{decode_bytes, CheckReport, FileInfo, JonxReader};
pub use schema::Schema;
pub use types::PhysicalType;
pub use value::Value;
pub use writer::{encode_file, encode_records, Record};
