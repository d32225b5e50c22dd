//! Errors returned by `jonx` operations.

use thiserror::Error;

/// Errors surfaced by the JONX codec.
///
/// Each variant corresponds to one kind of failure the codec can surface.
/// The codec performs no recovery: an error surfaces to the caller of the
/// operation that triggered it, and a failure reading one column does not
/// invalidate the rest of the file.
#[derive(Error, Debug)]
pub enum JonxError {
    /// An I/O error occurred (open, read, seek, or write failure).
    #[error("I/O error: {0}")]
    Io(String),

    /// The magic bytes did not match, or the header was truncated.
    #[error("invalid header: {0}")]
    HeaderInvalid(String),

    /// The version field named an unknown container version.
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u32),

    /// A frame's source ended mid-length-prefix or mid-payload.
    #[error("frame truncated: {0}")]
    FrameTruncated(String),

    /// A frame's payload failed to decompress as zstd.
    #[error("frame corrupt: {0}")]
    FrameCorrupt(String),

    /// The schema JSON was missing fields/types, had duplicate names, or an
    /// unknown type tag.
    #[error("schema malformed: {0}")]
    SchemaMalformed(String),

    /// A fixed-width column's plaintext length was not `num_rows * width`.
    #[error("column '{field}' length mismatch: expected {expected} bytes, got {actual}")]
    ColumnLengthMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// A `str`/`json` column failed to parse, or had the wrong element count.
    #[error("column '{field}' failed to decode: {reason}")]
    ColumnDecodeError { field: String, reason: String },

    /// A stored index was not a permutation of `[0, N)`, or was not sorted
    /// with respect to its column's values.
    #[error("index for '{field}' invalid: {reason}")]
    IndexInvalid { field: String, reason: String },

    /// A numeric-only operation was requested on a non-numeric column.
    #[error("field '{0}' is not numeric")]
    NotNumeric(String),

    /// An operation referenced a field absent from the schema.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// During encoding, a value exceeded the narrowest available type's
    /// domain (e.g. an integer too large for `int32`, or a float that
    /// overflows `float32`, or a value that would encode as NaN).
    #[error("value out of range for field '{field}': {reason}")]
    ValueOutOfRange { field: String, reason: String },

    /// A record in the input sequence was missing a field present in the
    /// inferred schema (no null support in this format).
    #[error("record {row} missing field '{field}'")]
    MissingField { row: usize, field: String },
}

/// Convenient alias for results over [`JonxError`].
pub type Result<T> = std::result::Result<T, JonxError>;
