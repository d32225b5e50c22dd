//! JONX container format constants.
//!
//! These values define the byte-exact on-disk layout: the magic/version
//! header, the length-prefix width used by every frame, and the fixed
//! widths of the numeric physical types.

/// Magic bytes at the start of every JONX file.
pub const MAGIC: [u8; 4] = *b"JONX";

/// Current container format version.
pub const VERSION: u32 = 1;

/// Size of the header (magic + version) in bytes.
pub const HEADER_SIZE: usize = MAGIC.len() + 4;

/// Size of a frame's length prefix in bytes.
pub const FRAME_LENGTH_PREFIX_SIZE: usize = 4;

/// Default zstd compression level used by the writer.
pub const DEFAULT_ZSTD_LEVEL: i32 = 7;

/// Width in bytes of the `int16` physical type.
pub const WIDTH_INT16: usize = 2;
/// Width in bytes of the `int32` physical type.
pub const WIDTH_INT32: usize = 4;
/// Width in bytes of the `float16` physical type.
pub const WIDTH_FLOAT16: usize = 2;
/// Width in bytes of the `float32` physical type.
pub const WIDTH_FLOAT32: usize = 4;
/// Width in bytes of the `bool` physical type.
pub const WIDTH_BOOL: usize = 1;

/// Domain bounds for `int16`.
pub const INT16_MIN: i64 = i16::MIN as i64;
pub const INT16_MAX: i64 = i16::MAX as i64;
/// Domain bounds for `int32`.
pub const INT32_MIN: i64 = i32::MIN as i64;
pub const INT32_MAX: i64 = i32::MAX as i64;

/// Width in bytes of one index row entry (`u32` row position).
pub const WIDTH_INDEX_ENTRY: usize = 4;
