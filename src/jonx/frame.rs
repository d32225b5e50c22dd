//! Length-prefixed, zstd-compressed frames — the only persistent storage
//! unit in a JONX file.
//!
//! A frame is `u32_le length ∥ zstd_compressed_payload`, where `length` is
//! the number of compressed bytes that follow (it does not include itself).
//! Schema, column, and index blocks are all frames.

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

use crate::jonx::constants::DEFAULT_ZSTD_LEVEL;
use crate::jonx::error::{JonxError, Result};

/// Compress `plaintext` and write it as a frame: `u32_le length` followed by
/// the compressed bytes.
pub fn write_frame<W: Write>(sink: &mut W, plaintext: &[u8]) -> Result<()> {
    let compressed = zstd::stream::encode_all(plaintext, DEFAULT_ZSTD_LEVEL)
        .map_err(|e| JonxError::Io(format!("zstd compression failed: {e}")))?;
    sink.write_u32::<LittleEndian>(compressed.len() as u32)
        .map_err(|e| JonxError::Io(e.to_string()))?;
    sink.write_all(&compressed)
        .map_err(|e| JonxError::Io(e.to_string()))?;
    Ok(())
}

/// Read one frame from `source`: a `u32_le` length, then exactly that many
/// compressed bytes, decompressed and returned as plaintext.
pub fn read_frame<R: Read>(source: &mut R) -> Result<Vec<u8>> {
    let length = source.read_u32::<LittleEndian>().map_err(|e| {
        JonxError::FrameTruncated(format!("could not read frame length: {e}"))
    })? as usize;

    let mut compressed = vec![0u8; length];
    source.read_exact(&mut compressed).map_err(|e| {
        JonxError::FrameTruncated(format!(
            "expected {length} compressed bytes, source ended early: {e}"
        ))
    })?;

    decode_frame_payload(&compressed)
}

/// Decompress a frame's raw compressed payload (already extracted from the
/// byte stream by the caller, e.g. the lazy reader's directory walk).
pub fn decode_frame_payload(compressed: &[u8]) -> Result<Vec<u8>> {
    zstd::stream::decode_all(compressed)
        .map_err(|e| JonxError::FrameCorrupt(format!("zstd rejected payload: {e}")))
}

/// Compress `plaintext` into the wire form of one frame's bytes (length
/// prefix + compressed payload), without writing to any sink. Used by
/// callers that assemble a file in memory before handing it to a `Write`.
pub fn frame_bytes(plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_frame(&mut buf, plaintext)?;
    Ok(buf)
}

/// The total byte span (length prefix + compressed payload) of the frame
/// starting at `offset` within `data`, without decompressing it. Used by the
/// lazy reader's directory walk to skip from one frame to the next.
pub fn frame_span(data: &[u8], offset: usize) -> Result<usize> {
    if offset + 4 > data.len() {
        return Err(JonxError::FrameTruncated(format!(
            "expected a 4-byte length prefix at offset {offset}, file has {} bytes",
            data.len()
        )));
    }
    let length = LittleEndian::read_u32(&data[offset..offset + 4]) as usize;
    let total = 4 + length;
    if offset + total > data.len() {
        return Err(JonxError::FrameTruncated(format!(
            "frame at offset {offset} declares {length} compressed bytes, \
             but only {} bytes remain",
            data.len() - offset - 4
        )));
    }
    Ok(total)
}

/// Decompress the frame starting at `offset` within `data`, returning its
/// plaintext and the total number of bytes the frame occupies (so the
/// caller can advance to the next frame).
pub fn read_frame_at(data: &[u8], offset: usize) -> Result<(Vec<u8>, usize)> {
    let total = frame_span(data, offset)?;
    let plaintext = decode_frame_payload(&data[offset + 4..offset + total])?;
    Ok((plaintext, total))
}
