//! Column encoder / decoder: serializes one column's values into a typed
//! byte block (a frame's plaintext), and back.

use byteorder::{ByteOrder, LittleEndian};
use serde_json::Value as JsonValue;

use crate::jonx::constants::*;
use crate::jonx::error::{JonxError, Result};
use crate::jonx::float16::{f16_bits_to_f32, f32_to_f16_bits};
use crate::jonx::types::PhysicalType;
use crate::jonx::value::Value;

/// Encode a column's values (already coerced to `ty`'s domain by the
/// writer's type inference pass) into frame plaintext.
pub fn encode_column(field: &str, ty: PhysicalType, values: &[JsonValue]) -> Result<Vec<u8>> {
    match ty {
        PhysicalType::Int16 => encode_int(field, values, WIDTH_INT16, INT16_MIN, INT16_MAX),
        PhysicalType::Int32 => encode_int(field, values, WIDTH_INT32, INT32_MIN, INT32_MAX),
        PhysicalType::Float16 => encode_float16(field, values),
        PhysicalType::Float32 => encode_float32(field, values),
        PhysicalType::Bool => encode_bool(field, values),
        PhysicalType::Str => encode_str(field, values),
        PhysicalType::Json => encode_json(values),
    }
}

/// Decode a column's frame plaintext back into values, given its declared
/// type and row count.
pub fn decode_column(field: &str, ty: PhysicalType, num_rows: usize, plaintext: &[u8]) -> Result<Vec<Value>> {
    match ty {
        PhysicalType::Int16 => decode_fixed_width(field, plaintext, num_rows, WIDTH_INT16, |chunk| {
            Value::Int(LittleEndian::read_i16(chunk) as i64)
        }),
        PhysicalType::Int32 => decode_fixed_width(field, plaintext, num_rows, WIDTH_INT32, |chunk| {
            Value::Int(LittleEndian::read_i32(chunk) as i64)
        }),
        PhysicalType::Float16 => decode_fixed_width(field, plaintext, num_rows, WIDTH_FLOAT16, |chunk| {
            Value::Float(f16_bits_to_f32(LittleEndian::read_u16(chunk)) as f64)
        }),
        PhysicalType::Float32 => decode_fixed_width(field, plaintext, num_rows, WIDTH_FLOAT32, |chunk| {
            Value::Float(LittleEndian::read_f32(chunk) as f64)
        }),
        PhysicalType::Bool => decode_fixed_width(field, plaintext, num_rows, WIDTH_BOOL, |chunk| {
            Value::Bool(chunk[0] != 0)
        }),
        PhysicalType::Str => decode_str(field, plaintext, num_rows),
        PhysicalType::Json => decode_json(field, plaintext, num_rows),
    }
}

fn require_whole(field: &str, v: &JsonValue) -> Result<i64> {
    if let Some(i) = v.as_i64() {
        return Ok(i);
    }
    if let Some(u) = v.as_u64() {
        return i64::try_from(u).map_err(|_| JonxError::ValueOutOfRange {
            field: field.to_string(),
            reason: format!("{u} does not fit in i64"),
        });
    }
    if let Some(f) = v.as_f64() {
        if f.fract() == 0.0 {
            return Ok(f as i64);
        }
    }
    Err(JonxError::ValueOutOfRange {
        field: field.to_string(),
        reason: format!("{v} is not a whole-valued integer"),
    })
}

fn encode_int(field: &str, values: &[JsonValue], width: usize, min: i64, max: i64) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; values.len() * width];
    for (i, v) in values.iter().enumerate() {
        let n = require_whole(field, v)?;
        if n < min || n > max {
            return Err(JonxError::ValueOutOfRange {
                field: field.to_string(),
                reason: format!("{n} outside [{min}, {max}]"),
            });
        }
        let slot = &mut buf[i * width..(i + 1) * width];
        if width == WIDTH_INT16 {
            LittleEndian::write_i16(slot, n as i16);
        } else {
            LittleEndian::write_i32(slot, n as i32);
        }
    }
    Ok(buf)
}

fn encode_float16(field: &str, values: &[JsonValue]) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; values.len() * WIDTH_FLOAT16];
    for (i, v) in values.iter().enumerate() {
        let f = v.as_f64().ok_or_else(|| JonxError::ValueOutOfRange {
            field: field.to_string(),
            reason: format!("{v} is not numeric"),
        })?;
        let bits = f32_to_f16_bits(f as f32);
        LittleEndian::write_u16(&mut buf[i * WIDTH_FLOAT16..(i + 1) * WIDTH_FLOAT16], bits);
    }
    Ok(buf)
}

fn encode_float32(field: &str, values: &[JsonValue]) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; values.len() * WIDTH_FLOAT32];
    for (i, v) in values.iter().enumerate() {
        let f = v.as_f64().ok_or_else(|| JonxError::ValueOutOfRange {
            field: field.to_string(),
            reason: format!("{v} is not numeric"),
        })?;
        let f32v = f as f32;
        if f32v.is_infinite() && f.is_finite() {
            return Err(JonxError::ValueOutOfRange {
                field: field.to_string(),
                reason: format!("{f} overflows float32"),
            });
        }
        LittleEndian::write_f32(&mut buf[i * WIDTH_FLOAT32..(i + 1) * WIDTH_FLOAT32], f32v);
    }
    Ok(buf)
}

fn encode_bool(field: &str, values: &[JsonValue]) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(values.len());
    for v in values {
        let b = v.as_bool().ok_or_else(|| JonxError::ValueOutOfRange {
            field: field.to_string(),
            reason: format!("{v} is not a boolean"),
        })?;
        buf.push(if b { 1 } else { 0 });
    }
    Ok(buf)
}

fn encode_str(field: &str, values: &[JsonValue]) -> Result<Vec<u8>> {
    let strings: Result<Vec<&str>> = values
        .iter()
        .map(|v| {
            v.as_str().ok_or_else(|| JonxError::ValueOutOfRange {
                field: field.to_string(),
                reason: format!("{v} is not a string"),
            })
        })
        .collect();
    serde_json::to_vec(&strings?).map_err(|e| JonxError::ColumnDecodeError {
        field: field.to_string(),
        reason: format!("failed to serialize string column: {e}"),
    })
}

fn encode_json(values: &[JsonValue]) -> Result<Vec<u8>> {
    serde_json::to_vec(values).map_err(|e| JonxError::ColumnDecodeError {
        field: "<json column>".to_string(),
        reason: format!("failed to serialize json column: {e}"),
    })
}

fn decode_fixed_width<F>(
    field: &str,
    plaintext: &[u8],
    num_rows: usize,
    width: usize,
    mut read_one: F,
) -> Result<Vec<Value>>
where
    F: FnMut(&[u8]) -> Value,
{
    let expected = num_rows * width;
    if plaintext.len() != expected {
        return Err(JonxError::ColumnLengthMismatch {
            field: field.to_string(),
            expected,
            actual: plaintext.len(),
        });
    }
    Ok(plaintext.chunks_exact(width).map(&mut read_one).collect())
}

fn decode_str(field: &str, plaintext: &[u8], num_rows: usize) -> Result<Vec<Value>> {
    let strings: Vec<String> =
        serde_json::from_slice(plaintext).map_err(|e| JonxError::ColumnDecodeError {
            field: field.to_string(),
            reason: format!("not a JSON string array: {e}"),
        })?;
    if strings.len() != num_rows {
        return Err(JonxError::ColumnDecodeError {
            field: field.to_string(),
            reason: format!("expected {num_rows} elements, got {}", strings.len()),
        });
    }
    Ok(strings.into_iter().map(Value::Str).collect())
}

fn decode_json(field: &str, plaintext: &[u8], num_rows: usize) -> Result<Vec<Value>> {
    let values: Vec<JsonValue> =
        serde_json::from_slice(plaintext).map_err(|e| JonxError::ColumnDecodeError {
            field: field.to_string(),
            reason: format!("not a JSON array: {e}"),
        })?;
    if values.len() != num_rows {
        return Err(JonxError::ColumnDecodeError {
            field: field.to_string(),
            reason: format!("expected {num_rows} elements, got {}", values.len()),
        });
    }
    Ok(values.into_iter().map(Value::Json).collect())
}
