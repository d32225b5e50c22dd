//! Decoded column values.
//!
//! A [`Value`] is what `get_column`/`decode_bytes` hand back to callers: the
//! in-memory form of one cell, tagged by the column's [`PhysicalType`] but
//! not carrying the type itself (the caller already knows it from the
//! schema).

use serde_json::Value as JsonValue;

/// One decoded cell. `Int` covers both `int16` and `int32` storage (the
/// physical width only matters on disk); `Float` covers both `float16` and
/// `float32` for the same reason.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Json(JsonValue),
}

impl Value {
    /// The value as `f64`, for numeric aggregation (`sum`/`avg`) and index
    /// comparison. `None` for non-numeric values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Render the value back into a [`serde_json::Value`], the form
    /// `decode_bytes` reassembles records from.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Int(v) => JsonValue::from(*v),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Bool(v) => JsonValue::Bool(*v),
            Value::Str(v) => JsonValue::String(v.clone()),
            Value::Json(v) => v.clone(),
        }
    }
}
