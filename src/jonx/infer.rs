//! Type inference: given a column's raw JSON values, choose the narrowest
//! supported physical type.

use serde_json::Value as JsonValue;

use crate::jonx::constants::{INT16_MAX, INT16_MIN, INT32_MAX, INT32_MIN};
use crate::jonx::error::{JonxError, Result};
use crate::jonx::float16::roundtrips_within_half_ulp;
use crate::jonx::types::PhysicalType;

/// Infer the physical type of a field from every value observed for it
/// across the record set, applying precedence bool > integer > float > str
/// > json.
pub fn infer_column_type(field: &str, values: &[JsonValue]) -> Result<PhysicalType> {
    if values.iter().all(|v| v.is_boolean()) {
        return Ok(PhysicalType::Bool);
    }

    if values.iter().all(is_whole_number) {
        let mut min = i64::MAX;
        let mut max = i64::MIN;
        for v in values {
            let n = whole_number_value(field, v)?;
            min = min.min(n);
            max = max.max(n);
        }
        if min >= INT16_MIN && max <= INT16_MAX {
            return Ok(PhysicalType::Int16);
        }
        if min >= INT32_MIN && max <= INT32_MAX {
            return Ok(PhysicalType::Int32);
        }
        return Err(JonxError::ValueOutOfRange {
            field: field.to_string(),
            reason: format!("integer range [{min}, {max}] exceeds int32"),
        });
    }

    if values.iter().all(|v| v.is_number()) {
        if values.iter().all(|v| is_float16_eligible(v)) {
            return Ok(PhysicalType::Float16);
        }
        for v in values {
            let n = v.as_f64().ok_or_else(|| JonxError::ValueOutOfRange {
                field: field.to_string(),
                reason: format!("{v} is not a representable number"),
            })?;
            if !n.is_finite() || (n as f32).is_infinite() {
                return Err(JonxError::ValueOutOfRange {
                    field: field.to_string(),
                    reason: format!("{n} overflows float32"),
                });
            }
        }
        return Ok(PhysicalType::Float32);
    }

    if values.iter().all(|v| v.is_string()) {
        return Ok(PhysicalType::Str);
    }

    Ok(PhysicalType::Json)
}

/// A value is a "whole integer": a JSON number with no fractional part, and
/// not a boolean (booleans are already excluded by the bool check running
/// first, but we guard here too for direct callers).
fn is_whole_number(v: &JsonValue) -> bool {
    if v.is_boolean() {
        return false;
    }
    match v.as_i64() {
        Some(_) => true,
        None => match v.as_u64() {
            Some(_) => true,
            None => v.as_f64().is_some_and(|f| f.fract() == 0.0 && f.is_finite()),
        },
    }
}

fn whole_number_value(field: &str, v: &JsonValue) -> Result<i64> {
    if let Some(i) = v.as_i64() {
        return Ok(i);
    }
    if let Some(u) = v.as_u64() {
        return i64::try_from(u).map_err(|_| JonxError::ValueOutOfRange {
            field: field.to_string(),
            reason: format!("{u} exceeds int32 range"),
        });
    }
    if let Some(f) = v.as_f64() {
        if f.fract() == 0.0 && f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
            return Ok(f as i64);
        }
    }
    Err(JonxError::ValueOutOfRange {
        field: field.to_string(),
        reason: format!("{v} is not a whole-valued integer"),
    })
}

/// float16 eligibility: at most 3 fractional decimal digits in the value's
/// shortest exact decimal form, *and* a round-trip through binary16 within
/// half a ULP.
fn is_float16_eligible(v: &JsonValue) -> bool {
    let Some(f) = v.as_f64() else { return false };
    if !f.is_finite() {
        return false;
    }
    decimal_fraction_digits(v) <= 3 && roundtrips_within_half_ulp(f)
}

/// Count the digits after the decimal point in a JSON number's literal
/// textual form (its shortest exact decimal representation) — the "canonical
/// decimal form" float16 eligibility is measured against.
/// `serde_json::Value`'s `Display` renders numbers in this shortest form.
fn decimal_fraction_digits(v: &JsonValue) -> usize {
    let text = v.to_string();
    match text.split_once('.') {
        Some((_, frac)) => frac.trim_end_matches('0').len(),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn infers_bool() {
        let vals = vec![json!(true), json!(false), json!(true)];
        assert_eq!(infer_column_type("ok", &vals).unwrap(), PhysicalType::Bool);
    }

    #[test]
    fn infers_int16_within_range() {
        let vals = vec![json!(1), json!(2), json!(-100)];
        assert_eq!(infer_column_type("id", &vals).unwrap(), PhysicalType::Int16);
    }

    #[test]
    fn widens_to_int32_outside_int16_range() {
        let vals = vec![json!(100000), json!(-1)];
        assert_eq!(infer_column_type("x", &vals).unwrap(), PhysicalType::Int32);
    }

    #[test]
    fn infers_float16_for_short_exact_decimals() {
        let vals = vec![json!(1.5), json!(2.25), json!(3.125)];
        assert_eq!(infer_column_type("p", &vals).unwrap(), PhysicalType::Float16);
    }

    #[test]
    fn infers_float32_for_long_decimals() {
        let vals = vec![json!(0.12345)];
        assert_eq!(infer_column_type("p", &vals).unwrap(), PhysicalType::Float32);
    }

    #[test]
    fn infers_str() {
        let vals = vec![json!("Alice"), json!("Bob")];
        assert_eq!(infer_column_type("name", &vals).unwrap(), PhysicalType::Str);
    }

    #[test]
    fn mixed_string_and_number_falls_through_to_json() {
        let vals = vec![json!("x"), json!(1)];
        assert_eq!(infer_column_type("meta", &vals).unwrap(), PhysicalType::Json);
    }

    #[test]
    fn nested_values_are_json() {
        let vals = vec![json!({"a": 1}), json!([1, 2])];
        assert_eq!(infer_column_type("meta", &vals).unwrap(), PhysicalType::Json);
    }

    #[test]
    fn integer_out_of_int32_range_is_error() {
        let vals = vec![json!(9_223_372_036_854_775_807i64)];
        assert!(infer_column_type("x", &vals).is_err());
    }
}
