//! Index builder / reader: argsort permutations for O(1) extremum lookup on
//! numeric columns.

use byteorder::{ByteOrder, LittleEndian};

use crate::jonx::error::{JonxError, Result};
use crate::jonx::value::Value;

/// Compute the argsort permutation of a numeric column: `π` such that
/// `values[π(i)] <= values[π(i+1)]` for all `i`. Ties are broken by original
/// row order (a stable sort).
pub fn build_index(field: &str, values: &[Value]) -> Result<Vec<u32>> {
    let mut keyed: Vec<(usize, f64)> = Vec::with_capacity(values.len());
    for (i, v) in values.iter().enumerate() {
        let key = v.as_f64().ok_or_else(|| JonxError::NotNumeric(field.to_string()))?;
        if key.is_nan() {
            return Err(JonxError::ValueOutOfRange {
                field: field.to_string(),
                reason: "NaN cannot be indexed".to_string(),
            });
        }
        keyed.push((i, key));
    }
    keyed.sort_by(|a, b| a.1.total_cmp(&b.1));
    Ok(keyed.into_iter().map(|(i, _)| i as u32).collect())
}

/// Serialize an index permutation into frame plaintext: `N * u32_le` row
/// positions.
pub fn encode_index(permutation: &[u32]) -> Vec<u8> {
    let mut buf = vec![0u8; permutation.len() * 4];
    for (i, &pos) in permutation.iter().enumerate() {
        LittleEndian::write_u32(&mut buf[i * 4..(i + 1) * 4], pos);
    }
    buf
}

/// Parse an index frame's plaintext back into a permutation, validating
/// that it is indeed a permutation of `[0, num_rows)`.
pub fn decode_index(field: &str, plaintext: &[u8], num_rows: usize) -> Result<Vec<u32>> {
    let expected = num_rows * 4;
    if plaintext.len() != expected {
        return Err(JonxError::IndexInvalid {
            field: field.to_string(),
            reason: format!("expected {expected} bytes, got {}", plaintext.len()),
        });
    }
    let permutation: Vec<u32> = plaintext
        .chunks_exact(4)
        .map(LittleEndian::read_u32)
        .collect();
    validate_permutation(field, &permutation, num_rows)?;
    Ok(permutation)
}

/// Check that `permutation` is a bijection onto `[0, num_rows)`.
pub fn validate_permutation(field: &str, permutation: &[u32], num_rows: usize) -> Result<()> {
    if permutation.len() != num_rows {
        return Err(JonxError::IndexInvalid {
            field: field.to_string(),
            reason: format!("expected {num_rows} entries, got {}", permutation.len()),
        });
    }
    let mut seen = vec![false; num_rows];
    for &p in permutation {
        let p = p as usize;
        if p >= num_rows || seen[p] {
            return Err(JonxError::IndexInvalid {
                field: field.to_string(),
                reason: format!("{p} is not a valid unique position in [0, {num_rows})"),
            });
        }
        seen[p] = true;
    }
    Ok(())
}

/// Check that `permutation` orders `values` non-decreasing:
/// `values[π(i)] <= values[π(i+1)]`.
pub fn validate_ordering(field: &str, permutation: &[u32], values: &[Value]) -> Result<()> {
    for window in permutation.windows(2) {
        let a = values[window[0] as usize]
            .as_f64()
            .ok_or_else(|| JonxError::NotNumeric(field.to_string()))?;
        let b = values[window[1] as usize]
            .as_f64()
            .ok_or_else(|| JonxError::NotNumeric(field.to_string()))?;
        if a.total_cmp(&b) == std::cmp::Ordering::Greater {
            return Err(JonxError::IndexInvalid {
                field: field.to_string(),
                reason: format!("index not sorted: {a} appears before {b}"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|&v| Value::Int(v)).collect()
    }

    #[test]
    fn builds_sorted_permutation() {
        let values = ints(&[30, 10, 20]);
        let permutation = build_index("x", &values).unwrap();
        assert_eq!(permutation, vec![1, 2, 0]);
        for w in permutation.windows(2) {
            let a = values[w[0] as usize].as_f64().unwrap();
            let b = values[w[1] as usize].as_f64().unwrap();
            assert!(a <= b);
        }
    }

    #[test]
    fn ties_preserve_original_order() {
        let values = ints(&[5, 5, 1]);
        let permutation = build_index("x", &values).unwrap();
        assert_eq!(permutation, vec![2, 0, 1]);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let values = ints(&[30, 10, 20]);
        let permutation = build_index("x", &values).unwrap();
        let plaintext = encode_index(&permutation);
        let decoded = decode_index("x", &plaintext, 3).unwrap();
        assert_eq!(decoded, permutation);
    }

    #[test]
    fn rejects_non_permutation() {
        let err = validate_permutation("x", &[0, 0, 2], 3).unwrap_err();
        assert!(matches!(err, JonxError::IndexInvalid { .. }));
    }

    #[test]
    fn rejects_wrong_length() {
        let err = validate_permutation("x", &[0, 1], 3).unwrap_err();
        assert!(matches!(err, JonxError::IndexInvalid { .. }));
    }

    #[test]
    fn rejects_unsorted_ordering() {
        let values = ints(&[1, 2, 3]);
        let err = validate_ordering("x", &[2, 0, 1], &values).unwrap_err();
        assert!(matches!(err, JonxError::IndexInvalid { .. }));
    }
}
