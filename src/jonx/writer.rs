//! File assembler: transpose records into columns, infer types, and
//! assemble the byte-exact container.

use byteorder::{ByteOrder, LittleEndian};
use std::io::Write;
use std::path::Path;

use serde_json::{Map, Value as JsonValue};

use crate::jonx::column::encode_column;
use crate::jonx::error::{JonxError, Result};
use crate::jonx::frame::write_frame;
use crate::jonx::index::{build_index, encode_index};
use crate::jonx::schema::{encode_header, Schema};
use crate::jonx::types::PhysicalType;

/// One input row: a JSON object mapping field name to value. Key order is
/// significant the first time a field is seen — it determines schema field
/// order.
pub type Record = Map<String, JsonValue>;

/// Encode a sequence of records into a complete JONX file, held in memory.
///
/// Steps: transpose records into per-field value vectors, infer types,
/// write the header, write the schema frame, write each column frame in
/// schema order, then compute and write the index section.
pub fn encode_records(records: &[Record]) -> Result<Vec<u8>> {
    let fields = collect_field_order(records);
    let num_rows = records.len();

    let mut columns: Vec<(String, PhysicalType, Vec<JsonValue>)> = Vec::with_capacity(fields.len());
    for field in &fields {
        let mut values = Vec::with_capacity(num_rows);
        for (row, record) in records.iter().enumerate() {
            let v = record.get(field).ok_or_else(|| JonxError::MissingField {
                row,
                field: field.clone(),
            })?;
            values.push(v.clone());
        }
        let ty = crate::jonx::infer::infer_column_type(field, &values)?;
        columns.push((field.clone(), ty, values));
    }

    let mut types = std::collections::HashMap::with_capacity(fields.len());
    for (field, ty, _) in &columns {
        types.insert(field.clone(), *ty);
    }
    let schema = Schema::new(fields.clone(), types, num_rows);

    let mut out = Vec::new();
    out.write_all(&encode_header())
        .map_err(|e| JonxError::Io(e.to_string()))?;
    write_frame(&mut out, &schema.to_plaintext()?)?;

    let mut decoded_columns: Vec<(String, PhysicalType, Vec<crate::jonx::value::Value>)> =
        Vec::with_capacity(columns.len());
    for (field, ty, values) in &columns {
        let plaintext = encode_column(field, *ty, values)?;
        write_frame(&mut out, &plaintext)?;
        let decoded = crate::jonx::column::decode_column(field, *ty, num_rows, &plaintext)?;
        decoded_columns.push((field.clone(), *ty, decoded));
    }

    write_index_section(&mut out, &decoded_columns)?;

    Ok(out)
}

fn write_index_section(
    out: &mut Vec<u8>,
    columns: &[(String, PhysicalType, Vec<crate::jonx::value::Value>)],
) -> Result<()> {
    let numeric: Vec<&(String, PhysicalType, Vec<crate::jonx::value::Value>)> =
        columns.iter().filter(|(_, ty, _)| ty.is_numeric()).collect();

    let mut count_buf = [0u8; 4];
    LittleEndian::write_u32(&mut count_buf, numeric.len() as u32);
    out.write_all(&count_buf)
        .map_err(|e| JonxError::Io(e.to_string()))?;

    for (field, _, values) in numeric {
        let permutation = build_index(field, values)?;

        let name_bytes = field.as_bytes();
        let mut len_buf = [0u8; 4];
        LittleEndian::write_u32(&mut len_buf, name_bytes.len() as u32);
        out.write_all(&len_buf)
            .map_err(|e| JonxError::Io(e.to_string()))?;
        out.write_all(name_bytes)
            .map_err(|e| JonxError::Io(e.to_string()))?;

        write_frame(out, &encode_index(&permutation))?;
    }

    Ok(())
}

/// Determine schema field order: insertion order from the first record,
/// extended by fields appearing later.
fn collect_field_order(records: &[Record]) -> Vec<String> {
    let mut fields = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for record in records {
        for key in record.keys() {
            if seen.insert(key.clone()) {
                fields.push(key.clone());
            }
        }
    }
    fields
}

/// Read a JSON array of records from `source`, encode it, and write the
/// resulting JONX file to `destination`. A thin wrapper around
/// [`encode_records`] — the JSON parser is an opaque collaborator, not
/// reimplemented here.
pub fn encode_file<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Result<()> {
    let source = source.as_ref();
    let text = std::fs::read(source)
        .map_err(|e| JonxError::Io(format!("cannot read {}: {e}", source.display())))?;
    let records: Vec<Record> = serde_json::from_slice(&text).map_err(|e| {
        JonxError::SchemaMalformed(format!("input is not a JSON array of objects: {e}"))
    })?;
    let bytes = encode_records(&records)?;

    let destination = destination.as_ref();
    std::fs::write(destination, bytes)
        .map_err(|e| JonxError::Io(format!("cannot write {}: {e}", destination.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, JsonValue)]) -> Record {
        let mut m = Record::new();
        for (k, v) in pairs {
            m.insert(k.to_string(), v.clone());
        }
        m
    }

    #[test]
    fn encodes_header_and_magic() {
        let records = vec![record(&[("id", json!(1))])];
        let bytes = encode_records(&records).unwrap();
        assert_eq!(&bytes[0..4], b"JONX");
    }

    #[test]
    fn field_order_follows_first_appearance() {
        let records = vec![
            record(&[("id", json!(1)), ("name", json!("a"))]),
            record(&[("extra", json!(true)), ("id", json!(2)), ("name", json!("b"))]),
        ];
        let fields = collect_field_order(&records);
        assert_eq!(fields, vec!["id", "name", "extra"]);
    }

    #[test]
    fn missing_field_is_an_error() {
        let records = vec![
            record(&[("id", json!(1)), ("name", json!("a"))]),
            record(&[("id", json!(2))]),
        ];
        let err = encode_records(&records).unwrap_err();
        assert!(matches!(err, JonxError::MissingField { .. }));
    }

    #[test]
    fn empty_record_sequence_encodes() {
        let records: Vec<Record> = Vec::new();
        let bytes = encode_records(&records).unwrap();
        assert_eq!(&bytes[0..4], b"JONX");
    }
}
