//! Schema representation, header framing, and schema-block (de)serialization.

use byteorder::{ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::jonx::constants::*;
use crate::jonx::error::{JonxError, Result};
use crate::jonx::types::PhysicalType;

/// An ordered field list plus a field -> type map and the row count — the
/// in-memory form of the schema block laid out on disk as the file's first
/// frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<String>,
    types: HashMap<String, PhysicalType>,
    num_rows: usize,
}

/// Wire form of the schema block: a JSON object with `fields`, `types`, and
/// (mandatory on write) `num_rows`.
#[derive(Debug, Serialize, Deserialize)]
struct SchemaWire {
    fields: Vec<String>,
    types: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_rows: Option<u32>,
}

impl Schema {
    /// Build a schema from an ordered field list, inferred types, and row
    /// count. Panics-free: callers are expected to have already inferred
    /// every field's type.
    pub fn new(fields: Vec<String>, types: HashMap<String, PhysicalType>, num_rows: usize) -> Self {
        Schema {
            fields,
            types,
            num_rows,
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn type_of(&self, field: &str) -> Option<PhysicalType> {
        self.types.get(field).copied()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.types.contains_key(field)
    }

    pub fn numeric_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| self.types.get(*f).is_some_and(|t| t.is_numeric()))
            .map(|f| f.as_str())
            .collect()
    }

    /// Structural consistency check backing `check_schema`: every declared
    /// field has a valid type, and there are no duplicate field names.
    /// (Indexed-fields-are-numeric is checked by the reader against the
    /// index directory, since that information lives outside the schema
    /// block itself.)
    pub fn check(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            if !seen.insert(field) {
                return Err(JonxError::SchemaMalformed(format!(
                    "duplicate field name '{field}'"
                )));
            }
            if !self.types.contains_key(field) {
                return Err(JonxError::SchemaMalformed(format!(
                    "field '{field}' has no declared type"
                )));
            }
        }
        Ok(())
    }

    /// Serialize this schema into its frame plaintext (the on-disk JSON
    /// object).
    pub fn to_plaintext(&self) -> Result<Vec<u8>> {
        let types = self
            .fields
            .iter()
            .map(|f| (f.clone(), self.types[f].tag().to_string()))
            .collect();
        let wire = SchemaWire {
            fields: self.fields.clone(),
            types,
            num_rows: Some(self.num_rows as u32),
        };
        serde_json::to_vec(&wire)
            .map_err(|e| JonxError::SchemaMalformed(format!("failed to serialize schema: {e}")))
    }

    /// Parse a schema block's frame plaintext. `fallback_num_rows` is used
    /// only when the schema JSON omits `num_rows` (a defensive fallback for
    /// schemas not produced by this writer).
    pub fn from_plaintext(plaintext: &[u8], fallback_num_rows: impl FnOnce() -> Result<usize>) -> Result<Self> {
        let wire: SchemaWire = serde_json::from_slice(plaintext)
            .map_err(|e| JonxError::SchemaMalformed(format!("not a valid schema object: {e}")))?;

        let mut types = HashMap::with_capacity(wire.types.len());
        for (name, tag) in &wire.types {
            let ty = PhysicalType::from_tag(tag).ok_or_else(|| {
                JonxError::SchemaMalformed(format!("unknown type tag '{tag}' for field '{name}'"))
            })?;
            types.insert(name.clone(), ty);
        }

        let mut seen = std::collections::HashSet::new();
        for field in &wire.fields {
            if !seen.insert(field) {
                return Err(JonxError::SchemaMalformed(format!(
                    "duplicate field name '{field}'"
                )));
            }
            if !types.contains_key(field) {
                return Err(JonxError::SchemaMalformed(format!(
                    "field '{field}' declared with no type"
                )));
            }
        }

        let num_rows = match wire.num_rows {
            Some(n) => n as usize,
            None => fallback_num_rows()?,
        };

        Ok(Schema {
            fields: wire.fields,
            types,
            num_rows,
        })
    }
}

/// Write the 8-byte container header: magic bytes + `u32_le` version.
pub fn encode_header() -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];
    header[..MAGIC.len()].copy_from_slice(&MAGIC);
    LittleEndian::write_u32(&mut header[MAGIC.len()..], VERSION);
    header
}

/// Validate and parse the 8-byte container header.
pub fn decode_header(data: &[u8]) -> Result<()> {
    if data.len() < HEADER_SIZE {
        return Err(JonxError::HeaderInvalid(format!(
            "expected {HEADER_SIZE} header bytes, got {}",
            data.len()
        )));
    }
    if data[..MAGIC.len()] != MAGIC {
        return Err(JonxError::HeaderInvalid(
            "magic bytes do not match 'JONX'".to_string(),
        ));
    }
    let version = LittleEndian::read_u32(&data[MAGIC.len()..HEADER_SIZE]);
    if version != VERSION {
        return Err(JonxError::UnsupportedVersion(version));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Schema {
        let mut types = HashMap::new();
        types.insert("id".to_string(), PhysicalType::Int16);
        types.insert("name".to_string(), PhysicalType::Str);
        Schema::new(vec!["id".to_string(), "name".to_string()], types, 2)
    }

    #[test]
    fn header_roundtrip() {
        let header = encode_header();
        decode_header(&header).unwrap();
    }

    #[test]
    fn rejects_bad_magic() {
        let mut header = encode_header();
        header[0] = b'X';
        let err = decode_header(&header).unwrap_err();
        assert!(matches!(err, JonxError::HeaderInvalid(_)));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut header = encode_header();
        LittleEndian::write_u32(&mut header[MAGIC.len()..], 99);
        let err = decode_header(&header).unwrap_err();
        assert!(matches!(err, JonxError::UnsupportedVersion(99)));
    }

    #[test]
    fn schema_roundtrip_preserves_num_rows_and_types() {
        let schema = sample_schema();
        let plaintext = schema.to_plaintext().unwrap();
        let decoded = Schema::from_plaintext(&plaintext, || unreachable!()).unwrap();
        assert_eq!(decoded.num_rows(), 2);
        assert_eq!(decoded.type_of("id"), Some(PhysicalType::Int16));
        assert_eq!(decoded.fields(), schema.fields());
    }

    #[test]
    fn falls_back_to_derived_num_rows_when_absent() {
        let plaintext =
            br#"{"fields":["id"],"types":{"id":"int16"}}"#.to_vec();
        let decoded = Schema::from_plaintext(&plaintext, || Ok(5)).unwrap();
        assert_eq!(decoded.num_rows(), 5);
    }

    #[test]
    fn rejects_unknown_type_tag() {
        let plaintext = br#"{"fields":["id"],"types":{"id":"decimal"},"num_rows":1}"#.to_vec();
        let err = Schema::from_plaintext(&plaintext, || unreachable!()).unwrap_err();
        assert!(matches!(err, JonxError::SchemaMalformed(_)));
    }

    #[test]
    fn check_rejects_duplicate_fields() {
        let mut types = HashMap::new();
        types.insert("id".to_string(), PhysicalType::Int16);
        let schema = Schema::new(vec!["id".to_string(), "id".to_string()], types, 1);
        assert!(schema.check().is_err());
    }
}
