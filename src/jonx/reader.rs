//! File assembler: open a JONX byte slice or file, lazily walk its column
//! directory, and serve typed column reads, indexed extrema, and
//! aggregate/validation queries without materializing the whole file.

use std::collections::HashMap;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::jonx::column::decode_column;
use crate::jonx::error::{JonxError, Result};
use crate::jonx::frame::{frame_span, read_frame_at};
use crate::jonx::index::{decode_index, validate_ordering, validate_permutation};
use crate::jonx::schema::{decode_header, Schema};
use crate::jonx::value::Value;

/// A column or index frame's location within the file, recorded once the
/// directory has been walked.
#[derive(Debug, Clone, Copy)]
struct FrameSpan {
    offset: usize,
    total_len: usize,
}

/// A lazily-opened JONX file. Holds the decoded header and schema up front
/// (cheap: one small frame) but defers locating column and index frames
/// until the first operation that needs them (`warm_directory`, or any
/// method that calls it internally).
///
/// Directory population mutates `self` and is not safe to race across
/// threads; callers sharing a reader across threads should call
/// [`JonxReader::warm_directory`] once up front, then only issue `&self`
/// reads — this type has no internal locking of its own.
pub struct JonxReader {
    data: Vec<u8>,
    schema: Schema,
    columns_offset: usize,
    column_dir: Option<HashMap<String, FrameSpan>>,
    index_dir: Option<HashMap<String, FrameSpan>>,
}

/// Structural/file summary returned by `info()`.
#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub fields: Vec<String>,
    pub types: HashMap<String, String>,
    pub num_rows: usize,
    pub column_count: usize,
    pub indexed_fields: Vec<String>,
    pub file_size: usize,
}

/// Result of `check_schema`/`validate`: every problem found, collected into
/// one report rather than aborting at the first error.
#[derive(Debug, Clone, Serialize, Default)]
pub struct CheckReport {
    pub errors: Vec<String>,
}

impl CheckReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl JonxReader {
    /// Open a JONX file already held in memory.
    pub fn open_bytes(data: Vec<u8>) -> Result<Self> {
        decode_header(&data)?;
        let (plaintext, schema_frame_len) = read_frame_at(&data, crate::jonx::constants::HEADER_SIZE)?;
        let fallback_num_rows = {
            let data = &data;
            let columns_offset = crate::jonx::constants::HEADER_SIZE + schema_frame_len;
            move || -> Result<usize> {
                // Defensive path only: schemas written by this crate always
                // carry num_rows explicitly.
                Err(JonxError::SchemaMalformed(format!(
                    "num_rows missing from schema and no column frame available at offset {columns_offset} to derive it from: {}",
                    data.len()
                )))
            }
        };
        let schema = Schema::from_plaintext(&plaintext, fallback_num_rows)?;
        schema.check()?;

        Ok(JonxReader {
            columns_offset: crate::jonx::constants::HEADER_SIZE + schema_frame_len,
            data,
            schema,
            column_dir: None,
            index_dir: None,
        })
    }

    /// Open a JONX file from disk. A thin wrapper over [`Self::open_bytes`]
    /// that reads the file into memory first; the lazy directory walk and
    /// column decoding happen exactly as they would for an in-memory slice.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| JonxError::Io(format!("cannot read {}: {e}", path.display())))?;
        Self::open_bytes(data)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Walk the column and index frames once, recording each one's file
    /// offset and span without decompressing any of them. Idempotent: a
    /// second call is a no-op.
    pub fn warm_directory(&mut self) -> Result<()> {
        if self.column_dir.is_some() {
            return Ok(());
        }

        let mut offset = self.columns_offset;
        let mut column_dir = HashMap::with_capacity(self.schema.fields().len());
        for field in self.schema.fields() {
            let total_len = frame_span(&self.data, offset).map_err(|e| {
                log::warn!("directory walk failed at column '{field}': {e}");
                e
            })?;
            column_dir.insert(field.clone(), FrameSpan { offset, total_len });
            offset += total_len;
        }

        if offset + 4 > self.data.len() {
            return Err(JonxError::FrameTruncated(format!(
                "expected an index section count at offset {offset}"
            )));
        }
        let index_count =
            LittleEndian::read_u32(&self.data[offset..offset + 4]) as usize;
        offset += 4;

        let mut index_dir = HashMap::with_capacity(index_count);
        for _ in 0..index_count {
            if offset + 4 > self.data.len() {
                return Err(JonxError::FrameTruncated(
                    "index section truncated: missing a field name length".to_string(),
                ));
            }
            let name_len =
                LittleEndian::read_u32(&self.data[offset..offset + 4]) as usize;
            offset += 4;
            if offset + name_len > self.data.len() {
                return Err(JonxError::FrameTruncated(
                    "index section truncated: missing a field name".to_string(),
                ));
            }
            let name = std::str::from_utf8(&self.data[offset..offset + name_len])
                .map_err(|e| JonxError::IndexInvalid {
                    field: "<index section>".to_string(),
                    reason: format!("field name is not valid UTF-8: {e}"),
                })?
                .to_string();
            offset += name_len;

            let total_len = frame_span(&self.data, offset)?;
            index_dir.insert(name, FrameSpan { offset, total_len });
            offset += total_len;
        }

        self.column_dir = Some(column_dir);
        self.index_dir = Some(index_dir);
        Ok(())
    }

    fn column_span(&mut self, field: &str) -> Result<FrameSpan> {
        if !self.schema.has_field(field) {
            return Err(JonxError::UnknownField(field.to_string()));
        }
        self.warm_directory()?;
        Ok(self.column_dir.as_ref().unwrap()[field])
    }

    fn index_span(&mut self, field: &str) -> Result<Option<FrameSpan>> {
        self.warm_directory()?;
        Ok(self.index_dir.as_ref().unwrap().get(field).copied())
    }

    /// Decompress exactly one column's frame and decode it: reading one
    /// column out of a K-column file decompresses exactly that one frame.
    pub fn get_column(&mut self, field: &str) -> Result<Vec<Value>> {
        let span = self.column_span(field)?;
        let ty = self.schema.type_of(field).unwrap();
        let num_rows = self.schema.num_rows();
        let (plaintext, _) = read_frame_at(&self.data, span.offset).map_err(|e| {
            log::warn!("failed to decompress column '{field}': {e}");
            e
        })?;
        decode_column(field, ty, num_rows, &plaintext)
    }

    /// Decompress and decode several columns, reusing one directory warm-up.
    pub fn get_columns(&mut self, fields: &[&str]) -> Result<HashMap<String, Vec<Value>>> {
        let mut out = HashMap::with_capacity(fields.len());
        for &field in fields {
            out.insert(field.to_string(), self.get_column(field)?);
        }
        Ok(out)
    }

    fn require_numeric(&self, field: &str) -> Result<()> {
        match self.schema.type_of(field) {
            None => Err(JonxError::UnknownField(field.to_string())),
            Some(ty) if !ty.is_numeric() => Err(JonxError::NotNumeric(field.to_string())),
            Some(_) => Ok(()),
        }
    }

    /// Read the stored permutation for `field`, validating it is a genuine
    /// permutation of `[0, N)` before returning it.
    fn load_index(&mut self, field: &str) -> Result<Option<Vec<u32>>> {
        let span = match self.index_span(field)? {
            Some(span) => span,
            None => return Ok(None),
        };
        let num_rows = self.schema.num_rows();
        let (plaintext, _) = read_frame_at(&self.data, span.offset)?;
        let permutation = decode_index(field, &plaintext, num_rows)?;
        Ok(Some(permutation))
    }

    /// Smallest value of a numeric column. With an on-disk index
    /// (`use_index = true` and one is present), this decompresses only the
    /// index frame and the column frame. Otherwise it linearly scans the
    /// decompressed column.
    pub fn find_min(&mut self, field: &str, use_index: bool) -> Result<Value> {
        self.find_extremum(field, use_index, true)
    }

    /// Largest value of a numeric column. See [`Self::find_min`].
    pub fn find_max(&mut self, field: &str, use_index: bool) -> Result<Value> {
        self.find_extremum(field, use_index, false)
    }

    fn find_extremum(&mut self, field: &str, use_index: bool, want_min: bool) -> Result<Value> {
        self.require_numeric(field)?;
        if self.schema.num_rows() == 0 {
            return Err(JonxError::ColumnDecodeError {
                field: field.to_string(),
                reason: "column has zero rows, no extremum exists".to_string(),
            });
        }

        if use_index {
            if let Some(permutation) = self.load_index(field)? {
                let row = if want_min {
                    permutation[0]
                } else {
                    permutation[permutation.len() - 1]
                };
                let column = self.get_column(field)?;
                return Ok(column[row as usize].clone());
            }
        }

        let column = self.get_column(field)?;
        let mut best = column[0].as_f64().ok_or_else(|| JonxError::NotNumeric(field.to_string()))?;
        let mut best_value = column[0].clone();
        for value in &column[1..] {
            let key = value.as_f64().ok_or_else(|| JonxError::NotNumeric(field.to_string()))?;
            let better = if want_min {
                key.total_cmp(&best) == std::cmp::Ordering::Less
            } else {
                key.total_cmp(&best) == std::cmp::Ordering::Greater
            };
            if better {
                best = key;
                best_value = value.clone();
            }
        }
        Ok(best_value)
    }

    /// Sum of a numeric column's decompressed values.
    pub fn sum(&mut self, field: &str) -> Result<f64> {
        self.require_numeric(field)?;
        let column = self.get_column(field)?;
        let mut total = 0.0;
        for value in &column {
            total += value
                .as_f64()
                .ok_or_else(|| JonxError::NotNumeric(field.to_string()))?;
        }
        Ok(total)
    }

    /// Arithmetic mean of a numeric column. Errors on an empty column rather
    /// than returning `NaN`.
    pub fn avg(&mut self, field: &str) -> Result<f64> {
        self.require_numeric(field)?;
        let num_rows = self.schema.num_rows();
        if num_rows == 0 {
            return Err(JonxError::ColumnDecodeError {
                field: field.to_string(),
                reason: "column has zero rows, no average exists".to_string(),
            });
        }
        Ok(self.sum(field)? / num_rows as f64)
    }

    /// Total row count of the file, from the schema (no decompression).
    pub fn count(&self) -> usize {
        self.schema.num_rows()
    }

    /// Row count of a specific field (identical to [`Self::count`] since
    /// JONX has no nulls, but validates the field exists first).
    pub fn count_field(&self, field: &str) -> Result<usize> {
        if !self.schema.has_field(field) {
            return Err(JonxError::UnknownField(field.to_string()));
        }
        Ok(self.schema.num_rows())
    }

    /// Whether `field` is numeric per the schema.
    pub fn is_numeric(&self, field: &str) -> Result<bool> {
        self.schema
            .type_of(field)
            .map(|ty| ty.is_numeric())
            .ok_or_else(|| JonxError::UnknownField(field.to_string()))
    }

    /// Whether `field` has a stored argsort index.
    pub fn has_index(&mut self, field: &str) -> Result<bool> {
        if !self.schema.has_field(field) {
            return Err(JonxError::UnknownField(field.to_string()));
        }
        Ok(self.index_span(field)?.is_some())
    }

    /// Structural/size summary of the open file.
    pub fn info(&mut self) -> Result<FileInfo> {
        self.warm_directory()?;
        let types = self
            .schema
            .fields()
            .iter()
            .map(|f| (f.clone(), self.schema.type_of(f).unwrap().tag().to_string()))
            .collect();
        let indexed_fields = self
            .index_dir
            .as_ref()
            .unwrap()
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        Ok(FileInfo {
            fields: self.schema.fields().to_vec(),
            types,
            num_rows: self.schema.num_rows(),
            column_count: self.schema.fields().len(),
            indexed_fields,
            file_size: self.data.len(),
        })
    }

    /// Structural consistency check: schema validity plus "every indexed
    /// field is numeric". Never decompresses a column payload — only the
    /// header, schema, and frame length prefixes are read.
    pub fn check_schema(&mut self) -> Result<CheckReport> {
        let mut report = CheckReport::default();
        if let Err(e) = self.schema.check() {
            report.errors.push(e.to_string());
        }
        self.warm_directory()?;
        for field in self.index_dir.as_ref().unwrap().keys() {
            match self.schema.type_of(field) {
                None => report
                    .errors
                    .push(format!("index present for unknown field '{field}'")),
                Some(ty) if !ty.is_numeric() => report.errors.push(format!(
                    "index present for non-numeric field '{field}' ({ty})"
                )),
                Some(_) => {}
            }
        }
        Ok(report)
    }

    /// Full validation: decompress every column and index frame, re-check
    /// column lengths, and re-check that each index is a genuine sorted
    /// permutation of its column. Collects every problem found into one
    /// report instead of stopping at the first.
    pub fn validate(&mut self) -> Result<CheckReport> {
        let mut report = self.check_schema()?;

        let fields: Vec<String> = self.schema.fields().to_vec();
        let mut decoded: HashMap<String, Vec<Value>> = HashMap::with_capacity(fields.len());
        for field in &fields {
            match self.get_column(field) {
                Ok(values) => {
                    decoded.insert(field.clone(), values);
                }
                Err(e) => report.errors.push(format!("column '{field}': {e}")),
            }
        }

        let index_fields: Vec<String> = self.index_dir.as_ref().unwrap().keys().cloned().collect();
        for field in &index_fields {
            let permutation = match self.load_index(field) {
                Ok(Some(p)) => p,
                Ok(None) => continue,
                Err(e) => {
                    report.errors.push(format!("index '{field}': {e}"));
                    continue;
                }
            };
            if let Err(e) = validate_permutation(field, &permutation, self.schema.num_rows()) {
                report.errors.push(e.to_string());
                continue;
            }
            if let Some(values) = decoded.get(field) {
                if let Err(e) = validate_ordering(field, &permutation, values) {
                    report.errors.push(e.to_string());
                }
            }
        }

        Ok(report)
    }
}

/// Decode a complete JONX byte slice back into its schema and row-major
/// records. Unlike the rest of this module, this fully materializes the
/// file: every column is decompressed.
pub fn decode_bytes(data: Vec<u8>) -> Result<(Schema, Vec<serde_json::Map<String, serde_json::Value>>)> {
    let mut reader = JonxReader::open_bytes(data)?;
    let fields = reader.schema().fields().to_vec();
    let num_rows = reader.schema().num_rows();

    let mut columns = Vec::with_capacity(fields.len());
    for field in &fields {
        columns.push(reader.get_column(field)?);
    }

    let mut records = Vec::with_capacity(num_rows);
    for row in 0..num_rows {
        let mut record = serde_json::Map::with_capacity(fields.len());
        for (field, column) in fields.iter().zip(&columns) {
            record.insert(field.clone(), column[row].to_json());
        }
        records.push(record);
    }

    Ok((reader.schema().clone(), records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jonx::writer::{encode_records, Record};
    use serde_json::json;

    fn record(pairs: &[(&str, serde_json::Value)]) -> Record {
        let mut m = Record::new();
        for (k, v) in pairs {
            m.insert(k.to_string(), v.clone());
        }
        m
    }

    fn sample_bytes() -> Vec<u8> {
        let records = vec![
            record(&[("id", json!(3)), ("name", json!("c")), ("ok", json!(true))]),
            record(&[("id", json!(1)), ("name", json!("a")), ("ok", json!(false))]),
            record(&[("id", json!(2)), ("name", json!("b")), ("ok", json!(true))]),
        ];
        encode_records(&records).unwrap()
    }

    #[test]
    fn opens_and_reads_one_column() {
        let mut reader = JonxReader::open_bytes(sample_bytes()).unwrap();
        let ids = reader.get_column("id").unwrap();
        assert_eq!(ids, vec![Value::Int(3), Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn unknown_field_errors() {
        let mut reader = JonxReader::open_bytes(sample_bytes()).unwrap();
        let err = reader.get_column("nope").unwrap_err();
        assert!(matches!(err, JonxError::UnknownField(_)));
    }

    #[test]
    fn find_min_max_agree_with_and_without_index() {
        let mut reader = JonxReader::open_bytes(sample_bytes()).unwrap();
        assert_eq!(reader.find_min("id", true).unwrap(), Value::Int(1));
        assert_eq!(reader.find_min("id", false).unwrap(), Value::Int(1));
        assert_eq!(reader.find_max("id", true).unwrap(), Value::Int(3));
        assert_eq!(reader.find_max("id", false).unwrap(), Value::Int(3));
    }

    #[test]
    fn find_min_on_non_numeric_errors() {
        let mut reader = JonxReader::open_bytes(sample_bytes()).unwrap();
        let err = reader.find_min("name", true).unwrap_err();
        assert!(matches!(err, JonxError::NotNumeric(_)));
    }

    #[test]
    fn sum_and_avg() {
        let mut reader = JonxReader::open_bytes(sample_bytes()).unwrap();
        assert_eq!(reader.sum("id").unwrap(), 6.0);
        assert_eq!(reader.avg("id").unwrap(), 2.0);
    }

    #[test]
    fn count_matches_row_count() {
        let reader = JonxReader::open_bytes(sample_bytes()).unwrap();
        assert_eq!(reader.count(), 3);
        assert_eq!(reader.count_field("id").unwrap(), 3);
    }

    #[test]
    fn info_reports_fields_and_indexes() {
        let mut reader = JonxReader::open_bytes(sample_bytes()).unwrap();
        let info = reader.info().unwrap();
        assert_eq!(info.num_rows, 3);
        assert_eq!(info.column_count, 3);
        assert!(info.indexed_fields.contains(&"id".to_string()));
        assert!(!info.indexed_fields.contains(&"name".to_string()));
    }

    #[test]
    fn has_index_matches_numeric_columns() {
        let mut reader = JonxReader::open_bytes(sample_bytes()).unwrap();
        assert!(reader.has_index("id").unwrap());
        assert!(!reader.has_index("name").unwrap());
    }

    #[test]
    fn check_schema_passes_on_well_formed_file() {
        let mut reader = JonxReader::open_bytes(sample_bytes()).unwrap();
        let report = reader.check_schema().unwrap();
        assert!(report.is_valid());
    }

    #[test]
    fn validate_passes_on_well_formed_file() {
        let mut reader = JonxReader::open_bytes(sample_bytes()).unwrap();
        let report = reader.validate().unwrap();
        assert!(report.is_valid());
    }

    #[test]
    fn validate_reports_corrupted_column_without_failing_other_fields() {
        let mut bytes = sample_bytes();
        // Flip a byte inside the id column's compressed payload (first frame
        // after header + schema frame) without touching the rest of the
        // file, then confirm validate surfaces exactly that column's error.
        let mut probe = JonxReader::open_bytes(bytes.clone()).unwrap();
        probe.warm_directory().unwrap();
        let id_span = probe.column_dir.as_ref().unwrap()["id"];
        let corrupt_at = id_span.offset + id_span.total_len - 1;
        bytes[corrupt_at] ^= 0xff;

        let mut reader = JonxReader::open_bytes(bytes).unwrap();
        let report = reader.validate().unwrap();
        assert!(!report.is_valid());
        assert!(reader.get_column("name").is_ok());
    }

    #[test]
    fn decode_bytes_reassembles_records() {
        let (schema, records) = decode_bytes(sample_bytes()).unwrap();
        assert_eq!(schema.num_rows(), 3);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["id"], json!(3));
        assert_eq!(records[1]["name"], json!("a"));
    }

    #[test]
    fn empty_file_round_trips() {
        let bytes = encode_records(&[]).unwrap();
        let mut reader = JonxReader::open_bytes(bytes).unwrap();
        assert_eq!(reader.count(), 0);
        let report = reader.validate().unwrap();
        assert!(report.is_valid());
    }
}
