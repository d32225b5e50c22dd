//! The closed set of physical column types a JONX schema can assign.

use serde::{Deserialize, Serialize};

/// A column's physical storage type, as assigned by type inference and
/// recorded in the schema's `types` map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhysicalType {
    Int16,
    Int32,
    Float16,
    Float32,
    Bool,
    Str,
    Json,
}

impl PhysicalType {
    /// The on-disk tag string used in the schema JSON's `types` map.
    pub fn tag(self) -> &'static str {
        match self {
            PhysicalType::Int16 => "int16",
            PhysicalType::Int32 => "int32",
            PhysicalType::Float16 => "float16",
            PhysicalType::Float32 => "float32",
            PhysicalType::Bool => "bool",
            PhysicalType::Str => "str",
            PhysicalType::Json => "json",
        }
    }

    /// Parse a schema type tag back into a `PhysicalType`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "int16" => PhysicalType::Int16,
            "int32" => PhysicalType::Int32,
            "float16" => PhysicalType::Float16,
            "float32" => PhysicalType::Float32,
            "bool" => PhysicalType::Bool,
            "str" => PhysicalType::Str,
            "json" => PhysicalType::Json,
            _ => return None,
        })
    }

    /// Fixed byte width of one value, or `None` for variable-length types
    /// (`str`, `json`).
    pub fn fixed_width(self) -> Option<usize> {
        use crate::jonx::constants::*;
        match self {
            PhysicalType::Int16 => Some(WIDTH_INT16),
            PhysicalType::Int32 => Some(WIDTH_INT32),
            PhysicalType::Float16 => Some(WIDTH_FLOAT16),
            PhysicalType::Float32 => Some(WIDTH_FLOAT32),
            PhysicalType::Bool => Some(WIDTH_BOOL),
            PhysicalType::Str | PhysicalType::Json => None,
        }
    }

    /// Whether this type is eligible for an argsort index (numeric columns
    /// only).
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            PhysicalType::Int16 | PhysicalType::Int32 | PhysicalType::Float16 | PhysicalType::Float32
        )
    }
}

impl std::fmt::Display for PhysicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_roundtrip() {
        for t in [
            PhysicalType::Int16,
            PhysicalType::Int32,
            PhysicalType::Float16,
            PhysicalType::Float32,
            PhysicalType::Bool,
            PhysicalType::Str,
            PhysicalType::Json,
        ] {
            assert_eq!(PhysicalType::from_tag(t.tag()), Some(t));
        }
        assert_eq!(PhysicalType::from_tag("bogus"), None);
    }

    #[test]
    fn numeric_classification() {
        assert!(PhysicalType::Int16.is_numeric());
        assert!(PhysicalType::Float32.is_numeric());
        assert!(!PhysicalType::Bool.is_numeric());
        assert!(!PhysicalType::Str.is_numeric());
        assert!(!PhysicalType::Json.is_numeric());
    }
}
