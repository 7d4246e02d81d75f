//! Semantic field types for the dbstep acceptance-testing library.
//!
//! This module defines [`FieldKind`], the type universe a shape field can
//! declare. Kinds carry their own constraints (decimal precision/scale,
//! string max length, enum members) so that fabrication and coercion can
//! honor them without consulting anything else.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Semantic type of a shape field.
///
/// # YAML Format
///
/// Simple kinds can be specified as strings:
/// ```yaml
/// type: uuid
/// type: int
/// type: text
/// ```
///
/// Constrained kinds use object format:
/// ```yaml
/// type:
///   type: var_char
///   max_length: 64
/// type:
///   type: decimal
///   precision: 10
///   scale: 2
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Boolean value
    Bool,

    /// 16-bit signed integer
    Int16,

    /// 32-bit signed integer
    Int32,

    /// 64-bit signed integer
    Int64,

    /// 32-bit IEEE 754 floating point
    Float32,

    /// 64-bit IEEE 754 floating point
    Float64,

    /// Exact decimal with specified precision and scale
    Decimal {
        /// Total number of digits
        precision: u8,
        /// Number of digits after the decimal point
        scale: u8,
    },

    /// Variable-length character string with a maximum length
    VarChar {
        /// Maximum length
        max_length: u16,
    },

    /// Unbounded text
    Text,

    /// Date only (YYYY-MM-DD)
    Date,

    /// Timestamp (UTC)
    DateTime,

    /// UUID (128-bit)
    Uuid,

    /// Enumeration over a fixed member set
    Enum {
        /// Allowed members
        members: Vec<String>,
    },

    /// Nested record of another registered shape
    Object {
        /// Name of the nested shape
        shape: String,
    },

    /// Sequence of nested records of another registered shape
    ObjectArray {
        /// Name of the element shape
        shape: String,
    },
}

// Custom serialization/deserialization for FieldKind.
// Supports both simple string format ("uuid", "int") and object format
// ({"type": "var_char", "max_length": 64}).

impl Serialize for FieldKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;

        match self {
            // Simple kinds - serialize as string
            Self::Bool => serializer.serialize_str("bool"),
            Self::Int16 => serializer.serialize_str("small_int"),
            Self::Int32 => serializer.serialize_str("int"),
            Self::Int64 => serializer.serialize_str("big_int"),
            Self::Float32 => serializer.serialize_str("float"),
            Self::Float64 => serializer.serialize_str("double"),
            Self::Text => serializer.serialize_str("text"),
            Self::Date => serializer.serialize_str("date"),
            Self::DateTime => serializer.serialize_str("date_time"),
            Self::Uuid => serializer.serialize_str("uuid"),

            // Constrained kinds - serialize as map
            Self::Decimal { precision, scale } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", "decimal")?;
                map.serialize_entry("precision", precision)?;
                map.serialize_entry("scale", scale)?;
                map.end()
            }
            Self::VarChar { max_length } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "var_char")?;
                map.serialize_entry("max_length", max_length)?;
                map.end()
            }
            Self::Enum { members } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "enum")?;
                map.serialize_entry("members", members)?;
                map.end()
            }
            Self::Object { shape } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "object")?;
                map.serialize_entry("shape", shape)?;
                map.end()
            }
            Self::ObjectArray { shape } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "object_array")?;
                map.serialize_entry("shape", shape)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for FieldKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{Error, MapAccess, Visitor};

        struct FieldKindVisitor;

        fn simple_kind(name: &str) -> Option<FieldKind> {
            match name {
                "bool" => Some(FieldKind::Bool),
                "small_int" | "smallint" => Some(FieldKind::Int16),
                "int" => Some(FieldKind::Int32),
                "big_int" | "bigint" => Some(FieldKind::Int64),
                "float" => Some(FieldKind::Float32),
                "double" => Some(FieldKind::Float64),
                "text" => Some(FieldKind::Text),
                "date" => Some(FieldKind::Date),
                "date_time" | "datetime" => Some(FieldKind::DateTime),
                "uuid" => Some(FieldKind::Uuid),
                _ => None,
            }
        }

        impl<'de> Visitor<'de> for FieldKindVisitor {
            type Value = FieldKind;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or map representing a FieldKind")
            }

            // Handle string format: "uuid", "int", etc.
            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                simple_kind(value)
                    .ok_or_else(|| E::custom(format!("unknown simple field kind: {value}")))
            }

            // Handle map format: {"type": "var_char", "max_length": 64}
            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut kind_name: Option<String> = None;
                let mut fields: HashMap<String, serde_yaml::Value> = HashMap::new();

                while let Some(key) = map.next_key::<String>()? {
                    if key == "type" {
                        kind_name = Some(map.next_value()?);
                    } else {
                        fields.insert(key, map.next_value()?);
                    }
                }

                let kind_name = kind_name.ok_or_else(|| M::Error::missing_field("type"))?;

                if let Some(kind) = simple_kind(&kind_name) {
                    return Ok(kind);
                }

                match kind_name.as_str() {
                    "decimal" => {
                        let precision = get_field_required(&fields, "precision")?;
                        let scale = get_field_required(&fields, "scale")?;
                        Ok(FieldKind::Decimal { precision, scale })
                    }
                    "var_char" | "varchar" => {
                        let max_length = get_field_required(&fields, "max_length")?;
                        Ok(FieldKind::VarChar { max_length })
                    }
                    "enum" => {
                        let members = get_field_required(&fields, "members")?;
                        Ok(FieldKind::Enum { members })
                    }
                    "object" => {
                        let shape = get_field_required(&fields, "shape")?;
                        Ok(FieldKind::Object { shape })
                    }
                    "object_array" => {
                        let shape = get_field_required(&fields, "shape")?;
                        Ok(FieldKind::ObjectArray { shape })
                    }
                    _ => Err(M::Error::custom(format!("unknown field kind: {kind_name}"))),
                }
            }
        }

        deserializer.deserialize_any(FieldKindVisitor)
    }
}

fn get_field_required<T: for<'de> Deserialize<'de>, E: serde::de::Error>(
    fields: &HashMap<String, serde_yaml::Value>,
    key: &'static str,
) -> Result<T, E> {
    let value = fields.get(key).ok_or_else(|| E::missing_field(key))?;
    serde_yaml::from_value(value.clone())
        .map_err(|e| E::custom(format!("invalid field '{key}': {e}")))
}

impl FieldKind {
    /// Create a new Decimal kind with the given precision and scale.
    pub fn decimal(precision: u8, scale: u8) -> Self {
        Self::Decimal { precision, scale }
    }

    /// Create a new VarChar kind with the given maximum length.
    pub fn varchar(max_length: u16) -> Self {
        Self::VarChar { max_length }
    }

    /// Create a new Enum kind with the given members.
    pub fn enumeration(members: Vec<String>) -> Self {
        Self::Enum { members }
    }

    /// Create a new Object kind referencing the named shape.
    pub fn object(shape: impl Into<String>) -> Self {
        Self::Object {
            shape: shape.into(),
        }
    }

    /// Create a new ObjectArray kind referencing the named element shape.
    pub fn object_array(shape: impl Into<String>) -> Self {
        Self::ObjectArray {
            shape: shape.into(),
        }
    }

    /// Check if this kind represents a numeric type.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Int16
                | Self::Int32
                | Self::Int64
                | Self::Float32
                | Self::Float64
                | Self::Decimal { .. }
        )
    }

    /// Check if this kind represents a string type.
    pub fn is_string(&self) -> bool {
        matches!(self, Self::VarChar { .. } | Self::Text | Self::Enum { .. })
    }

    /// Check if this kind represents a temporal type.
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::DateTime)
    }

    /// Check if this kind nests another shape.
    pub fn is_nested(&self) -> bool {
        matches!(self, Self::Object { .. } | Self::ObjectArray { .. })
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int16 => write!(f, "small_int"),
            Self::Int32 => write!(f, "int"),
            Self::Int64 => write!(f, "big_int"),
            Self::Float32 => write!(f, "float"),
            Self::Float64 => write!(f, "double"),
            Self::Decimal { precision, scale } => write!(f, "decimal({precision},{scale})"),
            Self::VarChar { max_length } => write!(f, "var_char({max_length})"),
            Self::Text => write!(f, "text"),
            Self::Date => write!(f, "date"),
            Self::DateTime => write!(f, "date_time"),
            Self::Uuid => write!(f, "uuid"),
            Self::Enum { .. } => write!(f, "enum"),
            Self::Object { shape } => write!(f, "object({shape})"),
            Self::ObjectArray { shape } => write!(f, "object_array({shape})"),
        }
    }
}
