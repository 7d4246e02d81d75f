//! Value representations for the dbstep acceptance-testing library.
//!
//! This module defines [`Value`], the typed runtime value a fabricated or
//! scenario-assigned field holds, [`Record`], an ordered field/value
//! container produced by fabrication, and the text coercion that turns a
//! scenario table cell into a typed value.

use crate::types::FieldKind;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

/// A typed runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean value
    Bool(bool),

    /// 16-bit signed integer
    Int16(i16),

    /// 32-bit signed integer
    Int32(i32),

    /// 64-bit signed integer
    Int64(i64),

    /// 32-bit floating point
    Float32(f32),

    /// 64-bit floating point
    Float64(f64),

    /// Exact decimal
    Decimal(Decimal),

    /// String value
    String(String),

    /// Date value
    Date(NaiveDate),

    /// Timestamp (UTC)
    DateTime(DateTime<Utc>),

    /// UUID value
    Uuid(Uuid),

    /// Nested record
    Record(Record),

    /// Sequence of values
    Array(Vec<Value>),

    /// Null value
    Null,
}

/// Error raised when a text cell cannot be interpreted as the target kind.
#[derive(Debug, thiserror::Error)]
#[error("cannot interpret '{text}' as {target}")]
pub struct CoercionError {
    /// The offending cell text
    pub text: String,
    /// Display name of the target kind
    pub target: String,
}

impl CoercionError {
    fn new(text: &str, kind: &FieldKind) -> Self {
        Self {
            text: text.to_string(),
            target: kind.to_string(),
        }
    }
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Try to get this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an i64, widening smaller integers.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int16(i) => Some(*i as i64),
            Self::Int32(i) => Some(*i as i64),
            Self::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as an f64, widening f32.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float32(f) => Some(*f as f64),
            Self::Float64(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get this value as a decimal.
    pub fn as_decimal(&self) -> Option<&Decimal> {
        match self {
            Self::Decimal(d) => Some(d),
            _ => None,
        }
    }

    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a date.
    pub fn as_date(&self) -> Option<&NaiveDate> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }

    /// Try to get this value as a timestamp.
    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Try to get this value as a UUID.
    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Uuid(u) => Some(u),
            _ => None,
        }
    }

    /// Try to get this value as a nested record.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Try to get this value as an array.
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Coerce a text cell into a typed value for the given kind.
    ///
    /// Coercion is total over the scalar kinds and rejects nested kinds
    /// explicitly rather than silently defaulting.
    pub fn coerce(text: &str, kind: &FieldKind) -> Result<Value, CoercionError> {
        let err = || CoercionError::new(text, kind);
        match kind {
            FieldKind::Bool => match text.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Value::Bool(true)),
                "false" | "0" => Ok(Value::Bool(false)),
                _ => Err(err()),
            },
            FieldKind::Int16 => text
                .trim()
                .parse()
                .map(Value::Int16)
                .map_err(|_| err()),
            FieldKind::Int32 => text
                .trim()
                .parse()
                .map(Value::Int32)
                .map_err(|_| err()),
            FieldKind::Int64 => text
                .trim()
                .parse()
                .map(Value::Int64)
                .map_err(|_| err()),
            FieldKind::Float32 => text
                .trim()
                .parse()
                .map(Value::Float32)
                .map_err(|_| err()),
            FieldKind::Float64 => text
                .trim()
                .parse()
                .map(Value::Float64)
                .map_err(|_| err()),
            FieldKind::Decimal { .. } => Decimal::from_str(text.trim())
                .map(Value::Decimal)
                .map_err(|_| err()),
            FieldKind::VarChar { .. } | FieldKind::Text => Ok(Value::String(text.to_string())),
            FieldKind::Date => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| err()),
            FieldKind::DateTime => parse_datetime(text.trim())
                .map(Value::DateTime)
                .ok_or_else(err),
            FieldKind::Uuid => Uuid::parse_str(text.trim())
                .map(Value::Uuid)
                .map_err(|_| err()),
            FieldKind::Enum { members } => members
                .iter()
                .find(|m| m.eq_ignore_ascii_case(text.trim()))
                .map(|m| Value::String(m.clone()))
                .ok_or_else(err),
            FieldKind::Object { .. } | FieldKind::ObjectArray { .. } => Err(err()),
        }
    }
}

/// Parse a timestamp string in the formats scenario tables use.
fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC 3339 / ISO 8601
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Try common space-separated format
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }

    // Try date-only format
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    None
}

/// An ordered field/value container produced by fabrication.
///
/// Field order follows the owning shape's declaration order; lookup is
/// case-insensitive to match scenario table column matching.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    shape: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record for the named shape.
    pub fn new(shape: impl Into<String>) -> Self {
        Self {
            shape: shape.into(),
            fields: Vec::new(),
        }
    }

    /// Name of the shape this record was fabricated from.
    pub fn shape(&self) -> &str {
        &self.shape
    }

    /// Get a field value by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Set a field value, replacing any existing entry under the same
    /// (case-insensitive) name while preserving its position.
    pub fn set(&mut self, name: &str, value: Value) {
        match self
            .fields
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Iterate over (name, value) pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of populated fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if no fields are populated.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
