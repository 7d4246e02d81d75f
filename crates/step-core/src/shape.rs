//! Declarative shape descriptors.
//!
//! A [`Shape`] describes the settable fields of a record to fabricate:
//! each field carries its semantic kind, the computed-column marker, an
//! optional source-field/source-table mapping, and nullability. Shapes are
//! registered in a [`ShapeRegistry`], usually loaded from a YAML catalog:
//!
//! ```yaml
//! version: 1
//!
//! shapes:
//!   - name: user
//!     fields:
//!       - name: id
//!         type: uuid
//!         computed: true
//!       - name: email
//!         type:
//!           type: var_char
//!           max_length: 255
//!       - name: balance
//!         type:
//!           type: decimal
//!           precision: 10
//!           scale: 2
//! ```

use crate::types::FieldKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Error type for shape catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    /// Error reading a shape catalog file
    #[error("failed to read shape catalog: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("failed to parse shape catalog YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Shape not found in the registry
    #[error("shape not found: {0}")]
    ShapeNotFound(String),
}

/// A single settable field of a shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSpec {
    /// Field name
    pub name: String,

    /// Semantic kind
    #[serde(rename = "type")]
    pub kind: FieldKind,

    /// Whether this field is nullable
    #[serde(default)]
    pub nullable: bool,

    /// Computed-column marker; a computed field is never fabricated
    #[serde(default)]
    pub computed: bool,

    /// Database column this field maps to, when it differs from the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_field: Option<String>,

    /// Database table this field maps to, when it differs from the shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_table: Option<String>,
}

impl FieldSpec {
    /// Create a new field spec with the given name and kind.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            computed: false,
            source_field: None,
            source_table: None,
        }
    }

    /// Create a new computed field spec.
    pub fn computed(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            computed: true,
            ..Self::new(name, kind)
        }
    }

    /// Check whether a scenario table column addresses this field, either
    /// by field name or by its declared source column (case-insensitive).
    pub fn matches_column(&self, column: &str) -> bool {
        self.name.eq_ignore_ascii_case(column)
            || self
                .source_field
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(column))
    }
}

/// The structural description of a record to fabricate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    /// Shape name
    pub name: String,

    /// Field specs in declaration order
    pub fields: Vec<FieldSpec>,
}

impl Shape {
    /// Create a new shape from a field list.
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Get a field spec by name (case-insensitive).
    pub fn get_field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Get the field spec a scenario table column addresses, if any.
    pub fn field_for_column(&self, column: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.matches_column(column))
    }

    /// All field names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

fn default_version() -> u32 {
    1
}

/// Registry of shape descriptors, usually loaded from a YAML catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShapeRegistry {
    /// Catalog version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Shape descriptors
    pub shapes: Vec<Shape>,

    /// Cached shape lookup (not serialized)
    #[serde(skip)]
    shape_map: HashMap<String, usize>,
}

impl ShapeRegistry {
    /// Create a new registry from a list of shapes.
    pub fn new(shapes: Vec<Shape>) -> Self {
        let mut registry = Self {
            version: default_version(),
            shapes,
            shape_map: HashMap::new(),
        };
        registry.build_shape_map();
        registry
    }

    /// Load a shape catalog from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ShapeError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a shape catalog from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ShapeError> {
        let mut registry: ShapeRegistry = serde_yaml::from_str(yaml)?;
        registry.build_shape_map();
        Ok(registry)
    }

    /// Build the internal shape lookup map.
    fn build_shape_map(&mut self) {
        self.shape_map = self
            .shapes
            .iter()
            .enumerate()
            .map(|(idx, shape)| (shape.name.to_ascii_lowercase(), idx))
            .collect();
    }

    /// Get a shape by name (case-insensitive).
    pub fn get_shape(&self, name: &str) -> Option<&Shape> {
        self.shape_map
            .get(&name.to_ascii_lowercase())
            .and_then(|&idx| self.shapes.get(idx))
    }

    /// Get a shape by name, failing if it is not registered.
    pub fn require_shape(&self, name: &str) -> Result<&Shape, ShapeError> {
        self.get_shape(name)
            .ok_or_else(|| ShapeError::ShapeNotFound(name.to_string()))
    }

    /// Add a shape to the registry, replacing any shape of the same name.
    pub fn add_shape(&mut self, shape: Shape) {
        let key = shape.name.to_ascii_lowercase();
        if let Some(&idx) = self.shape_map.get(&key) {
            self.shapes[idx] = shape;
        } else {
            self.shape_map.insert(key, self.shapes.len());
            self.shapes.push(shape);
        }
    }

    /// All shape names in registration order.
    pub fn shape_names(&self) -> Vec<&str> {
        self.shapes.iter().map(|s| s.name.as_str()).collect()
    }
}
