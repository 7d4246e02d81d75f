//! Core types for the dbstep acceptance-testing library.
//!
//! This crate provides the foundational types used across the library,
//! including:
//!
//! - [`FieldKind`] - Semantic type universe for shape fields
//! - [`Value`] / [`Record`] - Typed runtime values and fabricated records
//! - [`Shape`] / [`ShapeRegistry`] - Declarative shape descriptors loaded
//!   from YAML catalogs
//! - [`Row`] / [`Table`] - Scenario step-table input with null-sentinel
//!   handling and typed value assignment
//!
//! # Architecture
//!
//! step-core sits at the foundation of the library:
//!
//! ```text
//! step-core (this crate)
//!    │
//!    ├─── fabricator  (depends on step-core for shapes and values)
//!    │
//!    └─── dbstep      (catalog abstraction, scenario session, scripts)
//! ```

pub mod shape;
pub mod table;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use shape::{FieldSpec, Shape, ShapeError, ShapeRegistry};
pub use table::{apply_transform_values, Row, Table, TableError};
pub use types::FieldKind;
pub use values::{CoercionError, Record, Value};
