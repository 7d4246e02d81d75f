//! Per-column fabrication override registry.
//!
//! Overrides pin the value generator for one database column, keyed by the
//! composite (connection, schema, table, column) with case-insensitive
//! comparison. During fabrication the registry is consulted before the
//! default kind-based generator; registration is last-write-wins per key.

use rand::RngCore;
use std::collections::HashMap;
use step_core::Value;

/// The table a fabrication call targets, used to consult the override
/// registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableContext {
    /// Connection name
    pub connection: String,
    /// Schema name
    pub schema: String,
    /// Table name
    pub table: String,
}

impl TableContext {
    /// Create a new table context.
    pub fn new(
        connection: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            connection: connection.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }
}

/// A custom value generator registered for one column.
pub type OverrideFn = Box<dyn Fn(&mut dyn RngCore) -> Value + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct OverrideKey {
    connection: String,
    schema: String,
    table: String,
    column: String,
}

impl OverrideKey {
    fn fold(connection: &str, schema: &str, table: &str, column: &str) -> Self {
        Self {
            connection: connection.to_ascii_lowercase(),
            schema: schema.to_ascii_lowercase(),
            table: table.to_ascii_lowercase(),
            column: column.to_ascii_lowercase(),
        }
    }
}

/// Registry of per-column value generators.
#[derive(Default)]
pub struct OverrideRegistry {
    entries: HashMap<OverrideKey, OverrideFn>,
}

impl OverrideRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a generator for (connection, schema, table, column),
    /// replacing any existing entry under the same key.
    pub fn register<F>(
        &mut self,
        connection: &str,
        schema: &str,
        table: &str,
        column: &str,
        generator: F,
    ) where
        F: Fn(&mut dyn RngCore) -> Value + Send + Sync + 'static,
    {
        self.entries.insert(
            OverrideKey::fold(connection, schema, table, column),
            Box::new(generator),
        );
    }

    /// Look up the generator registered for a column of the given table
    /// context, if any.
    pub fn lookup(&self, context: &TableContext, column: &str) -> Option<&OverrideFn> {
        self.entries.get(&OverrideKey::fold(
            &context.connection,
            &context.schema,
            &context.table,
            column,
        ))
    }

    /// Number of registered overrides.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no overrides are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
