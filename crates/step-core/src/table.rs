//! Row/Table model for scenario step input.
//!
//! A [`Table`] is the parsed form of the headered, pipe-delimited text table
//! embedded in a test scenario step. The first line defines the column set
//! and order; every subsequent line is a [`Row`]. Column lookup is
//! case-insensitive throughout. Rows support the null-sentinel protocol
//! (a configured token standing in for a true null) and conversion into
//! positional database parameter values.

use crate::shape::Shape;
use crate::values::{CoercionError, Record, Value};
use std::collections::HashMap;

/// Error type for table parsing and value assignment.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// A row's cell count differs from the header's
    #[error("table line {line} has {actual} cells but the header defines {expected}")]
    MalformedTable {
        /// 1-based line number within the raw table text
        line: usize,
        /// Header cell count
        expected: usize,
        /// Offending row cell count
        actual: usize,
    },

    /// A cell could not be parsed into the target field's kind
    #[error("column '{column}': {source}")]
    ValueCoercion {
        /// Offending column name
        column: String,
        /// Underlying coercion failure
        #[source]
        source: CoercionError,
    },
}

/// One line of scenario tabular input: an ordered mapping from column name
/// to a nullable text cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    cells: Vec<Option<String>>,
}

impl Row {
    /// Create a row from parallel column/cell lists.
    pub fn new(columns: Vec<String>, cells: Vec<Option<String>>) -> Self {
        Self { columns, cells }
    }

    /// Column names in header order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get a cell by column name (case-insensitive). The outer `Option` is
    /// the column lookup; the inner one is cell nullness.
    pub fn get(&self, column: &str) -> Option<Option<&str>> {
        self.column_index(column)
            .map(|idx| self.cells[idx].as_deref())
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
    }

    /// Replace every cell whose text exactly equals `null_indicator` with a
    /// true null, leaving the column present. Runs before coercion so the
    /// indicator is never interpreted as a literal string; applying it twice
    /// is a no-op.
    pub fn transform_for_null(&mut self, null_indicator: &str) {
        for cell in &mut self.cells {
            if cell.as_deref() == Some(null_indicator) {
                *cell = None;
            }
        }
    }

    /// Produce the row's cells as nullable raw values for positional
    /// parameter binding, in column order. Non-null cells go through
    /// `replace` (scenario-variable resolution such as `${x}`) first, then
    /// the null-indicator substitution.
    pub fn db_values<F>(&self, null_indicator: &str, replace: F) -> Vec<Option<String>>
    where
        F: Fn(&str) -> String,
    {
        self.cells
            .iter()
            .map(|cell| match cell {
                None => None,
                Some(text) => {
                    let replaced = replace(text);
                    if replaced == null_indicator {
                        None
                    } else {
                        Some(replaced)
                    }
                }
            })
            .collect()
    }

    /// Assign every cell whose column addresses a field of `shape` onto
    /// `record`, coercing the text into the field's kind. Columns with no
    /// matching field are ignored. Returns the names of the fields actually
    /// assigned, in row-column order.
    pub fn assign_values_if_defined(
        &self,
        shape: &Shape,
        record: &mut Record,
    ) -> Result<Vec<String>, TableError> {
        let mut assigned = Vec::new();
        for (column, cell) in self.columns.iter().zip(&self.cells) {
            let Some(field) = shape.field_for_column(column) else {
                continue;
            };
            let value = match cell {
                None => Value::Null,
                Some(text) => Value::coerce(text, &field.kind).map_err(|source| {
                    TableError::ValueCoercion {
                        column: column.clone(),
                        source,
                    }
                })?,
            };
            record.set(&field.name, value);
            assigned.push(field.name.clone());
        }
        Ok(assigned)
    }
}

/// An ordered sequence of rows sharing one header.
///
/// Created once per scenario step invocation from the raw step-table text
/// and discarded when the step completes.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Parse a headered text table. The first non-empty line is the header;
    /// each subsequent non-empty line is a row. Cells are pipe-delimited
    /// (`| a | b |`), with leading/trailing pipes optional and cell text
    /// trimmed.
    pub fn parse(raw: &str) -> Result<Table, TableError> {
        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::new();

        for (idx, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let cells = split_cells(line);
            if columns.is_empty() {
                columns = cells;
                continue;
            }
            if cells.len() != columns.len() {
                return Err(TableError::MalformedTable {
                    line: idx + 1,
                    expected: columns.len(),
                    actual: cells.len(),
                });
            }
            rows.push(Row::new(columns.clone(), cells.into_iter().map(Some).collect()));
        }

        Ok(Table { columns, rows })
    }

    /// Column names in header order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in input order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Mutable rows, for in-place null-sentinel substitution.
    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn split_cells(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

/// Apply a text substitution to every value of a generic string mapping, in
/// place. Enables scenario-variable substitution across arbitrary key/value
/// configuration, not just rows.
pub fn apply_transform_values<F>(mapping: &mut HashMap<String, String>, replace: F)
where
    F: Fn(&str) -> String,
{
    for value in mapping.values_mut() {
        *value = replace(value);
    }
}
