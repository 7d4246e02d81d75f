//! Generic database command interface.
//!
//! [`DbConnection`] is the uniform surface the library executes against.
//! Concrete drivers per database product are external collaborators: they
//! implement this trait and are registered on the
//! [`crate::catalog::CatalogFactory`] as product openers.

use std::time::Duration;
use step_core::Value;

/// Error type for database command execution.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The driver failed to open a connection
    #[error("failed to connect: {0}")]
    Connect(String),

    /// A command failed at the database
    #[error("database command failed: {0}")]
    Command(String),

    /// The connection has already been closed
    #[error("connection is closed")]
    Closed,
}

/// A single bound SQL parameter, positional or named.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// Bound by position, in statement order
    Positional(Option<Value>),

    /// Bound by placeholder name (e.g. `@alpha`)
    Named(String, Option<Value>),
}

impl SqlParam {
    /// Create a positional parameter.
    pub fn positional(value: Option<Value>) -> Self {
        Self::Positional(value)
    }

    /// Create a named parameter.
    pub fn named(name: impl Into<String>, value: Option<Value>) -> Self {
        Self::Named(name.into(), value)
    }

    /// The bound value, if non-null.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Positional(v) | Self::Named(_, v) => v.as_ref(),
        }
    }

    /// The placeholder name, for named parameters.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name, _) => Some(name),
            Self::Positional(_) => None,
        }
    }
}

/// Convert the nullable raw values a [`step_core::Row`] produces into
/// positional parameters.
pub fn positional_params(values: Vec<Option<String>>) -> Vec<SqlParam> {
    values
        .into_iter()
        .map(|v| SqlParam::Positional(v.map(Value::String)))
        .collect()
}

/// An open database connection.
///
/// All calls are synchronous and blocking; a command runs until it
/// completes or times out per the configured command timeout.
pub trait DbConnection: Send {
    /// Execute a statement, returning the affected row count.
    fn execute(&mut self, sql: &str, params: &[SqlParam]) -> Result<u64, DbError>;

    /// Execute a statement, returning the first column of the first row.
    fn execute_scalar(&mut self, sql: &str, params: &[SqlParam]) -> Result<Option<Value>, DbError>;

    /// Apply the configured command timeout to subsequent commands.
    fn set_command_timeout(&mut self, timeout: Option<Duration>);

    /// Release the connection. Called exactly once at scenario teardown.
    fn close(&mut self);
}
