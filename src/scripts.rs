//! Named script registry.
//!
//! A pure text store mapping script names to reusable SQL fragments.
//! Scripts may carry placeholder markers (e.g. `@alpha`); resolving them is
//! the caller's parameter-binding concern, never the registry's. Entries
//! are written during test-run setup and read-only afterwards; the last
//! registration for a name wins.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for script registration and lookup.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// No script is registered under the requested name
    #[error("no script registered under name: {0}")]
    UnknownScript(String),

    /// Reading a script file failed at registration time
    #[error("failed to read script file {path}: {source}")]
    Io {
        /// Offending file path
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
}

/// Store of reusable SQL text keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ScriptRegistry {
    scripts: HashMap<String, String>,
}

impl ScriptRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a script, replacing any prior text under the same name.
    pub fn register(&mut self, name: impl Into<String>, sql: impl Into<String>) {
        self.scripts.insert(name.into(), sql.into());
    }

    /// Register a script from a file, read once at registration time.
    pub fn register_from_file<P: AsRef<Path>>(
        &mut self,
        name: impl Into<String>,
        path: P,
    ) -> Result<(), ScriptError> {
        let path = path.as_ref();
        let sql = fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.register(name, sql);
        Ok(())
    }

    /// Register a script from text embedded in the binary (the
    /// `include_str!` analog of an embedded resource).
    pub fn register_embedded(&mut self, name: impl Into<String>, resource: &'static str) {
        self.register(name, resource);
    }

    /// Look up a script by name.
    pub fn get(&self, name: &str) -> Result<&str, ScriptError> {
        self.scripts
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ScriptError::UnknownScript(name.to_string()))
    }

    /// Number of registered scripts.
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Check if no scripts are registered.
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}
