//! Database catalog abstraction.
//!
//! A [`CatalogRecord`] captures one database product's connection-opening
//! strategy and identifier-escaping rule. Records are immutable once
//! constructed and are resolved through the [`CatalogFactory`], which maps
//! a connection name to its configured product and connection string.
//! Concrete drivers are external collaborators registered per product as
//! openers.

use crate::connection::{DbConnection, DbError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identifier of a supported database product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseProduct {
    /// Microsoft SQL Server
    SqlServer,
    /// PostgreSQL
    PostgreSql,
    /// MySQL
    MySql,
    /// SQLite
    Sqlite,
}

impl fmt::Display for DatabaseProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SqlServer => write!(f, "sql_server"),
            Self::PostgreSql => write!(f, "postgresql"),
            Self::MySql => write!(f, "mysql"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Error type for catalog resolution and connection opening.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The connection name has no configured product/connection-string
    /// mapping
    #[error("no connection configured under name: {0}")]
    UnknownConnection(String),

    /// No driver opener is registered for the configured product
    #[error("no driver registered for product: {0}")]
    DriverUnavailable(DatabaseProduct),

    /// The driver failed to open the connection
    #[error("failed to open connection '{name}': {source}")]
    Connect {
        /// Connection name being opened
        name: String,
        /// Driver failure
        #[source]
        source: DbError,
    },
}

/// Driver hook that opens a connection from a connection string.
pub type ConnectionOpener =
    dyn Fn(&str) -> Result<Box<dyn DbConnection>, DbError> + Send + Sync;

/// One database product's connection-opening strategy and identifier
/// escaping rule.
pub trait CatalogRecord: Send + Sync {
    /// The product this record describes.
    fn product(&self) -> DatabaseProduct;

    /// Open a connection using the product's registered driver.
    fn open_connection(&self, connection_string: &str) -> Result<Box<dyn DbConnection>, DbError>;

    /// Escape an identifier per the product's quoting rule.
    fn escape_token(&self, identifier: &str) -> String;
}

/// SQL Server catalog record: bracket-wrapped identifiers.
pub struct SqlServerCatalog {
    opener: Arc<ConnectionOpener>,
}

impl CatalogRecord for SqlServerCatalog {
    fn product(&self) -> DatabaseProduct {
        DatabaseProduct::SqlServer
    }

    fn open_connection(&self, connection_string: &str) -> Result<Box<dyn DbConnection>, DbError> {
        (self.opener)(connection_string)
    }

    fn escape_token(&self, identifier: &str) -> String {
        format!("[{}]", identifier.replace(']', "]]"))
    }
}

/// PostgreSQL catalog record: double-quoted identifiers.
pub struct PostgresCatalog {
    opener: Arc<ConnectionOpener>,
}

impl CatalogRecord for PostgresCatalog {
    fn product(&self) -> DatabaseProduct {
        DatabaseProduct::PostgreSql
    }

    fn open_connection(&self, connection_string: &str) -> Result<Box<dyn DbConnection>, DbError> {
        (self.opener)(connection_string)
    }

    fn escape_token(&self, identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }
}

/// MySQL catalog record: backtick-quoted identifiers.
pub struct MySqlCatalog {
    opener: Arc<ConnectionOpener>,
}

impl CatalogRecord for MySqlCatalog {
    fn product(&self) -> DatabaseProduct {
        DatabaseProduct::MySql
    }

    fn open_connection(&self, connection_string: &str) -> Result<Box<dyn DbConnection>, DbError> {
        (self.opener)(connection_string)
    }

    fn escape_token(&self, identifier: &str) -> String {
        format!("`{}`", identifier.replace('`', "``"))
    }
}

/// SQLite catalog record: double-quoted identifiers.
pub struct SqliteCatalog {
    opener: Arc<ConnectionOpener>,
}

impl CatalogRecord for SqliteCatalog {
    fn product(&self) -> DatabaseProduct {
        DatabaseProduct::Sqlite
    }

    fn open_connection(&self, connection_string: &str) -> Result<Box<dyn DbConnection>, DbError> {
        (self.opener)(connection_string)
    }

    fn escape_token(&self, identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }
}

/// Configuration of one named connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database product behind the connection
    pub product: DatabaseProduct,

    /// Driver connection string
    pub connection_string: String,
}

/// Resolves connection names to catalog records.
///
/// Connection configuration (name → product + connection string) comes
/// from the external configuration collaborator; driver openers are
/// registered per product by the host's driver glue. Both happen during
/// test-run setup, after which the factory is read-only.
#[derive(Default)]
pub struct CatalogFactory {
    connections: HashMap<String, ConnectionConfig>,
    openers: HashMap<DatabaseProduct, Arc<ConnectionOpener>>,
}

impl CatalogFactory {
    /// Create an empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure a named connection (case-insensitive name), replacing any
    /// prior configuration under the same name.
    pub fn configure_connection(
        &mut self,
        name: &str,
        product: DatabaseProduct,
        connection_string: impl Into<String>,
    ) {
        self.connections.insert(
            name.to_ascii_lowercase(),
            ConnectionConfig {
                product,
                connection_string: connection_string.into(),
            },
        );
    }

    /// Register the driver opener for a product.
    pub fn register_opener<F>(&mut self, product: DatabaseProduct, opener: F)
    where
        F: Fn(&str) -> Result<Box<dyn DbConnection>, DbError> + Send + Sync + 'static,
    {
        self.openers.insert(product, Arc::new(opener));
    }

    /// The configuration for a named connection.
    pub fn connection_config(&self, name: &str) -> Result<&ConnectionConfig, CatalogError> {
        self.connections
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| CatalogError::UnknownConnection(name.to_string()))
    }

    /// Resolve the catalog record for a named connection.
    pub fn resolve(&self, name: &str) -> Result<Box<dyn CatalogRecord>, CatalogError> {
        let config = self.connection_config(name)?;
        let opener = self
            .openers
            .get(&config.product)
            .cloned()
            .ok_or(CatalogError::DriverUnavailable(config.product))?;

        Ok(match config.product {
            DatabaseProduct::SqlServer => Box::new(SqlServerCatalog { opener }),
            DatabaseProduct::PostgreSql => Box::new(PostgresCatalog { opener }),
            DatabaseProduct::MySql => Box::new(MySqlCatalog { opener }),
            DatabaseProduct::Sqlite => Box::new(SqliteCatalog { opener }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::SqlParam;
    use step_core::Value;

    struct NullConnection;

    impl DbConnection for NullConnection {
        fn execute(&mut self, _sql: &str, _params: &[SqlParam]) -> Result<u64, DbError> {
            Ok(0)
        }

        fn execute_scalar(
            &mut self,
            _sql: &str,
            _params: &[SqlParam],
        ) -> Result<Option<Value>, DbError> {
            Ok(None)
        }

        fn set_command_timeout(&mut self, _timeout: Option<std::time::Duration>) {}

        fn close(&mut self) {}
    }

    fn factory_with_driver() -> CatalogFactory {
        let mut factory = CatalogFactory::new();
        factory.register_opener(DatabaseProduct::SqlServer, |_| {
            Ok(Box::new(NullConnection) as Box<dyn DbConnection>)
        });
        factory.configure_connection(
            "Main",
            DatabaseProduct::SqlServer,
            "Server=localhost;Database=test",
        );
        factory
    }

    #[test]
    fn test_escape_token_per_product() {
        let opener: Arc<ConnectionOpener> =
            Arc::new(|_| Ok(Box::new(NullConnection) as Box<dyn DbConnection>));

        let record = SqlServerCatalog {
            opener: opener.clone(),
        };
        assert_eq!(record.escape_token("Users"), "[Users]");
        assert_eq!(record.escape_token("we]ird"), "[we]]ird]");

        let record = PostgresCatalog {
            opener: opener.clone(),
        };
        assert_eq!(record.escape_token("Users"), "\"Users\"");
        assert_eq!(record.escape_token("we\"ird"), "\"we\"\"ird\"");

        let record = MySqlCatalog {
            opener: opener.clone(),
        };
        assert_eq!(record.escape_token("Users"), "`Users`");
        assert_eq!(record.escape_token("we`ird"), "`we``ird`");

        let record = SqliteCatalog { opener };
        assert_eq!(record.escape_token("Users"), "\"Users\"");
    }

    #[test]
    fn test_resolve_known_connection() {
        let factory = factory_with_driver();

        let record = factory.resolve("main").unwrap();
        assert_eq!(record.product(), DatabaseProduct::SqlServer);
        assert!(record.open_connection("Server=x").is_ok());
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let factory = factory_with_driver();
        assert!(factory.resolve("MAIN").is_ok());
        assert!(factory.connection_config("mAiN").is_ok());
    }

    #[test]
    fn test_resolve_unknown_connection() {
        let factory = factory_with_driver();
        let result = factory.resolve("reporting");
        assert!(matches!(result, Err(CatalogError::UnknownConnection(_))));
    }

    #[test]
    fn test_resolve_without_driver() {
        let mut factory = CatalogFactory::new();
        factory.configure_connection("pg", DatabaseProduct::PostgreSql, "host=localhost");

        let result = factory.resolve("pg");
        assert!(matches!(
            result,
            Err(CatalogError::DriverUnavailable(DatabaseProduct::PostgreSql))
        ));
    }

    #[test]
    fn test_reconfigure_replaces_connection() {
        let mut factory = factory_with_driver();
        factory.configure_connection("main", DatabaseProduct::SqlServer, "Server=other");

        let config = factory.connection_config("main").unwrap();
        assert_eq!(config.connection_string, "Server=other");
    }
}
