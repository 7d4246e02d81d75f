//! dbstep
//!
//! A support library for database-driven acceptance testing. Given a
//! declarative row of text values from a test scenario, dbstep fabricates
//! realistic, type-correct random records and database rows, selectively
//! overridden by explicit scenario values, and executes them against a
//! configured database product through a uniform abstraction.
//!
//! # Features
//!
//! - Shape-driven fabrication: random, type-valid records honoring
//!   computed-column exclusion, decimal precision/scale, and string length
//!   constraints, with bounded recursion over self-referential shapes
//! - Scenario tables: headered pipe-delimited input with case-insensitive
//!   columns, a configurable null sentinel, `${var}` substitution, and
//!   typed assignment onto fabricated records
//! - Catalog abstraction: per-product connection opening and identifier
//!   escaping (SQL Server, PostgreSQL, MySQL, SQLite), resolved by
//!   connection name; concrete drivers plug in as product openers
//! - Scenario sessions: lazily opened connections, a scenario-scoped
//!   variable bag, and guaranteed connection release at scenario end
//! - Named scripts: process-wide reusable SQL fragments keyed by name
//!
//! # Example
//!
//! ```no_run
//! use dbstep::{DatabaseProduct, ScenarioConfig, TestEnvironment};
//! use std::sync::Arc;
//!
//! let mut env = TestEnvironment::with_config(ScenarioConfig::default());
//! env.shapes = dbstep::ShapeRegistry::from_file("shapes.yaml").unwrap();
//! env.factory.configure_connection(
//!     "main",
//!     DatabaseProduct::PostgreSql,
//!     "host=localhost dbname=test",
//! );
//! env.scripts.register("seed_users", "INSERT INTO users (name) VALUES ($1)");
//! let env = Arc::new(env);
//!
//! // Per scenario:
//! let mut session = env.start_scenario();
//! let table = dbstep::Table::parse("| name |\n| amy |").unwrap();
//! let params = session.row_params(&table.rows()[0]);
//! session.open_connection("main").unwrap();
//! session.execute_named_script("seed_users", &params).unwrap();
//! // Dropping the session closes every opened connection.
//! ```

pub mod catalog;
pub mod config;
pub mod connection;
pub mod environment;
pub mod scripts;
pub mod session;

// Re-exports for convenience
pub use catalog::{
    CatalogError, CatalogFactory, CatalogRecord, ConnectionConfig, DatabaseProduct,
};
pub use config::{parse_duration_to_secs, ScenarioConfig, DEFAULT_NULL_SENTINEL};
pub use connection::{positional_params, DbConnection, DbError, SqlParam};
pub use environment::TestEnvironment;
pub use scripts::{ScriptError, ScriptRegistry};
pub use session::{ScenarioSession, SessionError};

// Re-export the member crates' surfaces
pub use fabricator::{
    generators, FabricateError, Fabricator, OverrideRegistry, TableContext, DEFAULT_MAX_DEPTH,
};
pub use step_core::{
    apply_transform_values, CoercionError, FieldKind, FieldSpec, Record, Row, Shape, ShapeError,
    ShapeRegistry, Table, TableError, Value,
};
