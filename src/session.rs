//! Per-scenario session state.
//!
//! A [`ScenarioSession`] is created at scenario start from the shared
//! [`crate::environment::TestEnvironment`] and dropped at scenario end. It
//! tracks the connections opened this scenario (keyed by case-folded
//! connection name), the last-used connection, and the scenario-scoped
//! variable bag. Dropping the session closes every opened connection, so
//! teardown happens on every exit path, including unwinding.

use crate::catalog::{CatalogError, CatalogRecord};
use crate::config::ScenarioConfig;
use crate::connection::{positional_params, DbConnection, DbError, SqlParam};
use crate::environment::TestEnvironment;
use crate::scripts::ScriptError;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use step_core::{Row, Value};

/// Error type for scenario session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No connection has been opened yet this scenario
    #[error("no connection has been opened in this scenario")]
    NoActiveConnection,

    /// Catalog resolution or connection opening failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A database command failed
    #[error(transparent)]
    Db(#[from] DbError),

    /// A named-script lookup failed
    #[error(transparent)]
    Script(#[from] ScriptError),
}

/// State for one executing scenario.
pub struct ScenarioSession {
    env: Arc<TestEnvironment>,
    config: ScenarioConfig,
    connections: HashMap<String, Box<dyn DbConnection>>,
    current: Option<String>,
    variables: HashMap<String, serde_json::Value>,
}

impl ScenarioSession {
    pub(crate) fn new(env: Arc<TestEnvironment>) -> Self {
        let config = env.base_config.clone();
        tracing::debug!("scenario session started");
        Self {
            env,
            config,
            connections: HashMap::new(),
            current: None,
            variables: HashMap::new(),
        }
    }

    /// The shared test-run environment.
    pub fn environment(&self) -> &TestEnvironment {
        &self.env
    }

    /// This scenario's configuration.
    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Mutable scenario configuration; changes stay scoped to this
    /// scenario and never leak back into the environment's base config.
    pub fn config_mut(&mut self) -> &mut ScenarioConfig {
        &mut self.config
    }

    /// Open (or reuse) the connection registered under `name`, record it as
    /// last-used, and return it.
    pub fn open_connection(&mut self, name: &str) -> Result<&mut dyn DbConnection, SessionError> {
        let key = name.to_ascii_lowercase();
        let timeout = self.config.command_timeout();

        let connection = match self.connections.entry(key.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let record = self.env.factory.resolve(name)?;
                let config = self.env.factory.connection_config(name)?;
                tracing::debug!(
                    connection = name,
                    product = %record.product(),
                    "opening connection"
                );
                let mut connection = record
                    .open_connection(&config.connection_string)
                    .map_err(|source| CatalogError::Connect {
                        name: name.to_string(),
                        source,
                    })?;
                connection.set_command_timeout(timeout);
                entry.insert(connection)
            }
        };

        self.current = Some(key);
        Ok(connection.as_mut())
    }

    /// The catalog record for the last-used connection.
    pub fn current_catalog(&self) -> Result<Box<dyn CatalogRecord>, SessionError> {
        let name = self
            .current
            .as_deref()
            .ok_or(SessionError::NoActiveConnection)?;
        Ok(self.env.factory.resolve(name)?)
    }

    /// The last-used connection.
    pub fn current_connection(&mut self) -> Result<&mut dyn DbConnection, SessionError> {
        let key = self
            .current
            .clone()
            .ok_or(SessionError::NoActiveConnection)?;
        match self.connections.get_mut(&key) {
            Some(c) => Ok(c.as_mut()),
            None => Err(SessionError::NoActiveConnection),
        }
    }

    /// Set a scenario-scoped variable.
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Get a scenario-scoped variable.
    pub fn variable(&self, name: &str) -> Option<&serde_json::Value> {
        self.variables.get(name)
    }

    /// Resolve every `${name}` reference in `text` from the variable bag.
    /// Unknown references are left untouched.
    pub fn replace_variables(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (name, value) in &self.variables {
            let marker = format!("${{{name}}}");
            if out.contains(&marker) {
                out = out.replace(&marker, &render_variable(value));
            }
        }
        out
    }

    /// Convert a scenario row into positional parameters: variable
    /// substitution, then null-sentinel substitution, in column order.
    pub fn row_params(&self, row: &Row) -> Vec<SqlParam> {
        positional_params(row.db_values(&self.config.null_sentinel, |text| {
            self.replace_variables(text)
        }))
    }

    /// Execute a statement on the last-used connection.
    pub fn execute_sql(&mut self, sql: &str, params: &[SqlParam]) -> Result<u64, SessionError> {
        if self.config.debug_sql {
            tracing::debug!(sql, "executing sql");
        }
        let connection = self.current_connection()?;
        Ok(connection.execute(sql, params)?)
    }

    /// Execute a statement on the last-used connection, returning the first
    /// column of the first row.
    pub fn execute_scalar(
        &mut self,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<Option<Value>, SessionError> {
        if self.config.debug_sql {
            tracing::debug!(sql, "executing scalar sql");
        }
        let connection = self.current_connection()?;
        Ok(connection.execute_scalar(sql, params)?)
    }

    /// Execute a registered named script on the last-used connection.
    pub fn execute_named_script(
        &mut self,
        name: &str,
        params: &[SqlParam],
    ) -> Result<u64, SessionError> {
        let sql = self.env.scripts.get(name)?.to_string();
        self.execute_sql(&sql, params)
    }

    /// Execute a registered named script, returning the first column of
    /// the first row.
    pub fn execute_named_script_scalar(
        &mut self,
        name: &str,
        params: &[SqlParam],
    ) -> Result<Option<Value>, SessionError> {
        let sql = self.env.scripts.get(name)?.to_string();
        self.execute_scalar(&sql, params)
    }
}

impl Drop for ScenarioSession {
    fn drop(&mut self) {
        for (name, connection) in self.connections.iter_mut() {
            tracing::debug!(connection = %name, "closing connection at scenario end");
            connection.close();
        }
        self.connections.clear();
        tracing::debug!("scenario session ended");
    }
}

fn render_variable(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DatabaseProduct;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fake driver that counts open handles and records executed SQL.
    struct FakeConnection {
        open_handles: Arc<AtomicUsize>,
        executed: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl DbConnection for FakeConnection {
        fn execute(&mut self, sql: &str, params: &[SqlParam]) -> Result<u64, DbError> {
            self.executed.lock().unwrap().push(sql.to_string());
            Ok(params.len() as u64)
        }

        fn execute_scalar(
            &mut self,
            sql: &str,
            _params: &[SqlParam],
        ) -> Result<Option<Value>, DbError> {
            self.executed.lock().unwrap().push(sql.to_string());
            Ok(Some(Value::Int64(1)))
        }

        fn set_command_timeout(&mut self, _timeout: Option<Duration>) {}

        fn close(&mut self) {
            self.open_handles.fetch_sub(1, Ordering::SeqCst);
        }
    }

    struct FakeDriver {
        open_handles: Arc<AtomicUsize>,
        executed: Arc<std::sync::Mutex<Vec<String>>>,
    }

    impl FakeDriver {
        fn new() -> Self {
            Self {
                open_handles: Arc::new(AtomicUsize::new(0)),
                executed: Arc::new(std::sync::Mutex::new(Vec::new())),
            }
        }

        fn install(&self, env: &mut TestEnvironment, product: DatabaseProduct) {
            let open_handles = self.open_handles.clone();
            let executed = self.executed.clone();
            env.factory.register_opener(product, move |_| {
                open_handles.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(FakeConnection {
                    open_handles: open_handles.clone(),
                    executed: executed.clone(),
                }) as Box<dyn DbConnection>)
            });
        }
    }

    fn test_env(driver: &FakeDriver) -> Arc<TestEnvironment> {
        let mut env = TestEnvironment::new();
        driver.install(&mut env, DatabaseProduct::SqlServer);
        env.factory
            .configure_connection("main", DatabaseProduct::SqlServer, "Server=a");
        env.factory
            .configure_connection("audit", DatabaseProduct::SqlServer, "Server=b");
        env.scripts.register("count", "SELECT COUNT(*) FROM users");
        Arc::new(env)
    }

    #[test]
    fn test_no_active_connection() {
        let driver = FakeDriver::new();
        let env = test_env(&driver);
        let mut session = env.start_scenario();

        assert!(matches!(
            session.current_connection(),
            Err(SessionError::NoActiveConnection)
        ));
        assert!(matches!(
            session.current_catalog(),
            Err(SessionError::NoActiveConnection)
        ));
    }

    #[test]
    fn test_open_reuses_connection_per_name() {
        let driver = FakeDriver::new();
        let env = test_env(&driver);
        let mut session = env.start_scenario();

        session.open_connection("main").unwrap();
        session.open_connection("MAIN").unwrap();
        assert_eq!(driver.open_handles.load(Ordering::SeqCst), 1);

        session.open_connection("audit").unwrap();
        assert_eq!(driver.open_handles.load(Ordering::SeqCst), 2);

        // Last-used tracking follows the most recent open
        assert_eq!(
            session.current_catalog().unwrap().product(),
            DatabaseProduct::SqlServer
        );
    }

    #[test]
    fn test_teardown_releases_all_connections() {
        let driver = FakeDriver::new();
        let env = test_env(&driver);
        {
            let mut session = env.start_scenario();
            session.open_connection("main").unwrap();
            session.open_connection("audit").unwrap();
            assert_eq!(driver.open_handles.load(Ordering::SeqCst), 2);
        }
        assert_eq!(driver.open_handles.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_teardown_on_unwind() {
        let driver = FakeDriver::new();
        let env = test_env(&driver);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut session = env.start_scenario();
            session.open_connection("main").unwrap();
            panic!("step failed");
        }));

        assert!(result.is_err());
        assert_eq!(driver.open_handles.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_execute_named_script() {
        let driver = FakeDriver::new();
        let env = test_env(&driver);
        let mut session = env.start_scenario();
        session.open_connection("main").unwrap();

        let value = session.execute_named_script_scalar("count", &[]).unwrap();
        assert_eq!(value, Some(Value::Int64(1)));
        assert_eq!(
            driver.executed.lock().unwrap().as_slice(),
            &["SELECT COUNT(*) FROM users".to_string()]
        );

        let result = session.execute_named_script("missing", &[]);
        assert!(matches!(
            result,
            Err(SessionError::Script(ScriptError::UnknownScript(_)))
        ));
    }

    #[test]
    fn test_variables_and_replacement() {
        let driver = FakeDriver::new();
        let env = test_env(&driver);
        let mut session = env.start_scenario();

        session.set_variable("x", 7);
        session.set_variable("name", "amy");

        assert_eq!(session.replace_variables("${x}"), "7");
        assert_eq!(session.replace_variables("hello ${name}"), "hello amy");
        assert_eq!(session.replace_variables("${missing}"), "${missing}");
    }

    #[test]
    fn test_row_params_apply_variables_and_sentinel() {
        let driver = FakeDriver::new();
        let env = test_env(&driver);
        let mut session = env.start_scenario();
        session.set_variable("x", 7);

        let table = step_core::Table::parse("| A | B |\n| NULL | ${x} |").unwrap();
        let params = session.row_params(&table.rows()[0]);

        assert_eq!(
            params,
            vec![
                SqlParam::Positional(None),
                SqlParam::Positional(Some(Value::String("7".to_string()))),
            ]
        );
    }

    #[test]
    fn test_config_changes_stay_scoped() {
        let driver = FakeDriver::new();
        let env = test_env(&driver);

        {
            let mut session = env.start_scenario();
            session.config_mut().null_sentinel = "<none>".to_string();
        }

        let session = env.start_scenario();
        assert_eq!(session.config().null_sentinel, "NULL");
    }
}
