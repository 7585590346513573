//! The operation boundary exposed to agents.
//!
//! Each operation opens and closes its own session through the [`Gateway`].
//! The plain methods never fail: errors are logged here and turned into
//! `Blocked: ...` or `Internal error: ...` text. The `try_*` variants return
//! the typed error instead.

use crate::catalog;
use crate::dialect::DialectProfile;
use crate::error::ExplorerError;
use crate::firewall::{normalize, validate};
use crate::format::{NO_RESULTS, NO_ROWS, render_column, render_rows, render_schema};
use crate::gateway::{Gateway, ScopedSession};
use crate::identifiers::QualifiedName;
use crate::prompt;
use crate::results::ResultSet;
use crate::types::{DatabaseType, SqlValue};

const VERSION_PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone)]
pub struct Explorer {
    gateway: Gateway,
    default_schema: Option<String>,
}

impl Explorer {
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            default_schema: None,
        }
    }

    /// Schema tried for unqualified table names in [`Explorer::view_table`].
    #[must_use]
    pub fn with_default_schema(mut self, schema: Option<String>) -> Self {
        self.default_schema = schema.filter(|s| !s.trim().is_empty());
        self
    }

    #[must_use]
    pub fn profile(&self) -> &DialectProfile {
        self.gateway.profile()
    }

    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        self.profile().database_type()
    }

    pub async fn list_databases(&self) -> String {
        surface("list_databases", self.try_list_databases().await)
    }

    /// # Errors
    /// Returns connection or execution errors from the catalog query.
    pub async fn try_list_databases(&self) -> Result<String, ExplorerError> {
        let rs = self
            .gateway
            .run_catalog(&catalog::list_databases(self.database_type()), None)
            .await?;
        let empty = match self.database_type() {
            DatabaseType::Postgres => "No databases found",
            DatabaseType::Mssql => "No user databases found",
        };
        Ok(render_column(&rs, empty))
    }

    pub async fn list_tables(&self, database: Option<&str>) -> String {
        surface("list_tables", self.try_list_tables(database).await)
    }

    /// # Errors
    /// Returns connection or execution errors from the catalog query.
    pub async fn try_list_tables(&self, database: Option<&str>) -> Result<String, ExplorerError> {
        let query = catalog::list_tables(self.database_type(), database);
        let rs = self.gateway.run_catalog(&query, database).await?;
        Ok(render_column(&rs, "No tables found"))
    }

    pub async fn table_schema(&self, database: Option<&str>, table: &str) -> String {
        surface("table_schema", self.try_table_schema(database, table).await)
    }

    /// # Errors
    /// Returns `ExplorerError::InvalidIdentifier` for an empty table reference,
    /// or connection and execution errors from the catalog query.
    pub async fn try_table_schema(
        &self,
        database: Option<&str>,
        table: &str,
    ) -> Result<String, ExplorerError> {
        let name = QualifiedName::parse(table)?;
        let database_type = self.database_type();
        let query = catalog::table_schema(database_type, database, &name);
        let rs = self.gateway.run_catalog(&query, database).await?;

        let rendered = match database_type {
            DatabaseType::Postgres => {
                render_schema(&rs, false).unwrap_or_else(|| format!("No schema for {table}"))
            }
            DatabaseType::Mssql => render_schema(&rs, true)
                .unwrap_or_else(|| format!("No schema found for table: {table}")),
        };
        Ok(rendered)
    }

    pub async fn view_table(&self, database: Option<&str>, table: &str) -> String {
        surface("view_table", self.try_view_table(database, table).await)
    }

    /// Preview the first rows of a table. The statement is built from quoted
    /// identifiers and does not pass through the firewall.
    ///
    /// # Errors
    /// Returns `ExplorerError::InvalidIdentifier` for an empty table reference,
    /// or connection and execution errors.
    pub async fn try_view_table(
        &self,
        database: Option<&str>,
        table: &str,
    ) -> Result<String, ExplorerError> {
        let name = QualifiedName::parse(table)?;
        let mut session = self.gateway.open(database).await?;
        let outcome = self.preview_on(&mut session, name).await;
        session.release().await;
        Ok(render_rows(&outcome?, NO_ROWS))
    }

    async fn preview_on(
        &self,
        session: &mut ScopedSession,
        mut name: QualifiedName,
    ) -> Result<ResultSet, ExplorerError> {
        let database_type = self.database_type();
        if let (false, Some(schema)) = (name.is_qualified(), &self.default_schema) {
            let check = catalog::table_exists(database_type, schema, &name.name);
            let matches = session
                .select_catalog(&check)
                .await?
                .rows
                .first()
                .and_then(|row| row.get_by_index(0))
                .and_then(SqlValue::as_int)
                .unwrap_or(0);
            if matches > 0 {
                name = name.with_schema(schema.as_str());
            }
        }
        let preview = catalog::preview(database_type, &name, self.profile().preview_rows());
        session.select_catalog(&preview).await
    }

    pub async fn execute_query(&self, database: Option<&str>, query: &str) -> String {
        surface("execute_query", self.try_execute_query(database, query).await)
    }

    /// Validate, cap and run an ad-hoc query.
    ///
    /// A rejected query never reaches a connection.
    ///
    /// # Errors
    /// Returns `ExplorerError::Blocked` for queries the firewall refuses, or
    /// connection, execution and formatting errors.
    pub async fn try_execute_query(
        &self,
        database: Option<&str>,
        query: &str,
    ) -> Result<String, ExplorerError> {
        let validated = validate(query, self.profile())?;
        let bounded = normalize(&validated, self.profile());
        let rs = self.gateway.execute(&bounded, database).await?;
        Ok(render_rows(&rs, NO_RESULTS))
    }

    /// Connectivity probe reporting the first characters of the server version.
    pub async fn hello(&self, name: &str) -> String {
        tracing::info!(name, "hello called");
        match self.server_version().await {
            Ok(version) => {
                let preview: String = version.chars().take(VERSION_PREVIEW_CHARS).collect();
                format!(
                    "Hello from {}, {name}! Connected to: {preview}...",
                    self.profile().server_label()
                )
            }
            Err(e) => {
                tracing::error!(error = %e, "hello could not reach the server");
                format!("Hello {name}! Connection failed: {e}")
            }
        }
    }

    async fn server_version(&self) -> Result<String, ExplorerError> {
        let rs = self
            .gateway
            .run_catalog(&catalog::server_version(self.database_type()), None)
            .await?;
        rs.rows
            .first()
            .and_then(|row| row.get_by_index(0))
            .map(ToString::to_string)
            .ok_or_else(|| ExplorerError::ExecutionError("server returned no version".into()))
    }

    /// SQL-generation prompt for this explorer's dialect.
    #[must_use]
    pub fn sql_generation_prompt(&self, natural_query: &str, schema_info: &str) -> String {
        prompt::sql_generation_prompt(self.database_type(), natural_query, schema_info)
    }
}

fn surface(operation: &'static str, outcome: Result<String, ExplorerError>) -> String {
    match outcome {
        Ok(text) => text,
        Err(e) => {
            if e.is_blocked() {
                tracing::warn!(operation, reason = %e, "query blocked");
            } else {
                tracing::error!(operation, error = %e, "operation failed");
            }
            e.user_message()
        }
    }
}
