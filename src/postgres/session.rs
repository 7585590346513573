use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};

use super::config::PostgresOptions;
use super::diagnostics::describe_error;
use super::params::Params;
use super::query::{
    build_result_set_from_statement, build_result_set_from_text, has_binary_decoder,
};
use crate::error::ExplorerError;
use crate::gateway::{Connector, Session};
use crate::results::ResultSet;
use crate::types::{DatabaseType, SqlValue};

/// Opens one tokio-postgres connection per session.
#[derive(Debug, Clone)]
pub struct PostgresConnector {
    options: PostgresOptions,
}

impl PostgresConnector {
    #[must_use]
    pub fn new(options: PostgresOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Connector for PostgresConnector {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Postgres
    }

    async fn connect(&self, database: Option<&str>) -> Result<Box<dyn Session>, ExplorerError> {
        let config = self.options.to_tokio_config(database)?;
        let (client, connection) = config.connect(NoTls).await.map_err(|e| {
            ExplorerError::ConnectionError(format!(
                "postgres connect error: {}",
                describe_error(&e)
            ))
        })?;

        // The connection future drives the socket; it finishes once the client is dropped.
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(error = %describe_error(&e), "postgres connection ended with error");
            }
        });

        Ok(Box::new(PostgresSession {
            client: Some(client),
            driver: Some(driver),
        }))
    }
}

/// A client plus the task driving its socket.
pub struct PostgresSession {
    client: Option<Client>,
    driver: Option<JoinHandle<()>>,
}

impl PostgresSession {
    fn client(&self) -> Result<&Client, ExplorerError> {
        self.client
            .as_ref()
            .ok_or_else(|| ExplorerError::ConnectionError("postgres session is closed".into()))
    }
}

#[async_trait]
impl Session for PostgresSession {
    async fn execute_batch(&mut self, sql: &str) -> Result<(), ExplorerError> {
        self.client()?
            .batch_execute(sql)
            .await
            .map_err(|e| {
                ExplorerError::ExecutionError(format!("postgres batch error: {}", describe_error(&e)))
            })
    }

    async fn select(&mut self, sql: &str, params: &[SqlValue]) -> Result<ResultSet, ExplorerError> {
        let client = self.client()?;
        let stmt = client.prepare(sql).await.map_err(|e| {
            ExplorerError::ExecutionError(format!("postgres prepare error: {}", describe_error(&e)))
        })?;
        let select_error = |e: tokio_postgres::Error| {
            ExplorerError::ExecutionError(format!("postgres select error: {}", describe_error(&e)))
        };

        // Types without a binary decoder are read back in text form. `prepare`
        // has already refused anything but a single statement.
        let needs_text = stmt
            .columns()
            .iter()
            .any(|col| !has_binary_decoder(col.type_().name()));
        if needs_text && params.is_empty() {
            let messages = client.simple_query(sql).await.map_err(select_error)?;
            return build_result_set_from_text(stmt.columns(), &messages);
        }

        let converted = Params::convert(params);
        let rows = client
            .query(&stmt, converted.as_refs())
            .await
            .map_err(select_error)?;
        build_result_set_from_statement(&stmt, &rows)
    }

    async fn close(&mut self) -> Result<(), ExplorerError> {
        drop(self.client.take());
        if let Some(driver) = self.driver.take() {
            driver.await.map_err(|e| {
                ExplorerError::ConnectionError(format!("postgres connection task failed: {e}"))
            })?;
        }
        Ok(())
    }
}

impl Drop for PostgresSession {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}
