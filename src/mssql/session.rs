use async_trait::async_trait;
use tiberius::Query;

use super::client::create_mssql_client;
use super::config::{MssqlClient, MssqlOptions};
use super::query::build_result_set;
use crate::error::ExplorerError;
use crate::gateway::{Connector, Session};
use crate::results::ResultSet;
use crate::types::{DatabaseType, SqlValue};

/// Opens one tiberius connection per session.
#[derive(Debug, Clone)]
pub struct MssqlConnector {
    options: MssqlOptions,
}

impl MssqlConnector {
    #[must_use]
    pub fn new(options: MssqlOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Connector for MssqlConnector {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Mssql
    }

    async fn connect(&self, database: Option<&str>) -> Result<Box<dyn Session>, ExplorerError> {
        let client = create_mssql_client(&self.options, database).await?;
        Ok(Box::new(MssqlSession {
            client: Some(client),
        }))
    }
}

/// A single tiberius client; dropping it closes the socket.
pub struct MssqlSession {
    client: Option<MssqlClient>,
}

impl MssqlSession {
    fn client(&mut self) -> Result<&mut MssqlClient, ExplorerError> {
        self.client
            .as_mut()
            .ok_or_else(|| ExplorerError::ConnectionError("SQL Server session is closed".into()))
    }
}

#[async_trait]
impl Session for MssqlSession {
    async fn execute_batch(&mut self, sql: &str) -> Result<(), ExplorerError> {
        let client = self.client()?;
        Query::new(sql)
            .execute(client)
            .await
            .map(|_| ())
            .map_err(|e| ExplorerError::ExecutionError(format!("SQL Server batch error: {e}")))
    }

    async fn select(&mut self, sql: &str, params: &[SqlValue]) -> Result<ResultSet, ExplorerError> {
        let client = self.client()?;
        build_result_set(client, sql, params).await
    }

    async fn close(&mut self) -> Result<(), ExplorerError> {
        match self.client.take() {
            Some(client) => client.close().await.map_err(|e| {
                ExplorerError::ConnectionError(format!("SQL Server close error: {e}"))
            }),
            None => Ok(()),
        }
    }
}
