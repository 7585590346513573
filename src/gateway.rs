//! Execution gateway.
//!
//! Every call opens its own [`Session`] through a [`Connector`], runs its
//! statements and closes the session before returning, on success and on
//! failure alike. If the calling future is dropped mid-flight, the
//! [`ScopedSession`] guard drops the backend session, whose own `Drop`
//! releases the driver resources.

use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::CatalogQuery;
use crate::dialect::DialectProfile;
use crate::error::ExplorerError;
use crate::firewall::BoundedQuery;
use crate::results::ResultSet;
use crate::types::{DatabaseType, SqlValue};

/// One live connection owned by a single invocation.
#[async_trait]
pub trait Session: Send {
    /// Run statements that return no rows (session settings).
    ///
    /// # Errors
    /// Returns `ExplorerError::ExecutionError` when the server rejects the batch.
    async fn execute_batch(&mut self, sql: &str) -> Result<(), ExplorerError>;

    /// Run a statement and fetch every row eagerly.
    ///
    /// # Errors
    /// Returns `ExplorerError::ExecutionError` for driver failures and
    /// `ExplorerError::FormattingError` for values that cannot be materialized.
    async fn select(&mut self, sql: &str, params: &[SqlValue]) -> Result<ResultSet, ExplorerError>;

    /// Close the connection. Called at most once.
    ///
    /// # Errors
    /// Returns an error if the driver reports a failure while shutting down;
    /// the connection is gone either way.
    async fn close(&mut self) -> Result<(), ExplorerError>;
}

/// Opens sessions against one backend.
#[async_trait]
pub trait Connector: Send + Sync {
    fn database_type(&self) -> DatabaseType;

    /// Open a new session, connecting to `database` instead of the configured
    /// default when given.
    ///
    /// # Errors
    /// Returns `ExplorerError::ConnectionError` if no session can be established.
    async fn connect(&self, database: Option<&str>) -> Result<Box<dyn Session>, ExplorerError>;
}

/// Runs statements for one dialect profile.
#[derive(Clone)]
pub struct Gateway {
    connector: Arc<dyn Connector>,
    profile: DialectProfile,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("database_type", &self.connector.database_type())
            .field("profile", &self.profile)
            .finish()
    }
}

impl Gateway {
    #[must_use]
    pub fn new(connector: Arc<dyn Connector>, profile: DialectProfile) -> Self {
        Self { connector, profile }
    }

    #[must_use]
    pub fn profile(&self) -> &DialectProfile {
        &self.profile
    }

    /// Execute a firewall-approved query under the profile's timeout directive.
    ///
    /// The directive is the first statement on the fresh session; the query
    /// runs only if it succeeded.
    ///
    /// # Errors
    /// Returns connection, execution or formatting errors. The session is
    /// closed before the error is returned.
    pub async fn execute(
        &self,
        query: &BoundedQuery,
        database: Option<&str>,
    ) -> Result<ResultSet, ExplorerError> {
        let directive = self.profile.timeout_directive();
        let mut session = self.open(database).await?;

        let outcome = match session.execute_batch(&directive).await {
            Ok(()) => session.select(query.as_str(), &[]).await,
            Err(e) => Err(e),
        };
        session.release().await;

        match &outcome {
            Ok(rs) => tracing::debug!(rows = rs.len(), "bounded query completed"),
            Err(e) => tracing::error!(error = %e, query = %query, "bounded query failed"),
        }
        outcome
    }

    /// Run a single trusted catalog statement on a fresh session.
    pub(crate) async fn run_catalog(
        &self,
        query: &CatalogQuery,
        database: Option<&str>,
    ) -> Result<ResultSet, ExplorerError> {
        let mut session = self.open(database).await?;
        let outcome = session.select_catalog(query).await;
        session.release().await;

        if let Err(e) = &outcome {
            tracing::warn!(error = %e, query = query.sql(), "catalog query failed");
        }
        outcome
    }

    /// Open a guarded session for operations that need several statements.
    pub(crate) async fn open(&self, database: Option<&str>) -> Result<ScopedSession, ExplorerError> {
        let inner = self.connector.connect(database).await.inspect_err(|e| {
            tracing::warn!(error = %e, database = ?database, "could not open session");
        })?;
        Ok(ScopedSession {
            inner,
            released: false,
        })
    }
}

/// A session that is closed exactly once: explicitly through
/// [`ScopedSession::release`], or by `Drop` if the owner never got there.
pub(crate) struct ScopedSession {
    inner: Box<dyn Session>,
    released: bool,
}

impl ScopedSession {
    async fn execute_batch(&mut self, sql: &str) -> Result<(), ExplorerError> {
        self.inner.execute_batch(sql).await
    }

    async fn select(&mut self, sql: &str, params: &[SqlValue]) -> Result<ResultSet, ExplorerError> {
        self.inner.select(sql, params).await
    }

    pub(crate) async fn select_catalog(
        &mut self,
        query: &CatalogQuery,
    ) -> Result<ResultSet, ExplorerError> {
        self.select(query.sql(), query.params()).await
    }

    pub(crate) async fn release(mut self) {
        self.released = true;
        if let Err(e) = self.inner.close().await {
            tracing::warn!(error = %e, "error while closing session");
        }
    }
}

impl Drop for ScopedSession {
    fn drop(&mut self) {
        if !self.released {
            tracing::debug!("session dropped before release; closing with the connection handle");
        }
    }
}
