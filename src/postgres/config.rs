use std::fmt;
use std::time::Duration;

use super::diagnostics::describe_error;
use crate::error::ExplorerError;

/// Connection options for the Postgres backend.
#[derive(Clone)]
pub struct PostgresOptions {
    /// libpq-style URL or key/value string, e.g. `postgres://user:pw@host/db`
    pub url: String,
    pub connect_timeout: Duration,
}

impl fmt::Debug for PostgresOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the URL usually carries a password
        f.debug_struct("PostgresOptions")
            .field("url", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl PostgresOptions {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Parse the URL into a driver config, optionally retargeting the database.
    ///
    /// # Errors
    /// Returns `ExplorerError::ConfigError` if the URL cannot be parsed.
    pub fn to_tokio_config(
        &self,
        database: Option<&str>,
    ) -> Result<tokio_postgres::Config, ExplorerError> {
        let mut config: tokio_postgres::Config = self.url.parse().map_err(|e| {
            ExplorerError::ConfigError(format!(
                "invalid Postgres connection string: {}",
                describe_error(&e)
            ))
        })?;
        if let Some(db) = database {
            config.dbname(db);
        }
        config.connect_timeout(self.connect_timeout);
        Ok(config)
    }
}
