//! Explorer configuration from environment variables or a dotenv file.
//!
//! Nothing here reads the environment implicitly: callers pick
//! [`ExplorerConfig::from_env`], [`ExplorerConfig::from_env_file`] or feed
//! their own lookup to [`ExplorerConfig::from_lookup`].

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::dialect::{DialectProfile, KeywordMatch};
use crate::error::ExplorerError;
use crate::explorer::Explorer;
use crate::gateway::{Connector, Gateway};
use crate::types::DatabaseType;

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MSSQL_SERVER: &str = "localhost";
const DEFAULT_MSSQL_DATABASE: &str = "master";

/// Where and how to connect, per backend.
#[derive(Clone, PartialEq, Eq)]
pub enum BackendSettings {
    Postgres {
        url: String,
    },
    Mssql {
        /// `host` or `host\instance`
        server: String,
        port: Option<u16>,
        database: String,
        user: Option<String>,
        password: Option<String>,
    },
}

impl fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendSettings::Postgres { .. } => f
                .debug_struct("Postgres")
                .field("url", &"<redacted>")
                .finish(),
            BackendSettings::Mssql {
                server,
                port,
                database,
                user,
                password,
            } => f
                .debug_struct("Mssql")
                .field("server", server)
                .field("port", port)
                .field("database", database)
                .field("user", user)
                .field("password", &password.as_ref().map(|_| "<redacted>"))
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerConfig {
    pub backend: BackendSettings,
    pub keyword_match: KeywordMatch,
    pub connect_timeout: Duration,
    /// Schema tried for unqualified names in table previews.
    pub default_schema: Option<String>,
}

impl ExplorerConfig {
    /// Build a configuration from the process environment.
    ///
    /// # Errors
    /// Returns `ExplorerError::ConfigError` for missing or malformed values.
    pub fn from_env(database_type: DatabaseType) -> Result<Self, ExplorerError> {
        Self::from_lookup(database_type, |key| std::env::var(key).ok())
    }

    /// Build a configuration from a dotenv file. Keys in the file win over the
    /// process environment; keys absent from the file fall back to it.
    ///
    /// # Errors
    /// Returns `ExplorerError::ConfigError` if the file cannot be read or parsed,
    /// or for missing or malformed values.
    pub fn from_env_file(
        database_type: DatabaseType,
        path: impl AsRef<Path>,
    ) -> Result<Self, ExplorerError> {
        let path = path.as_ref();
        let entries = dotenvy::from_path_iter(path)
            .map_err(|e| {
                ExplorerError::ConfigError(format!("cannot read {}: {e}", path.display()))
            })?
            .collect::<Result<HashMap<String, String>, _>>()
            .map_err(|e| {
                ExplorerError::ConfigError(format!("cannot parse {}: {e}", path.display()))
            })?;

        Self::from_lookup(database_type, |key| {
            entries
                .get(key)
                .cloned()
                .or_else(|| std::env::var(key).ok())
        })
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns `ExplorerError::ConfigError` for missing or malformed values.
    pub fn from_lookup<F>(database_type: DatabaseType, lookup: F) -> Result<Self, ExplorerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let backend = match database_type {
            DatabaseType::Postgres => BackendSettings::Postgres {
                url: var("DATABASE_URL").ok_or_else(|| {
                    ExplorerError::ConfigError("DATABASE_URL is not set".to_string())
                })?,
            },
            DatabaseType::Mssql => BackendSettings::Mssql {
                server: var("SQL_SERVER").unwrap_or_else(|| DEFAULT_MSSQL_SERVER.to_string()),
                port: var("SQL_PORT")
                    .map(|raw| parse_number::<u16>("SQL_PORT", &raw))
                    .transpose()?,
                database: var("SQL_DATABASE")
                    .unwrap_or_else(|| DEFAULT_MSSQL_DATABASE.to_string()),
                user: var("SQL_USERNAME"),
                password: var("SQL_PASSWORD"),
            },
        };

        let keyword_match = var("SQL_EXPLORER_KEYWORD_MATCH")
            .map(|raw| {
                raw.parse::<KeywordMatch>().map_err(|e| {
                    ExplorerError::ConfigError(format!("SQL_EXPLORER_KEYWORD_MATCH: {e}"))
                })
            })
            .transpose()?
            .unwrap_or_default();

        let connect_timeout = var("SQL_EXPLORER_CONNECT_TIMEOUT_SECS")
            .map(|raw| parse_number::<u64>("SQL_EXPLORER_CONNECT_TIMEOUT_SECS", &raw))
            .transpose()?
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);

        Ok(Self {
            backend,
            keyword_match,
            connect_timeout: Duration::from_secs(connect_timeout),
            default_schema: var("SQL_DEFAULT_SCHEMA"),
        })
    }

    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        match self.backend {
            BackendSettings::Postgres { .. } => DatabaseType::Postgres,
            BackendSettings::Mssql { .. } => DatabaseType::Mssql,
        }
    }

    #[must_use]
    pub fn profile(&self) -> DialectProfile {
        DialectProfile::for_database(self.database_type()).with_keyword_match(self.keyword_match)
    }

    /// The connector for the configured backend. Connects lazily.
    ///
    /// # Errors
    /// Returns `ExplorerError::Unimplemented` when the backend was not compiled
    /// in, or `ExplorerError::ConfigError` for unusable settings.
    pub fn connector(&self) -> Result<Arc<dyn Connector>, ExplorerError> {
        match &self.backend {
            BackendSettings::Postgres { url } => postgres_connector(url, self.connect_timeout),
            BackendSettings::Mssql {
                server,
                port,
                database,
                user,
                password,
            } => mssql_connector(
                server,
                *port,
                database,
                (user.clone(), password.clone()),
                self.connect_timeout,
            ),
        }
    }

    /// Assemble a ready-to-use [`Explorer`].
    ///
    /// # Errors
    /// See [`ExplorerConfig::connector`].
    pub fn explorer(&self) -> Result<Explorer, ExplorerError> {
        let gateway = Gateway::new(self.connector()?, self.profile());
        Ok(Explorer::new(gateway).with_default_schema(self.default_schema.clone()))
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ExplorerError>
where
    T::Err: fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| ExplorerError::ConfigError(format!("{key} must be a number ({raw}): {e}")))
}

#[cfg(feature = "postgres")]
fn postgres_connector(
    url: &str,
    connect_timeout: Duration,
) -> Result<Arc<dyn Connector>, ExplorerError> {
    use crate::postgres::{PostgresConnector, PostgresOptions};

    let options = PostgresOptions::new(url).with_connect_timeout(connect_timeout);
    // fail early on a malformed URL instead of at first use
    options.to_tokio_config(None)?;
    Ok(Arc::new(PostgresConnector::new(options)))
}

#[cfg(not(feature = "postgres"))]
fn postgres_connector(
    _url: &str,
    _connect_timeout: Duration,
) -> Result<Arc<dyn Connector>, ExplorerError> {
    Err(ExplorerError::Unimplemented(
        "this build has no Postgres support (feature `postgres`)".to_string(),
    ))
}

#[cfg(feature = "mssql")]
#[allow(clippy::unnecessary_wraps)]
fn mssql_connector(
    server: &str,
    port: Option<u16>,
    database: &str,
    (user, password): (Option<String>, Option<String>),
    connect_timeout: Duration,
) -> Result<Arc<dyn Connector>, ExplorerError> {
    use crate::mssql::{MssqlConnector, MssqlOptionsBuilder};

    let options = MssqlOptionsBuilder::new(server, database.to_string())
        .credentials(user, password)
        .port(port)
        .connect_timeout(connect_timeout)
        .finish();
    Ok(Arc::new(MssqlConnector::new(options)))
}

#[cfg(not(feature = "mssql"))]
fn mssql_connector(
    _server: &str,
    _port: Option<u16>,
    _database: &str,
    _credentials: (Option<String>, Option<String>),
    _connect_timeout: Duration,
) -> Result<Arc<dyn Connector>, ExplorerError> {
    Err(ExplorerError::Unimplemented(
        "this build has no SQL Server support (feature `mssql`)".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn postgres_requires_a_url() {
        let err = ExplorerConfig::from_lookup(DatabaseType::Postgres, lookup(&[])).unwrap_err();
        assert!(matches!(err, ExplorerError::ConfigError(ref m) if m.contains("DATABASE_URL")));

        let cfg = ExplorerConfig::from_lookup(
            DatabaseType::Postgres,
            lookup(&[("DATABASE_URL", "postgres://u:p@localhost/app")]),
        )
        .unwrap();
        assert_eq!(cfg.database_type(), DatabaseType::Postgres);
        assert_eq!(cfg.keyword_match, KeywordMatch::Substring);
        assert_eq!(cfg.connect_timeout, Duration::from_secs(30));
        assert!(!format!("{cfg:?}").contains("u:p"));
    }

    #[test]
    fn mssql_defaults_and_overrides() {
        let cfg = ExplorerConfig::from_lookup(DatabaseType::Mssql, lookup(&[])).unwrap();
        assert_eq!(
            cfg.backend,
            BackendSettings::Mssql {
                server: "localhost".into(),
                port: None,
                database: "master".into(),
                user: None,
                password: None,
            }
        );

        let cfg = ExplorerConfig::from_lookup(
            DatabaseType::Mssql,
            lookup(&[
                ("SQL_SERVER", r"db01\SQLEXPRESS"),
                ("SQL_PORT", "14330"),
                ("SQL_DATABASE", "AdventureWorksLT"),
                ("SQL_USERNAME", "reader"),
                ("SQL_PASSWORD", "  "),
                ("SQL_DEFAULT_SCHEMA", "SalesLT"),
                ("SQL_EXPLORER_KEYWORD_MATCH", "token"),
                ("SQL_EXPLORER_CONNECT_TIMEOUT_SECS", "5"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.default_schema.as_deref(), Some("SalesLT"));
        assert_eq!(cfg.profile().keyword_match(), KeywordMatch::Token);
        assert_eq!(cfg.connect_timeout, Duration::from_secs(5));
        match &cfg.backend {
            BackendSettings::Mssql { port, password, .. } => {
                assert_eq!(*port, Some(14330));
                assert_eq!(*password, None);
            }
            other => panic!("unexpected backend {other:?}"),
        }
    }

    #[test]
    fn malformed_values_are_config_errors() {
        for pairs in [
            [("SQL_PORT", "not-a-port")],
            [("SQL_EXPLORER_KEYWORD_MATCH", "fuzzy")],
            [("SQL_EXPLORER_CONNECT_TIMEOUT_SECS", "-1")],
        ] {
            let err = ExplorerConfig::from_lookup(DatabaseType::Mssql, lookup(&pairs)).unwrap_err();
            assert!(matches!(err, ExplorerError::ConfigError(_)), "{pairs:?}");
        }
    }

    #[test]
    fn dotenv_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "DATABASE_URL=postgres://reader:pw@db.internal:5432/shop").unwrap();
        writeln!(file, "SQL_EXPLORER_KEYWORD_MATCH=token").unwrap();
        writeln!(file, "SQL_EXPLORER_CONNECT_TIMEOUT_SECS=7").unwrap();

        let cfg = ExplorerConfig::from_env_file(DatabaseType::Postgres, file.path()).unwrap();
        assert_eq!(
            cfg.backend,
            BackendSettings::Postgres {
                url: "postgres://reader:pw@db.internal:5432/shop".into()
            }
        );
        assert_eq!(cfg.keyword_match, KeywordMatch::Token);
        assert_eq!(cfg.connect_timeout, Duration::from_secs(7));
    }

    #[test]
    fn missing_dotenv_file_is_a_config_error() {
        let err = ExplorerConfig::from_env_file(DatabaseType::Mssql, "/nonexistent/explorer.env")
            .unwrap_err();
        assert!(matches!(err, ExplorerError::ConfigError(_)));
    }

    #[cfg(feature = "mssql")]
    #[test]
    fn explorer_builds_without_connecting() {
        let cfg = ExplorerConfig::from_lookup(
            DatabaseType::Mssql,
            lookup(&[("SQL_USERNAME", "sa"), ("SQL_PASSWORD", "pw")]),
        )
        .unwrap();
        let explorer = cfg.explorer().unwrap();
        assert_eq!(explorer.database_type(), DatabaseType::Mssql);
        assert_eq!(explorer.profile().server_label(), "SQL Server Explorer");
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn malformed_postgres_url_fails_before_connecting() {
        let cfg = ExplorerConfig::from_lookup(
            DatabaseType::Postgres,
            lookup(&[("DATABASE_URL", "postgres://host:notaport/db")]),
        )
        .unwrap();
        match cfg.explorer().err() {
            Some(ExplorerError::ConfigError(message)) => {
                assert!(message.contains("invalid Postgres connection string"), "{message}");
            }
            other => panic!("expected a config error, got {other:?}"),
        }

        let cfg = ExplorerConfig::from_lookup(
            DatabaseType::Postgres,
            lookup(&[("DATABASE_URL", "postgres://reader@localhost/shop")]),
        )
        .unwrap();
        assert!(cfg.explorer().is_ok());
    }
}
