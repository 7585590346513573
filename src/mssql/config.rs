use std::fmt;
use std::time::Duration;

use tiberius::{AuthMethod, Config as TiberiusConfig};
use tokio::net::TcpStream;
use tokio_util::compat::Compat;

use crate::error::ExplorerError;

/// Type alias for SQL Server client
pub type MssqlClient = tiberius::Client<Compat<TcpStream>>;

/// Options for opening SQL Server sessions.
///
/// Without a user/password pair the connection falls back to integrated
/// Windows authentication, which is only available on Windows builds.
#[derive(Clone)]
pub struct MssqlOptions {
    pub server: String,
    pub database: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub port: Option<u16>,
    pub instance_name: Option<String>,
    pub connect_timeout: Duration,
}

impl fmt::Debug for MssqlOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MssqlOptions")
            .field("server", &self.server)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("port", &self.port)
            .field("instance_name", &self.instance_name)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl MssqlOptions {
    #[must_use]
    pub fn new(server: String, database: String) -> Self {
        Self {
            server,
            database,
            user: None,
            password: None,
            port: None,
            instance_name: None,
            connect_timeout: Duration::from_secs(30),
        }
    }

    /// Split a `host\instance` server string into its parts.
    #[must_use]
    pub fn split_server(server: &str) -> (String, Option<String>) {
        match server.split_once('\\') {
            Some((host, instance)) if !instance.is_empty() => {
                (host.to_string(), Some(instance.to_string()))
            }
            Some((host, _)) => (host.to_string(), None),
            None => (server.to_string(), None),
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, user: String, password: String) -> Self {
        self.user = Some(user);
        self.password = Some(password);
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_instance_name(mut self, instance_name: Option<String>) -> Self {
        self.instance_name = instance_name;
        self
    }
}

/// Fluent builder for MSSQL options.
#[derive(Debug, Clone)]
pub struct MssqlOptionsBuilder {
    opts: MssqlOptions,
}

impl MssqlOptionsBuilder {
    /// Start from a server string, which may name an instance (`host\instance`).
    #[must_use]
    pub fn new(server: &str, database: String) -> Self {
        let (host, instance) = MssqlOptions::split_server(server);
        Self {
            opts: MssqlOptions::new(host, database).with_instance_name(instance),
        }
    }

    #[must_use]
    pub fn credentials(mut self, user: Option<String>, password: Option<String>) -> Self {
        self.opts.user = user;
        self.opts.password = password;
        self
    }

    #[must_use]
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.opts.port = port;
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.opts.connect_timeout = connect_timeout;
        self
    }

    #[must_use]
    pub fn finish(self) -> MssqlOptions {
        self.opts
    }
}

/// Translate options into a tiberius config, optionally targeting another database.
///
/// # Errors
/// Returns `ExplorerError::ConfigError` when no usable authentication method exists.
pub fn build_tiberius_config(
    opts: &MssqlOptions,
    database: Option<&str>,
) -> Result<TiberiusConfig, ExplorerError> {
    let mut config = TiberiusConfig::new();
    config.host(&opts.server);
    config.database(database.unwrap_or(&opts.database));
    // A named instance without a port is resolved through the SQL Browser.
    if let Some(port) = opts.port {
        config.port(port);
    }
    if let Some(instance) = &opts.instance_name {
        config.instance_name(instance);
    }
    match (&opts.user, &opts.password) {
        (Some(user), Some(password)) => {
            config.authentication(AuthMethod::sql_server(user, password));
        }
        _ => integrated_auth(&mut config)?,
    }
    config.trust_cert();
    Ok(config)
}

#[cfg(windows)]
#[allow(clippy::unnecessary_wraps)]
fn integrated_auth(config: &mut TiberiusConfig) -> Result<(), ExplorerError> {
    config.authentication(AuthMethod::Integrated);
    Ok(())
}

#[cfg(not(windows))]
fn integrated_auth(_config: &mut TiberiusConfig) -> Result<(), ExplorerError> {
    Err(ExplorerError::ConfigError(
        "SQL_USERNAME and SQL_PASSWORD are required; integrated authentication is only available on Windows"
            .to_string(),
    ))
}
