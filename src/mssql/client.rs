use tiberius::{Client, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::TokioAsyncWriteCompatExt;

use super::config::{MssqlClient, MssqlOptions, build_tiberius_config};
use crate::error::ExplorerError;

/// Open a new SQL Server connection, bounded by the configured connect timeout.
///
/// Named instances are located through the SQL Browser service.
///
/// # Errors
/// Returns `ExplorerError::ConnectionError` if the MSSQL connection fails or
/// times out, and `ExplorerError::ConfigError` for unusable options.
pub async fn create_mssql_client(
    opts: &MssqlOptions,
    database: Option<&str>,
) -> Result<MssqlClient, ExplorerError> {
    let config = build_tiberius_config(opts, database)?;

    tokio::time::timeout(opts.connect_timeout, async move {
        let tcp = TcpStream::connect_named(&config).await.map_err(|e| {
            ExplorerError::ConnectionError(format!("TCP connection error: {e}"))
        })?;
        tcp.set_nodelay(true).map_err(|e| {
            ExplorerError::ConnectionError(format!("TCP configuration error: {e}"))
        })?;

        // Make compatible with Tiberius
        Client::connect(config, tcp.compat_write()).await.map_err(|e| {
            ExplorerError::ConnectionError(format!("SQL Server connection error: {e}"))
        })
    })
    .await
    .map_err(|_| {
        ExplorerError::ConnectionError(format!(
            "SQL Server connection timed out after {}s",
            opts.connect_timeout.as_secs()
        ))
    })?
}
