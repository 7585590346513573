use thiserror::Error;

use crate::firewall::Rejection;

/// Every failure an explorer operation can run into.
///
/// Only two shapes ever reach the caller: rejections become `Blocked: ...`
/// and everything else becomes `Internal error: ...` (see [`ExplorerError::user_message`]).
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// The query firewall refused the statement. No connection was opened.
    #[error(transparent)]
    Blocked(#[from] Rejection),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Driver-level failure while running a statement, including server-side timeouts.
    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    /// A column value could not be materialized into an [`SqlValue`](crate::types::SqlValue).
    #[error("Formatting error: {0}")]
    FormattingError(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),
}

impl ExplorerError {
    /// True when the error came from the query firewall rather than the database.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        matches!(self, ExplorerError::Blocked(_))
    }

    /// The short text handed back to the calling agent.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ExplorerError::Blocked(rejection) => format!("Blocked: {rejection}"),
            other => format!("Internal error: {other}"),
        }
    }
}
