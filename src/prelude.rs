//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::{BackendSettings, ExplorerConfig};
pub use crate::dialect::{DialectProfile, KeywordMatch, PaginationStrategy};
pub use crate::error::ExplorerError;
pub use crate::explorer::Explorer;
pub use crate::firewall::{BoundedQuery, Rejection, ValidatedQuery, normalize, validate};
pub use crate::gateway::{Connector, Gateway, Session};
pub use crate::identifiers::{QualifiedName, quote_identifier};
pub use crate::prompt::sql_generation_prompt;
pub use crate::results::{ResultRow, ResultSet};
pub use crate::types::{DatabaseType, SqlValue};

#[cfg(feature = "mssql")]
pub use crate::mssql::{MssqlConnector, MssqlOptions, MssqlOptionsBuilder};
#[cfg(feature = "postgres")]
pub use crate::postgres::{PostgresConnector, PostgresOptions};
