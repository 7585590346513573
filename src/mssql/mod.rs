// MSSQL module - the T-SQL backend behind the explorer
//
// This module is split into several sub-modules for better organization:
// - config: Connection options and tiberius configuration
// - client: Raw client creation (TCP, named instances, connect timeout)
// - query: Result extraction, building, and query binding
// - session: Connector/Session implementation over tiberius

pub mod client;
pub mod config;
pub mod query;
pub mod session;

// Re-export the public API
pub use client::create_mssql_client;
pub use config::{MssqlClient, MssqlOptions, MssqlOptionsBuilder};
pub use query::build_result_set;
pub use session::{MssqlConnector, MssqlSession};
