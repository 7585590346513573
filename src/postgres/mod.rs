// PostgreSQL module - the generic-ANSI backend behind the explorer
//
// This module is split into several sub-modules for better organization:
// - config: Connection options (URL, connect timeout)
// - diagnostics: Driver error rendering with the server's cause
// - params: Parameter conversion between explorer values and PostgreSQL types
// - query: Result extraction and building
// - session: Connector/Session implementation over tokio-postgres

pub mod config;
mod diagnostics;
pub mod params;
pub mod query;
pub mod session;

// Re-export the public API
pub use config::PostgresOptions;
pub use params::Params;
pub use query::build_result_set_from_statement;
pub use session::{PostgresConnector, PostgresSession};
