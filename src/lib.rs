//! Read-only SQL exploration for agents.
//!
//! Ad-hoc queries pass through a dialect-aware firewall before they reach a
//! database: [`firewall::validate`] admits only read-only statements,
//! [`firewall::normalize`] caps the row count, and [`gateway::Gateway`] runs
//! the result on a fresh session under a server-side timeout. The
//! [`explorer::Explorer`] wraps all of it into operations that always answer
//! with text.
//!
//! ```rust
//! use sql_explorer::prelude::*;
//!
//! let profile = DialectProfile::tsql();
//! let validated = validate("SELECT name FROM employees", &profile).unwrap();
//! assert_eq!(
//!     normalize(&validated, &profile).as_str(),
//!     "SELECT TOP 1000 name FROM employees"
//! );
//! assert!(validate("DROP TABLE users;", &profile).is_err());
//! ```

pub mod catalog;
pub mod config;
pub mod dialect;
pub mod error;
pub mod explorer;
pub mod firewall;
pub mod format;
pub mod gateway;
pub mod identifiers;
pub mod logging;
pub mod prelude;
pub mod prompt;
pub mod results;
pub mod types;

#[cfg(feature = "mssql")]
pub mod mssql;
#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::ExplorerError;
pub use explorer::Explorer;
