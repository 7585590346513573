//! Read-only query firewall.
//!
//! Caller-supplied SQL moves through two types: [`validate`] turns raw text
//! into a [`ValidatedQuery`] and [`normalize`] turns that into a
//! [`BoundedQuery`]. Neither can be built any other way, and the gateway only
//! executes a `BoundedQuery`.

mod normalizer;
mod parsers;
mod scanner;
mod validator;

use thiserror::Error;

pub use normalizer::normalize;
pub use validator::validate;

/// Why the firewall refused a statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The statement does not start with an allowed read-only prefix.
    #[error("Only read-only queries allowed ({})", describe_leading(.leading))]
    NotReadOnly { leading: Option<String> },
    /// A blocked keyword was found; the first match in profile order is reported.
    #[error("Blocked keyword: {keyword}")]
    BlockedKeyword { keyword: String },
}

fn describe_leading(leading: &Option<String>) -> String {
    match leading {
        Some(word) => format!("query starts with {word}"),
        None => "query is empty".to_string(),
    }
}

/// Query text that passed the firewall for a particular profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuery {
    text: String,
}

impl ValidatedQuery {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Validated query text rewritten to return at most `row_cap` rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedQuery {
    text: String,
    row_cap: usize,
}

impl BoundedQuery {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn row_cap(&self) -> usize {
        self.row_cap
    }
}

impl std::fmt::Display for BoundedQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
