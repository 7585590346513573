//! Per-backend firewall rules.
//!
//! A [`DialectProfile`] is pure data: which statement kinds may run, which
//! keywords are refused, how result size is capped and which directive bounds
//! execution time on the server. One profile exists per [`DatabaseType`] and
//! none of its values can be changed by a caller.

use crate::types::DatabaseType;

/// Statement prefixes accepted by both dialects.
pub const READ_ONLY_PREFIXES: &[&str] = &["SELECT", "WITH", "SHOW", "EXPLAIN"];

const POSTGRES_BLOCKED: &[&str] = &[
    "DROP", "DELETE", "TRUNCATE", "ALTER", "UPDATE", "INSERT", "CREATE", "GRANT", "REVOKE",
    "VACUUM",
];

const TSQL_BLOCKED: &[&str] = &[
    "DROP", "DELETE", "TRUNCATE", "ALTER", "UPDATE", "INSERT", "CREATE", "GRANT", "REVOKE",
    "BACKUP", "RESTORE",
];

/// Maximum rows an ad-hoc query may return.
pub const ROW_CAP: usize = 1000;

/// Rows shown by the table preview.
pub const PREVIEW_ROWS: usize = 10;

const TIMEOUT_PLACEHOLDER: &str = "{timeout_ms}";

/// How a row cap is written into query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStrategy {
    /// Append `LIMIT n` to the statement.
    SuffixLimit,
    /// Inject `TOP n` after the first `SELECT`.
    PrefixTop,
}

/// How blocked keywords are located in query text.
///
/// `Substring` is the default and deliberately over-broad: a column named
/// `UPDATED_AT` trips the `UPDATE` rule. `Token` compares whole words only and
/// ignores comments, quoted literals and quoted identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeywordMatch {
    #[default]
    Substring,
    Token,
}

impl std::str::FromStr for KeywordMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(KeywordMatch::Substring),
            "token" => Ok(KeywordMatch::Token),
            other => Err(format!(
                "unknown keyword match policy '{other}' (expected 'substring' or 'token')"
            )),
        }
    }
}

/// Immutable safe-query ruleset for one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectProfile {
    database_type: DatabaseType,
    server_label: &'static str,
    allowed_prefixes: &'static [&'static str],
    blocked_keywords: &'static [&'static str],
    keyword_match: KeywordMatch,
    pagination: PaginationStrategy,
    row_cap: usize,
    preview_rows: usize,
    timeout_statement: &'static str,
    timeout_ms: u64,
}

impl DialectProfile {
    /// Generic ANSI profile used for `PostgreSQL`.
    #[must_use]
    pub fn postgres() -> Self {
        Self {
            database_type: DatabaseType::Postgres,
            server_label: "Postgres Explorer",
            allowed_prefixes: READ_ONLY_PREFIXES,
            blocked_keywords: POSTGRES_BLOCKED,
            keyword_match: KeywordMatch::Substring,
            pagination: PaginationStrategy::SuffixLimit,
            row_cap: ROW_CAP,
            preview_rows: PREVIEW_ROWS,
            timeout_statement: "SET statement_timeout = {timeout_ms}",
            timeout_ms: 3_000,
        }
    }

    /// T-SQL profile used for SQL Server.
    ///
    /// SQL Server has no per-session statement timeout; the bound is applied
    /// through `LOCK_TIMEOUT`, which aborts statements stuck waiting on locks.
    #[must_use]
    pub fn tsql() -> Self {
        Self {
            database_type: DatabaseType::Mssql,
            server_label: "SQL Server Explorer",
            allowed_prefixes: READ_ONLY_PREFIXES,
            blocked_keywords: TSQL_BLOCKED,
            keyword_match: KeywordMatch::Substring,
            pagination: PaginationStrategy::PrefixTop,
            row_cap: ROW_CAP,
            preview_rows: PREVIEW_ROWS,
            timeout_statement: "SET LOCK_TIMEOUT {timeout_ms}",
            timeout_ms: 30_000,
        }
    }

    #[must_use]
    pub fn for_database(database_type: DatabaseType) -> Self {
        match database_type {
            DatabaseType::Postgres => Self::postgres(),
            DatabaseType::Mssql => Self::tsql(),
        }
    }

    /// Switch the keyword policy. This is the only knob; the row cap and
    /// timeout stay fixed.
    #[must_use]
    pub fn with_keyword_match(mut self, keyword_match: KeywordMatch) -> Self {
        self.keyword_match = keyword_match;
        self
    }

    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        self.database_type
    }

    #[must_use]
    pub fn server_label(&self) -> &'static str {
        self.server_label
    }

    #[must_use]
    pub fn allowed_prefixes(&self) -> &'static [&'static str] {
        self.allowed_prefixes
    }

    #[must_use]
    pub fn blocked_keywords(&self) -> &'static [&'static str] {
        self.blocked_keywords
    }

    #[must_use]
    pub fn keyword_match(&self) -> KeywordMatch {
        self.keyword_match
    }

    #[must_use]
    pub fn pagination(&self) -> PaginationStrategy {
        self.pagination
    }

    #[must_use]
    pub fn row_cap(&self) -> usize {
        self.row_cap
    }

    #[must_use]
    pub fn preview_rows(&self) -> usize {
        self.preview_rows
    }

    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// The statement issued right after connecting, before the user query.
    #[must_use]
    pub fn timeout_directive(&self) -> String {
        self.timeout_statement
            .replace(TIMEOUT_PLACEHOLDER, &self.timeout_ms.to_string())
    }
}
