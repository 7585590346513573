//! Table references supplied by the caller, quoted per dialect.
//!
//! Names are never interpolated raw: every part is wrapped in the dialect's
//! identifier quotes with embedded quote characters doubled.

use crate::error::ExplorerError;
use crate::types::DatabaseType;

/// A `table` or `schema.table` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub schema: Option<String>,
    pub name: String,
}

impl QualifiedName {
    /// Split on the first `.`; the remainder (dots included) is the table name.
    ///
    /// # Errors
    /// Returns `ExplorerError::InvalidIdentifier` when the reference or either part is empty.
    pub fn parse(reference: &str) -> Result<Self, ExplorerError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(ExplorerError::InvalidIdentifier(
                "table name must not be empty".to_string(),
            ));
        }
        match reference.split_once('.') {
            Some((schema, name)) => {
                if schema.is_empty() || name.is_empty() {
                    return Err(ExplorerError::InvalidIdentifier(format!(
                        "malformed table reference '{reference}'"
                    )));
                }
                Ok(Self {
                    schema: Some(schema.to_string()),
                    name: name.to_string(),
                })
            }
            None => Ok(Self {
                schema: None,
                name: reference.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    #[must_use]
    pub fn is_qualified(&self) -> bool {
        self.schema.is_some()
    }

    /// Render as a quoted identifier for `database_type`.
    #[must_use]
    pub fn quoted(&self, database_type: DatabaseType) -> String {
        let quote = |part: &str| quote_identifier(part, database_type);
        match &self.schema {
            Some(schema) => format!("{}.{}", quote(schema), quote(&self.name)),
            None => quote(&self.name),
        }
    }
}

/// Quote one identifier part: `"a""b"` for Postgres, `[a]]b]` for SQL Server.
#[must_use]
pub fn quote_identifier(part: &str, database_type: DatabaseType) -> String {
    match database_type {
        DatabaseType::Postgres => format!("\"{}\"", part.replace('"', "\"\"")),
        DatabaseType::Mssql => format!("[{}]", part.replace(']', "]]")),
    }
}
