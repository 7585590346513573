use std::collections::HashMap;
use std::sync::Arc;

use super::row::{ResultRow, index_columns};
use crate::types::SqlValue;

/// Eagerly fetched result of one statement.
///
/// Column names come from statement metadata, so they are present even when
/// no rows came back. An empty `ResultSet` is a successful outcome, never an error.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub rows: Vec<ResultRow>,
    column_names: Arc<Vec<String>>,
    column_index: Arc<HashMap<String, usize>>,
}

impl ResultSet {
    /// Create an empty result set for the given columns.
    #[must_use]
    pub fn with_columns(column_names: Vec<String>, capacity: usize) -> ResultSet {
        let column_index = Arc::new(index_columns(&column_names));
        ResultSet {
            rows: Vec::with_capacity(capacity),
            column_names: Arc::new(column_names),
            column_index,
        }
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Append a row. Values must be positionally aligned with the column names.
    pub fn add_row_values(&mut self, values: Vec<SqlValue>) {
        debug_assert_eq!(values.len(), self.column_names.len());
        self.rows.push(ResultRow {
            column_names: Arc::clone(&self.column_names),
            values,
            column_index: Arc::clone(&self.column_index),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_share_column_metadata() {
        let mut rs = ResultSet::with_columns(vec!["id".into(), "name".into()], 2);
        rs.add_row_values(vec![SqlValue::Int(1), SqlValue::Text("alice".into())]);
        rs.add_row_values(vec![SqlValue::Int(2), SqlValue::Null]);

        assert_eq!(rs.len(), 2);
        assert_eq!(rs.rows[0].get("name").and_then(SqlValue::as_text), Some("alice"));
        assert!(rs.rows[1].get("name").is_some_and(SqlValue::is_null));
        assert!(Arc::ptr_eq(&rs.rows[0].column_names, &rs.rows[1].column_names));
    }

    #[test]
    fn empty_result_keeps_columns() {
        let rs = ResultSet::with_columns(vec!["id".into()], 0);
        assert!(rs.is_empty());
        assert_eq!(rs.column_names(), ["id".to_string()]);
    }
}
