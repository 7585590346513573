use std::collections::HashMap;
use std::sync::Arc;

use crate::types::SqlValue;

/// A single materialized row.
///
/// Column names and the name → index lookup are shared with every other row
/// of the same [`ResultSet`](super::ResultSet).
#[derive(Debug, Clone)]
pub struct ResultRow {
    /// Column names in result-metadata order
    pub column_names: Arc<Vec<String>>,
    /// Values, positionally aligned with `column_names`
    pub values: Vec<SqlValue>,
    pub(crate) column_index: Arc<HashMap<String, usize>>,
}

impl ResultRow {
    /// Build a standalone row, computing its own column lookup.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<SqlValue>) -> Self {
        let column_index = Arc::new(index_columns(&column_names));
        Self {
            column_names,
            values,
            column_index,
        }
    }

    /// Get a value by column name. Duplicate names resolve to the first occurrence.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&SqlValue> {
        self.column_index
            .get(column_name)
            .and_then(|&idx| self.values.get(idx))
    }

    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Pairs of (column name, value) in metadata order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

pub(crate) fn index_columns(column_names: &[String]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(column_names.len());
    for (i, name) in column_names.iter().enumerate() {
        index.entry(name.clone()).or_insert(i);
    }
    index
}
