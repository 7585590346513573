//! Text rendering of result sets.
//!
//! An empty result always renders as a sentinel string, never as an empty
//! body, so "ran fine, zero rows" cannot be confused with a failure.

use crate::results::ResultSet;
use crate::types::SqlValue;

/// Sentinel for an ad-hoc query that returned no rows.
pub const NO_RESULTS: &str = "No results";
/// Sentinel for an empty table preview.
pub const NO_ROWS: &str = "No rows found";

static NULL: SqlValue = SqlValue::Null;

/// One line per row, `{'column': value, ...}`, columns in metadata order.
#[must_use]
pub fn render_rows(rs: &ResultSet, empty: &str) -> String {
    if rs.is_empty() {
        return empty.to_string();
    }
    rs.rows
        .iter()
        .map(|row| {
            let fields: Vec<String> = row
                .iter()
                .map(|(column, value)| format!("'{column}': {}", value.render_literal()))
                .collect();
            format!("{{{}}}", fields.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The first column of every row as bare values, newline-joined.
#[must_use]
pub fn render_column(rs: &ResultSet, empty: &str) -> String {
    let values: Vec<String> = rs
        .rows
        .iter()
        .filter_map(|row| row.get_by_index(0))
        .map(ToString::to_string)
        .collect();
    if values.is_empty() {
        empty.to_string()
    } else {
        values.join("\n")
    }
}

/// `column: type` lines from a column-metadata result.
///
/// Expects the columns produced by [`catalog::table_schema`](crate::catalog::table_schema):
/// name, type, nullability, default, max length. With `detailed`, the type is
/// followed by `(max_length)`, ` NOT NULL` and ` DEFAULT <expr>` when present.
/// Returns `None` for an empty result.
#[must_use]
pub fn render_schema(rs: &ResultSet, detailed: bool) -> Option<String> {
    if rs.is_empty() {
        return None;
    }
    let lines: Vec<String> = rs
        .rows
        .iter()
        .map(|row| {
            let field = |idx| row.get_by_index(idx).unwrap_or(&NULL);
            let mut line = format!("{}: {}", field(0), field(1));
            if detailed {
                match field(4) {
                    SqlValue::Null | SqlValue::Int(0) => {}
                    max_length => line.push_str(&format!("({max_length})")),
                }
                if field(2).as_text() == Some("NO") {
                    line.push_str(" NOT NULL");
                }
                if !field(3).is_null() {
                    line.push_str(&format!(" DEFAULT {}", field(3)));
                }
            }
            line
        })
        .collect();
    Some(lines.join("\n"))
}
