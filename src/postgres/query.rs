use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tokio_postgres::{Column, Row, SimpleQueryMessage, Statement};

use super::diagnostics::describe_error;
use crate::error::ExplorerError;
use crate::results::ResultSet;
use crate::types::SqlValue;

/// Build a result set using statement metadata for column names, so the
/// columns are known even when no rows came back.
///
/// # Errors
/// Returns `ExplorerError::FormattingError` when a value cannot be materialized.
pub fn build_result_set_from_statement(
    stmt: &Statement,
    rows: &[Row],
) -> Result<ResultSet, ExplorerError> {
    let column_names: Vec<String> = stmt
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();
    let column_count = column_names.len();

    let mut result_set = ResultSet::with_columns(column_names, rows.len());
    for row in rows {
        let mut values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            values.push(postgres_extract_value(row, idx)?);
        }
        result_set.add_row_values(values);
    }

    Ok(result_set)
}

/// True when `type_name` has a binary decoder in [`postgres_extract_value`].
#[must_use]
pub fn has_binary_decoder(type_name: &str) -> bool {
    matches!(
        type_name,
        "int2"
            | "int4"
            | "int8"
            | "oid"
            | "float4"
            | "float8"
            | "bool"
            | "timestamp"
            | "timestamptz"
            | "date"
            | "json"
            | "jsonb"
            | "bytea"
            | "text"
            | "varchar"
            | "bpchar"
            | "name"
            | "unknown"
            | "citext"
    )
}

/// Build a result set from a simple-protocol response, where every value
/// arrives in its text form. `columns` comes from the prepared statement so
/// each value can be parsed back into the closest [`SqlValue`].
///
/// # Errors
/// Returns `ExplorerError::FormattingError` when a row is narrower than `columns`.
pub fn build_result_set_from_text(
    columns: &[Column],
    messages: &[SimpleQueryMessage],
) -> Result<ResultSet, ExplorerError> {
    let column_names: Vec<String> = columns.iter().map(|col| col.name().to_string()).collect();
    let rows: Vec<_> = messages
        .iter()
        .filter_map(|message| match message {
            SimpleQueryMessage::Row(row) => Some(row),
            _ => None,
        })
        .collect();

    let mut result_set = ResultSet::with_columns(column_names, rows.len());
    for row in rows {
        let mut values = Vec::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            let raw = row.try_get(idx).map_err(|e| {
                ExplorerError::FormattingError(format!(
                    "cannot read column '{}' of type {}: {}",
                    column.name(),
                    column.type_().name(),
                    describe_error(&e)
                ))
            })?;
            values.push(raw.map_or(SqlValue::Null, |raw| text_value(column.type_().name(), raw)));
        }
        result_set.add_row_values(values);
    }

    Ok(result_set)
}

/// Parse the Postgres text output of a value of type `type_name`.
///
/// Anything without a closer mapping (`numeric`, `uuid`, `interval`, arrays,
/// ...) stays the server's text.
fn text_value(type_name: &str, raw: &str) -> SqlValue {
    let parsed = match type_name {
        "int2" | "int4" | "int8" | "oid" => raw.parse().ok().map(SqlValue::Int),
        "float4" | "float8" => raw.parse().ok().map(SqlValue::Float),
        "bool" => match raw {
            "t" => Some(SqlValue::Bool(true)),
            "f" => Some(SqlValue::Bool(false)),
            _ => None,
        },
        "timestamp" => NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
            .ok()
            .map(SqlValue::Timestamp),
        "timestamptz" => DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z")
            .ok()
            .map(|v| SqlValue::Timestamp(v.naive_utc())),
        "json" | "jsonb" => serde_json::from_str(raw).ok().map(SqlValue::Json),
        "bytea" => raw.strip_prefix("\\x").and_then(decode_hex).map(SqlValue::Blob),
        _ => None,
    };
    parsed.unwrap_or_else(|| SqlValue::Text(raw.to_string()))
}

fn decode_hex(digits: &str) -> Option<Vec<u8>> {
    if digits.len() % 2 != 0 {
        return None;
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok())
        .collect()
}

/// Extract the value at `idx`, dispatching on the column's Postgres type name.
///
/// Only types accepted by [`has_binary_decoder`] are readable here; callers
/// route everything else through [`build_result_set_from_text`].
///
/// # Errors
/// Returns `ExplorerError::FormattingError` for unsupported or undecodable values.
pub fn postgres_extract_value(row: &Row, idx: usize) -> Result<SqlValue, ExplorerError> {
    let column = &row.columns()[idx];
    let type_name = column.type_().name();
    let undecodable = |e: tokio_postgres::Error| {
        ExplorerError::FormattingError(format!(
            "cannot read column '{}' of type {type_name}: {}",
            column.name(),
            describe_error(&e)
        ))
    };

    let value = match type_name {
        "int2" => row
            .try_get::<_, Option<i16>>(idx)
            .map(|v| v.map(|v| SqlValue::Int(i64::from(v)))),
        "int4" => row
            .try_get::<_, Option<i32>>(idx)
            .map(|v| v.map(|v| SqlValue::Int(i64::from(v)))),
        "int8" => row.try_get::<_, Option<i64>>(idx).map(|v| v.map(SqlValue::Int)),
        "oid" => row
            .try_get::<_, Option<u32>>(idx)
            .map(|v| v.map(|v| SqlValue::Int(i64::from(v)))),
        "float4" => row
            .try_get::<_, Option<f32>>(idx)
            .map(|v| v.map(|v| SqlValue::Float(f64::from(v)))),
        "float8" => row.try_get::<_, Option<f64>>(idx).map(|v| v.map(SqlValue::Float)),
        "bool" => row.try_get::<_, Option<bool>>(idx).map(|v| v.map(SqlValue::Bool)),
        "timestamp" => row
            .try_get::<_, Option<NaiveDateTime>>(idx)
            .map(|v| v.map(SqlValue::Timestamp)),
        "timestamptz" => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)
            .map(|v| v.map(|v| SqlValue::Timestamp(v.naive_utc()))),
        "date" => row
            .try_get::<_, Option<NaiveDate>>(idx)
            .map(|v| v.map(|v| SqlValue::Text(v.to_string()))),
        "json" | "jsonb" => row.try_get::<_, Option<Value>>(idx).map(|v| v.map(SqlValue::Json)),
        "bytea" => row.try_get::<_, Option<Vec<u8>>>(idx).map(|v| v.map(SqlValue::Blob)),
        _ => row.try_get::<_, Option<String>>(idx).map(|v| v.map(SqlValue::Text)),
    };

    value.map(|v| v.unwrap_or(SqlValue::Null)).map_err(undecodable)
}
