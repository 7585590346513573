use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use futures_util::TryStreamExt;
use tiberius::numeric::Numeric;
use tiberius::{Query, Uuid};

use super::config::MssqlClient;
use crate::error::ExplorerError;
use crate::results::ResultSet;
use crate::types::SqlValue;

/// Build a result set from a SQL Server query execution
///
/// # Errors
/// Returns `ExplorerError::ExecutionError` for driver failures and
/// `ExplorerError::FormattingError` for column types that cannot be read.
pub async fn build_result_set(
    client: &mut MssqlClient,
    query: &str,
    params: &[SqlValue],
) -> Result<ResultSet, ExplorerError> {
    let query_builder = bind_query_params(query, params);

    let mut stream = query_builder
        .query(client)
        .await
        .map_err(|e| ExplorerError::ExecutionError(format!("SQL Server query error: {e}")))?;

    let columns = stream
        .columns()
        .await
        .map_err(|e| {
            ExplorerError::ExecutionError(format!("SQL Server column fetch error: {e}"))
        })?
        .ok_or_else(|| {
            ExplorerError::ExecutionError("No columns returned from query".to_string())
        })?;

    let column_names: Vec<String> = columns.iter().map(|col| col.name().to_string()).collect();
    let col_count = column_names.len();
    let mut result_set = ResultSet::with_columns(column_names, 16);

    let mut rows_stream = stream.into_row_stream();
    while let Some(row) = rows_stream.try_next().await.map_err(|e| {
        ExplorerError::ExecutionError(format!("SQL Server row fetch error: {e}"))
    })? {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(extract_value(&row, i)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

/// Try one Rust type against the column; a type mismatch falls through to the
/// next candidate, a NULL of the matching type ends the search.
macro_rules! try_column {
    ($row:expr, $idx:expr, $ty:ty, $map:expr) => {
        match $row.try_get::<$ty, _>($idx) {
            Ok(Some(v)) => return Ok($map(v)),
            Ok(None) => return Ok(SqlValue::Null),
            Err(_) => {}
        }
    };
}

/// Extract a value from a row at a specific index
fn extract_value(row: &tiberius::Row, idx: usize) -> Result<SqlValue, ExplorerError> {
    try_column!(row, idx, u8, |v: u8| SqlValue::Int(i64::from(v)));
    try_column!(row, idx, i16, |v: i16| SqlValue::Int(i64::from(v)));
    try_column!(row, idx, i32, |v: i32| SqlValue::Int(i64::from(v)));
    try_column!(row, idx, i64, SqlValue::Int);
    try_column!(row, idx, f32, |v: f32| SqlValue::Float(f64::from(v)));
    try_column!(row, idx, f64, SqlValue::Float);
    try_column!(row, idx, bool, SqlValue::Bool);
    try_column!(row, idx, Numeric, |v: Numeric| SqlValue::Text(v.to_string()));
    try_column!(row, idx, NaiveDateTime, SqlValue::Timestamp);
    try_column!(row, idx, NaiveDate, |v: NaiveDate| SqlValue::Text(v.to_string()));
    try_column!(row, idx, NaiveTime, |v: NaiveTime| SqlValue::Text(v.to_string()));
    try_column!(row, idx, DateTime<FixedOffset>, |v: DateTime<FixedOffset>| {
        SqlValue::Text(v.to_rfc3339())
    });
    try_column!(row, idx, Uuid, |v: Uuid| SqlValue::Text(v.to_string()));
    try_column!(row, idx, &str, |v: &str| SqlValue::Text(v.to_string()));
    try_column!(row, idx, &[u8], |v: &[u8]| SqlValue::Blob(v.to_vec()));

    let column = &row.columns()[idx];
    Err(ExplorerError::FormattingError(format!(
        "unsupported SQL Server column type {:?} for column '{}'",
        column.column_type(),
        column.name()
    )))
}

/// Bind parameters directly to the query for SQL Server
/// Return a query builder with parameters already bound
pub fn bind_query_params<'a>(query: &'a str, params: &[SqlValue]) -> Query<'a> {
    let mut query_builder = Query::new(query);

    for param in params {
        match param {
            SqlValue::Int(i) => query_builder.bind(*i),
            SqlValue::Float(f) => query_builder.bind(*f),
            SqlValue::Text(s) => query_builder.bind(s.clone()),
            SqlValue::Bool(b) => query_builder.bind(*b),
            SqlValue::Timestamp(dt) => {
                query_builder.bind(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
            }
            SqlValue::Null => query_builder.bind(Option::<String>::None),
            SqlValue::Json(jsval) => query_builder.bind(jsval.to_string()),
            SqlValue::Blob(bytes) => query_builder.bind(bytes.clone()),
        }
    }

    query_builder
}
