//! Fixed catalog statements for the descriptive operations.
//!
//! These are built from constant SQL plus bound parameters (or quoted
//! identifiers for the preview), so they skip the query firewall. A
//! [`CatalogQuery`] cannot be constructed outside this crate.

use crate::identifiers::QualifiedName;
use crate::types::{DatabaseType, SqlValue};

/// A trusted statement and the parameters bound to it.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    sql: String,
    params: Vec<SqlValue>,
}

impl CatalogQuery {
    fn fixed(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }
}

/// Accumulates SQL and numbered placeholders in the backend's style
/// (`$1` for Postgres, `@P1` for SQL Server).
struct Builder {
    database_type: DatabaseType,
    query: CatalogQuery,
}

impl Builder {
    fn new(database_type: DatabaseType, sql: &str) -> Self {
        Self {
            database_type,
            query: CatalogQuery::fixed(sql),
        }
    }

    fn push(&mut self, sql: &str) -> &mut Self {
        self.query.sql.push_str(sql);
        self
    }

    fn push_bound(&mut self, sql: &str, value: impl Into<String>) -> &mut Self {
        self.query.params.push(SqlValue::Text(value.into()));
        let n = self.query.params.len();
        self.query.sql.push_str(sql);
        match self.database_type {
            DatabaseType::Postgres => self.query.sql.push_str(&format!("${n}")),
            DatabaseType::Mssql => self.query.sql.push_str(&format!("@P{n}")),
        }
        self
    }

    fn finish(self) -> CatalogQuery {
        self.query
    }
}

#[must_use]
pub fn list_databases(database_type: DatabaseType) -> CatalogQuery {
    match database_type {
        DatabaseType::Postgres => CatalogQuery::fixed(
            "SELECT datname::text AS datname FROM pg_database \
             WHERE datistemplate = false ORDER BY datname",
        ),
        // database_id 1-4 are master, tempdb, model and msdb
        DatabaseType::Mssql => {
            CatalogQuery::fixed("SELECT name FROM sys.databases WHERE database_id > 4 ORDER BY name")
        }
    }
}

/// Postgres lists `public` tables of the given catalog; SQL Server lists
/// every base table of the connected database as `schema.table`.
#[must_use]
pub fn list_tables(database_type: DatabaseType, database: Option<&str>) -> CatalogQuery {
    match database_type {
        DatabaseType::Postgres => {
            let mut b = Builder::new(
                database_type,
                "SELECT table_name::text AS table_name FROM information_schema.tables \
                 WHERE table_schema = 'public'",
            );
            if let Some(db) = database {
                b.push_bound(" AND table_catalog::text = ", db);
            }
            b.push(" ORDER BY table_name");
            b.finish()
        }
        DatabaseType::Mssql => CatalogQuery::fixed(
            "SELECT TABLE_SCHEMA + '.' + TABLE_NAME AS full_table_name \
             FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_TYPE = 'BASE TABLE' \
             ORDER BY TABLE_SCHEMA, TABLE_NAME",
        ),
    }
}

/// Column name, type, nullability, default and max length, in ordinal order.
#[must_use]
pub fn table_schema(
    database_type: DatabaseType,
    database: Option<&str>,
    table: &QualifiedName,
) -> CatalogQuery {
    match database_type {
        DatabaseType::Postgres => {
            let mut b = Builder::new(
                database_type,
                "SELECT column_name::text AS column_name, data_type::text AS data_type, \
                 is_nullable::text AS is_nullable, column_default::text AS column_default, \
                 character_maximum_length::int8 AS character_maximum_length \
                 FROM information_schema.columns",
            );
            b.push_bound(" WHERE table_name::text = ", table.name.as_str());
            if let Some(schema) = &table.schema {
                b.push_bound(" AND table_schema::text = ", schema.as_str());
            }
            if let Some(db) = database {
                b.push_bound(" AND table_catalog::text = ", db);
            }
            b.push(" ORDER BY ordinal_position");
            b.finish()
        }
        DatabaseType::Mssql => {
            let mut b = Builder::new(
                database_type,
                "SELECT COLUMN_NAME, DATA_TYPE, IS_NULLABLE, COLUMN_DEFAULT, \
                 CHARACTER_MAXIMUM_LENGTH FROM INFORMATION_SCHEMA.COLUMNS",
            );
            b.push_bound(" WHERE TABLE_NAME = ", table.name.as_str());
            if let Some(schema) = &table.schema {
                b.push_bound(" AND TABLE_SCHEMA = ", schema.as_str());
            }
            b.push(" ORDER BY ORDINAL_POSITION");
            b.finish()
        }
    }
}

/// Count of tables named `table` in `schema` (0 or 1).
#[must_use]
pub fn table_exists(database_type: DatabaseType, schema: &str, table: &str) -> CatalogQuery {
    let (sql, schema_col, table_col) = match database_type {
        DatabaseType::Postgres => (
            "SELECT COUNT(*) AS matches FROM information_schema.tables",
            " WHERE table_schema::text = ",
            " AND table_name::text = ",
        ),
        DatabaseType::Mssql => (
            "SELECT COUNT(*) AS matches FROM INFORMATION_SCHEMA.TABLES",
            " WHERE TABLE_SCHEMA = ",
            " AND TABLE_NAME = ",
        ),
    };
    let mut b = Builder::new(database_type, sql);
    b.push_bound(schema_col, schema).push_bound(table_col, table);
    b.finish()
}

/// `SELECT *` of the first `rows` rows, with the table identifier quoted.
#[must_use]
pub fn preview(database_type: DatabaseType, table: &QualifiedName, rows: usize) -> CatalogQuery {
    let target = table.quoted(database_type);
    match database_type {
        DatabaseType::Postgres => CatalogQuery::fixed(format!("SELECT * FROM {target} LIMIT {rows}")),
        DatabaseType::Mssql => CatalogQuery::fixed(format!("SELECT TOP {rows} * FROM {target}")),
    }
}

#[must_use]
pub fn server_version(database_type: DatabaseType) -> CatalogQuery {
    match database_type {
        DatabaseType::Postgres => CatalogQuery::fixed("SELECT version() AS version"),
        DatabaseType::Mssql => CatalogQuery::fixed("SELECT @@VERSION AS version"),
    }
}
