//! Prompt text for turning a natural-language request into SQL.

use crate::types::DatabaseType;

/// Render the SQL-generation prompt for `database_type`.
///
/// The rules mirror what the firewall accepts: read-only statements, the
/// dialect's own pagination keyword, schema-qualified names.
#[must_use]
pub fn sql_generation_prompt(
    database_type: DatabaseType,
    natural_query: &str,
    schema_info: &str,
) -> String {
    let (expert, dialect, pagination, example) = match database_type {
        DatabaseType::Postgres => (
            "PostgreSQL",
            "PostgreSQL",
            "Use LIMIT to restrict the number of rows.",
            "public.orders",
        ),
        DatabaseType::Mssql => (
            "SQL Server",
            "SQL Server (T-SQL)",
            "Use TOP instead of LIMIT.",
            "Sales.SalesOrderHeader",
        ),
    };

    format!(
        "You are a senior {expert} expert.\n\
         \n\
         Convert the following natural language request into a {dialect} query.\n\
         \n\
         Rules:\n\
         - Use {expert} syntax.\n\
         - {pagination}\n\
         - Do not generate INSERT, UPDATE, DELETE, DROP.\n\
         - Only generate SELECT queries.\n\
         - Use schema-qualified table names (e.g., {example}).\n\
         - No explanations, only SQL.\n\
         \n\
         Database schema:\n\
         {schema_info}\n\
         \n\
         User request:\n\
         {natural_query}\n"
    )
}
