//! Round trips against real servers. Each test returns early unless its
//! connection variables are set, e.g.
//! `SQL_EXPLORER_TEST_PG_URL=postgres://user:pw@localhost/postgres` or
//! `SQL_EXPLORER_TEST_MSSQL_SERVER` / `_USERNAME` / `_PASSWORD` (`_PORT`, `_DATABASE` optional).

use sql_explorer::prelude::*;
use tokio::runtime::Runtime;

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

async fn exercise(explorer: &Explorer, label: &str) {
    let hello = explorer.hello("tests").await;
    assert!(hello.starts_with(&format!("Hello from {label}, tests!")), "{hello}");

    assert_eq!(
        explorer.execute_query(None, "SELECT 1 AS one").await,
        "{'one': 1}"
    );
    assert!(
        explorer
            .execute_query(None, "DROP TABLE users;")
            .await
            .starts_with("Blocked:")
    );
    let databases = explorer.list_databases().await;
    assert!(!databases.starts_with("Internal error:"), "{databases}");

    let bad = explorer
        .execute_query(None, "SELECT * FROM no_such_table_for_explorer_tests")
        .await;
    assert!(bad.starts_with("Internal error:"), "{bad}");
}

#[cfg(feature = "postgres")]
#[test]
fn postgres_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let Some(url) = env("SQL_EXPLORER_TEST_PG_URL") else {
        eprintln!("SQL_EXPLORER_TEST_PG_URL not set; skipping");
        return Ok(());
    };
    let config = ExplorerConfig::from_lookup(DatabaseType::Postgres, |key| {
        (key == "DATABASE_URL").then(|| url.clone())
    })?;
    let explorer = config.explorer()?;

    let rt = Runtime::new()?;
    rt.block_on(async {
        exercise(&explorer, "Postgres Explorer").await;
        // timestamps and nulls come back through the shared value type
        let out = explorer
            .execute_query(
                None,
                "SELECT TIMESTAMP '2024-03-01 09:30:00' AS ts, NULL::text AS nothing",
            )
            .await;
        assert_eq!(out, "{'ts': '2024-03-01 09:30:00', 'nothing': NULL}");

        // types without a native mapping come back as the server's text
        let out = explorer
            .execute_query(None, "SELECT AVG(x) AS avg FROM (VALUES (1), (2)) v(x)")
            .await;
        assert_eq!(out, "{'avg': '1.5000000000000000'}");
        let out = explorer
            .execute_query(
                None,
                "SELECT 1.5::numeric AS price, interval '1 day' AS span, \
                 ARRAY[1, 2] AS pair, 7 AS n, '00000000-0000-0000-0000-000000000001'::uuid AS id",
            )
            .await;
        assert_eq!(
            out,
            "{'price': '1.5', 'span': '1 day', 'pair': '{1,2}', 'n': 7, \
             'id': '00000000-0000-0000-0000-000000000001'}"
        );
        let out = explorer.execute_query(None, "SELECT gen_random_uuid() AS id").await;
        assert!(out.starts_with("{'id': '"), "{out}");
        let out = explorer.view_table(None, "pg_catalog.pg_am").await;
        assert!(!out.starts_with("Internal error:"), "{out}");
    });
    Ok(())
}

#[cfg(feature = "postgres")]
#[test]
fn postgres_errors_carry_the_server_message() -> Result<(), Box<dyn std::error::Error>> {
    let Some(url) = env("SQL_EXPLORER_TEST_PG_URL") else {
        eprintln!("SQL_EXPLORER_TEST_PG_URL not set; skipping");
        return Ok(());
    };
    let config = ExplorerConfig::from_lookup(DatabaseType::Postgres, |key| {
        (key == "DATABASE_URL").then(|| url.clone())
    })?;
    let explorer = config.explorer()?;

    let rt = Runtime::new()?;
    rt.block_on(async {
        let out = explorer.execute_query(None, "SELECT pg_sleep(10)").await;
        assert!(out.starts_with("Internal error:"), "{out}");
        assert!(out.contains("statement timeout"), "{out}");
        assert!(out.contains("57014"), "{out}");

        let out = explorer
            .execute_query(None, "SELECT * FROM no_such_table_for_explorer_tests")
            .await;
        assert!(out.contains("does not exist"), "{out}");
    });
    Ok(())
}

#[cfg(feature = "mssql")]
#[test]
fn mssql_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let (Some(server), Some(user), Some(password)) = (
        env("SQL_EXPLORER_TEST_MSSQL_SERVER"),
        env("SQL_EXPLORER_TEST_MSSQL_USERNAME"),
        env("SQL_EXPLORER_TEST_MSSQL_PASSWORD"),
    ) else {
        eprintln!("SQL_EXPLORER_TEST_MSSQL_* not set; skipping");
        return Ok(());
    };
    let port = env("SQL_EXPLORER_TEST_MSSQL_PORT");
    let database = env("SQL_EXPLORER_TEST_MSSQL_DATABASE");
    let config = ExplorerConfig::from_lookup(DatabaseType::Mssql, |key| match key {
        "SQL_SERVER" => Some(server.clone()),
        "SQL_USERNAME" => Some(user.clone()),
        "SQL_PASSWORD" => Some(password.clone()),
        "SQL_PORT" => port.clone(),
        "SQL_DATABASE" => database.clone(),
        _ => None,
    })?;
    let explorer = config.explorer()?;

    let rt = Runtime::new()?;
    rt.block_on(async {
        exercise(&explorer, "SQL Server Explorer").await;
        let out = explorer
            .execute_query(None, "SELECT CAST(NULL AS int) AS nothing, N'ok' AS status")
            .await;
        assert_eq!(out, "{'nothing': NULL, 'status': 'ok'}");
    });
    Ok(())
}
