use sql_explorer::prelude::*;
use sql_explorer::test_utils::MockConnector;
use tokio::runtime::Runtime;

#[test]
fn connection_failures_leak_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockConnector::new(DatabaseType::Postgres).failing_connect("server unreachable");
        let explorer = mock.explorer();

        for _ in 0..5 {
            let out = explorer
                .execute_query(None, "SELECT name FROM employees")
                .await;
            assert!(out.starts_with("Internal error:"), "{out}");
            assert!(out.contains("server unreachable"));
            assert_eq!(mock.open_connections(), 0);
        }
        assert_eq!(mock.connect_attempts(), 5);
        assert_eq!(mock.total_connections(), 0);
    });
    Ok(())
}

#[test]
fn rejected_queries_never_connect() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockConnector::new(DatabaseType::Mssql);
        let explorer = mock.explorer();

        let out = explorer.execute_query(None, "DROP TABLE users;").await;
        assert_eq!(
            out,
            "Blocked: Only read-only queries allowed (query starts with DROP)"
        );
        let out = explorer
            .execute_query(None, "SELECT * FROM t; TRUNCATE TABLE t")
            .await;
        assert_eq!(out, "Blocked: Blocked keyword: TRUNCATE");

        assert_eq!(mock.connect_attempts(), 0);
        assert!(mock.executed().is_empty());
    });
    Ok(())
}

#[test]
fn directive_runs_first_then_the_bounded_query() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let pg = MockConnector::new(DatabaseType::Postgres);
        pg.explorer()
            .execute_query(None, "SELECT name FROM employees")
            .await;
        assert_eq!(
            pg.executed(),
            [
                "SET statement_timeout = 3000",
                "SELECT name FROM employees LIMIT 1000"
            ]
        );

        let ms = MockConnector::new(DatabaseType::Mssql);
        ms.explorer()
            .execute_query(Some("AdventureWorksLT"), "SELECT name FROM employees")
            .await;
        assert_eq!(
            ms.executed(),
            [
                "SET LOCK_TIMEOUT 30000",
                "SELECT TOP 1000 name FROM employees"
            ]
        );
        assert_eq!(ms.databases(), [Some("AdventureWorksLT".to_string())]);
        assert_eq!(ms.open_connections(), 0);
        assert_eq!(ms.explicit_closes(), 1);
    });
    Ok(())
}

#[test]
fn sessions_close_after_execution_errors() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockConnector::new(DatabaseType::Postgres)
            .push_error("canceling statement due to statement timeout");
        let out = mock
            .explorer()
            .execute_query(None, "SELECT pg_sleep(10)")
            .await;
        assert_eq!(
            out,
            "Internal error: SQL execution error: canceling statement due to statement timeout"
        );
        assert_eq!(mock.total_connections(), 1);
        assert_eq!(mock.open_connections(), 0);
        assert_eq!(mock.explicit_closes(), 1);
    });
    Ok(())
}

#[test]
fn failed_directive_skips_the_query() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockConnector::new(DatabaseType::Mssql).failing_batch("permission denied");
        let out = mock.explorer().execute_query(None, "SELECT 1").await;
        assert!(out.starts_with("Internal error:"), "{out}");
        assert_eq!(mock.executed(), ["SET LOCK_TIMEOUT 30000"]);
        assert_eq!(mock.open_connections(), 0);
    });
    Ok(())
}

#[test]
fn gateway_executes_only_bounded_queries() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockConnector::new(DatabaseType::Postgres).push_rows(
            &["n"],
            vec![vec![SqlValue::Int(1)], vec![SqlValue::Int(2)]],
        );
        let profile = DialectProfile::postgres();
        let gateway = Gateway::new(std::sync::Arc::new(mock.clone()), profile.clone());

        let validated = validate("SELECT n FROM numbers", &profile).expect("valid query");
        let bounded = normalize(&validated, &profile);
        assert_eq!(bounded.row_cap(), 1000);

        let rs = gateway.execute(&bounded, None).await.expect("mock answers");
        assert_eq!(rs.len(), 2);
        assert_eq!(rs.column_names(), ["n"]);
        assert_eq!(mock.open_connections(), 0);
    });
    Ok(())
}
