use sql_explorer::prelude::*;
use sql_explorer::test_utils::MockConnector;
use tokio::runtime::Runtime;

fn text(s: &str) -> SqlValue {
    SqlValue::Text(s.to_string())
}

#[test]
fn execute_query_formats_rows_or_sentinel() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockConnector::new(DatabaseType::Postgres)
            .push_rows(
                &["id", "name"],
                vec![
                    vec![SqlValue::Int(1), text("Ada")],
                    vec![SqlValue::Int(2), SqlValue::Null],
                ],
            )
            .push_rows(&["id"], vec![]);
        let explorer = mock.explorer();

        assert_eq!(
            explorer
                .execute_query(None, "SELECT id, name FROM employees")
                .await,
            "{'id': 1, 'name': 'Ada'}\n{'id': 2, 'name': NULL}"
        );
        assert_eq!(
            explorer
                .execute_query(None, "SELECT id FROM employees WHERE false")
                .await,
            "No results"
        );
    });
    Ok(())
}

#[test]
fn listings_render_bare_names() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockConnector::new(DatabaseType::Postgres)
            .push_rows(&["datname"], vec![vec![text("postgres")], vec![text("shop")]])
            .push_rows(&["table_name"], vec![])
            .push_rows(&["table_name"], vec![vec![text("orders")]]);
        let explorer = mock.explorer();

        assert_eq!(explorer.list_databases().await, "postgres\nshop");
        assert_eq!(explorer.list_tables(None).await, "No tables found");
        assert_eq!(explorer.list_tables(Some("shop")).await, "orders");

        // catalog statements skip the timeout directive and bind the database
        let executed = mock.executed();
        assert_eq!(executed.len(), 3);
        assert!(executed[2].contains("table_catalog::text = $1"));
        assert_eq!(mock.bound_params()[2], [text("shop")]);
        assert_eq!(mock.databases()[2], Some("shop".to_string()));
        assert_eq!(mock.open_connections(), 0);
    });
    Ok(())
}

#[test]
fn empty_listings_use_dialect_sentinels() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let pg = MockConnector::new(DatabaseType::Postgres).explorer();
        assert_eq!(pg.list_databases().await, "No databases found");
        assert_eq!(pg.table_schema(None, "ghosts").await, "No schema for ghosts");

        let ms = MockConnector::new(DatabaseType::Mssql).explorer();
        assert_eq!(ms.list_databases().await, "No user databases found");
        assert_eq!(
            ms.table_schema(None, "SalesLT.Ghosts").await,
            "No schema found for table: SalesLT.Ghosts"
        );
        assert_eq!(ms.view_table(None, "Ghosts").await, "No rows found");
    });
    Ok(())
}

#[test]
fn table_schema_is_detailed_for_sql_server() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let columns = [
            "COLUMN_NAME",
            "DATA_TYPE",
            "IS_NULLABLE",
            "COLUMN_DEFAULT",
            "CHARACTER_MAXIMUM_LENGTH",
        ];
        let rows = || {
            vec![
                vec![text("CustomerID"), text("int"), text("NO"), SqlValue::Null, SqlValue::Null],
                vec![
                    text("EmailAddress"),
                    text("nvarchar"),
                    text("YES"),
                    SqlValue::Null,
                    SqlValue::Int(50),
                ],
            ]
        };

        let ms = MockConnector::new(DatabaseType::Mssql).push_rows(&columns, rows());
        assert_eq!(
            ms.explorer().table_schema(None, "SalesLT.Customer").await,
            "CustomerID: int NOT NULL\nEmailAddress: nvarchar(50)"
        );
        assert_eq!(
            ms.bound_params()[0],
            [text("Customer"), text("SalesLT")]
        );

        let pg = MockConnector::new(DatabaseType::Postgres).push_rows(&columns, rows());
        assert_eq!(
            pg.explorer().table_schema(None, "customer").await,
            "CustomerID: int\nEmailAddress: nvarchar"
        );
    });
    Ok(())
}

#[test]
fn view_table_quotes_identifiers() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let pg = MockConnector::new(DatabaseType::Postgres)
            .push_rows(&["id"], vec![vec![SqlValue::Int(7)]]);
        assert_eq!(
            pg.explorer().view_table(None, r#"we"ird"#).await,
            "{'id': 7}"
        );
        assert_eq!(pg.executed(), [r#"SELECT * FROM "we""ird" LIMIT 10"#]);

        let ms = MockConnector::new(DatabaseType::Mssql);
        ms.explorer().view_table(None, "dbo.odd]name").await;
        assert_eq!(ms.executed(), ["SELECT TOP 10 * FROM [dbo].[odd]]name]"]);
    });
    Ok(())
}

#[test]
fn view_table_prefers_the_default_schema_when_the_table_is_there()
-> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockConnector::new(DatabaseType::Mssql)
            .push_rows(&["matches"], vec![vec![SqlValue::Int(1)]])
            .push_rows(&["CustomerID"], vec![vec![SqlValue::Int(1)]]);
        let explorer = mock
            .explorer()
            .with_default_schema(Some("SalesLT".to_string()));

        assert_eq!(explorer.view_table(None, "Customer").await, "{'CustomerID': 1}");
        let executed = mock.executed();
        assert_eq!(executed.len(), 2);
        assert!(executed[0].contains("TABLE_SCHEMA = @P1 AND TABLE_NAME = @P2"));
        assert_eq!(executed[1], "SELECT TOP 10 * FROM [SalesLT].[Customer]");
        // existence check and preview share one session
        assert_eq!(mock.total_connections(), 1);
        assert_eq!(mock.open_connections(), 0);

        let missing = MockConnector::new(DatabaseType::Mssql)
            .push_rows(&["matches"], vec![vec![SqlValue::Int(0)]]);
        missing
            .explorer()
            .with_default_schema(Some("SalesLT".to_string()))
            .view_table(None, "ErrorLog")
            .await;
        assert_eq!(missing.executed()[1], "SELECT TOP 10 * FROM [ErrorLog]");
    });
    Ok(())
}

#[test]
fn invalid_table_names_are_internal_errors() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mock = MockConnector::new(DatabaseType::Postgres);
        let out = mock.explorer().view_table(None, "  ").await;
        assert!(out.starts_with("Internal error: Invalid identifier"), "{out}");
        assert_eq!(mock.connect_attempts(), 0);
    });
    Ok(())
}

#[test]
fn hello_reports_version_or_failure() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let version = "Microsoft SQL Server 2022 (RTM) - 16.0.1000.6 (X64) Oct  8 2022";
        let ms = MockConnector::new(DatabaseType::Mssql)
            .push_rows(&["version"], vec![vec![text(version)]]);
        assert_eq!(
            ms.explorer().hello("agent").await,
            format!(
                "Hello from SQL Server Explorer, agent! Connected to: {}...",
                &version[..50]
            )
        );
        assert_eq!(ms.executed(), ["SELECT @@VERSION AS version"]);

        let down = MockConnector::new(DatabaseType::Postgres).failing_connect("refused");
        assert_eq!(
            down.explorer().hello("World").await,
            "Hello World! Connection failed: Connection error: refused"
        );
    });
    Ok(())
}

#[test]
fn prompt_follows_the_dialect() {
    let explorer = MockConnector::new(DatabaseType::Mssql).explorer();
    let prompt = explorer.sql_generation_prompt("ten newest orders", "SalesLT.SalesOrderHeader");
    assert!(prompt.contains("Use TOP instead of LIMIT."));
    assert!(prompt.contains("ten newest orders"));
    assert_eq!(
        prompt,
        sql_generation_prompt(
            DatabaseType::Mssql,
            "ten newest orders",
            "SalesLT.SalesOrderHeader"
        )
    );
}
