//! sql-explorer - read-only database exploration from the command line.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use sql_explorer::config::ExplorerConfig;
use sql_explorer::error::ExplorerError;
use sql_explorer::logging::init_logging;
use sql_explorer::types::DatabaseType;

/// Read-only explorer for Postgres and SQL Server databases.
#[derive(Parser, Debug)]
#[command(name = "sql-explorer")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Backend to talk to
    #[arg(long, value_enum, default_value = "postgres")]
    backend: DatabaseType,

    /// Read settings from this dotenv file instead of `./.env`
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List databases on the server
    Databases,
    /// List tables
    Tables {
        #[arg(long)]
        db: Option<String>,
    },
    /// Show the columns of a table
    Schema {
        #[arg(long)]
        table: String,
        #[arg(long)]
        db: Option<String>,
    },
    /// Show the first rows of a table
    View {
        #[arg(long)]
        table: String,
        #[arg(long)]
        db: Option<String>,
    },
    /// Run a read-only query (capped at 1000 rows)
    Query {
        #[arg(long)]
        sql: String,
        #[arg(long)]
        db: Option<String>,
    },
    /// Check connectivity
    Hello {
        #[arg(long, default_value = "World")]
        name: String,
    },
    /// Print the SQL-generation prompt for a request
    Prompt {
        #[arg(long)]
        request: String,
        #[arg(long)]
        schema: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(output) => println!("{output}"),
        Err(e) => {
            error!(error = %e, "sql-explorer could not start");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<String, ExplorerError> {
    let config = match &cli.env_file {
        Some(path) => ExplorerConfig::from_env_file(cli.backend, path)?,
        None => {
            // a missing ./.env is fine; the process environment may be enough
            let _ = dotenvy::dotenv();
            ExplorerConfig::from_env(cli.backend)?
        }
    };
    info!(backend = %cli.backend, keyword_match = ?config.keyword_match, "configuration loaded");

    let explorer = config.explorer()?;
    let output = match cli.command {
        Command::Databases => explorer.list_databases().await,
        Command::Tables { db } => explorer.list_tables(db.as_deref()).await,
        Command::Schema { table, db } => explorer.table_schema(db.as_deref(), &table).await,
        Command::View { table, db } => explorer.view_table(db.as_deref(), &table).await,
        Command::Query { sql, db } => explorer.execute_query(db.as_deref(), &sql).await,
        Command::Hello { name } => explorer.hello(&name).await,
        Command::Prompt { request, schema } => explorer.sql_generation_prompt(&request, &schema),
    };
    Ok(output)
}
