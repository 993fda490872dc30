//! JSQL Console - command-line front end for a UMA query service
//!
//! ## Usage
//!
//! ```bash
//! # Convert SQL to JSQL
//! jsql-console --api-url http://localhost:8080 sql2jsql "SELECT id FROM users"
//!
//! # Run a query and fetch the first three pages
//! jsql-console run --sql "SELECT * FROM orders" --pages 3
//!
//! # Run JSQL directly and print CSV
//! jsql-console --format csv run --jsql '{"select": ["id"], "from": "users"}'
//!
//! # Browse the schema
//! jsql-console entities
//! jsql-console entity users
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use jsql_console::client::{ColumnMeta, EntityListRequest, ResultRow};
use jsql_console::config::{ConfigFile, ConfigOverrides};
use jsql_console::export::{cell_text, column_names, render_csv};
use jsql_console::{
    Console, ConsoleConfig, ErrorHint, FileStateStore, JsqlQuery, QueryConverter, Result,
    UmaClient,
};

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// JSQL Console - convert, run and page through UMA queries
#[derive(Parser, Debug)]
#[command(name = "jsql-console")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the UMA service
    #[arg(long, global = true, env = "UMA_API_URL")]
    api_url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true, env = "UMA_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// SQL dialect used for conversion
    #[arg(long, global = true, env = "UMA_DEFAULT_DIALECT")]
    dialect: Option<String>,

    /// Rows per page when the query has no limit of its own
    #[arg(long, global = true, env = "UMA_PAGE_SIZE")]
    page_size: Option<u64>,

    /// Editor state file
    #[arg(long, global = true, env = "UMA_STATE_FILE")]
    state_file: Option<PathBuf>,

    /// Configuration file (defaults to ./jsql-console.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert SQL text to JSQL
    Sql2jsql {
        /// SQL statement
        sql: String,
    },

    /// Convert JSQL to SQL text
    Jsql2sql {
        /// JSQL object as JSON text
        jsql: String,
    },

    /// Run a query and print its results
    Run {
        /// SQL statement to run
        #[arg(long, conflicts_with = "jsql", required_unless_present = "jsql")]
        sql: Option<String>,

        /// JSQL object to run
        #[arg(long)]
        jsql: Option<String>,

        /// Number of pages to fetch
        #[arg(long, default_value = "1")]
        pages: u32,
    },

    /// List entities
    Entities,

    /// Show columns of an entity
    Entity {
        /// Entity name
        name: String,
    },

    /// Check the UMA service is reachable
    Health,

    /// Print an example configuration file
    ExampleConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e.with_hint());
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    if let Command::ExampleConfig = args.command {
        print!("{}", ConfigFile::generate_example());
        return Ok(());
    }

    let file = match &args.config {
        Some(path) => Some(ConfigFile::load(path)?),
        None => ConfigFile::load_default(),
    };
    let overrides = ConfigOverrides {
        api_url: args.api_url,
        timeout_ms: args.timeout_ms,
        default_dialect: args.dialect,
        page_size: args.page_size,
        state_file: args.state_file,
    };
    let config = ConsoleConfig::resolve(overrides, file.as_ref())?;
    tracing::debug!(api_url = %config.api_url, page_size = config.page_size, "Configuration resolved");

    let format = args.format;
    match args.command {
        Command::Sql2jsql { sql } => {
            let converter = QueryConverter::new(UmaClient::new(config.client_config())?);
            let jsql = converter
                .sql_to_jsql(&sql, Some(&config.default_dialect))
                .await?;
            println!("{}", jsql.to_pretty_string()?);
        }
        Command::Jsql2sql { jsql } => {
            let converter = QueryConverter::new(UmaClient::new(config.client_config())?);
            let jsql = JsqlQuery::parse(&jsql)?;
            let response = converter
                .jsql_to_sql(&jsql, Some(&config.default_dialect))
                .await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
                _ => println!("{}", response.sql),
            }
        }
        Command::Run { sql, jsql, pages } => {
            run_query(&config, sql, jsql, pages, format).await?;
        }
        Command::Entities => {
            let client = UmaClient::new(config.client_config())?;
            let response = client
                .entity_list(&EntityListRequest::default())
                .await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
                OutputFormat::Csv => {
                    println!("entity");
                    for entity in &response.entities {
                        println!("{}", jsql_console::export::csv_escape(entity));
                    }
                }
                OutputFormat::Text => {
                    if response.entities.is_empty() {
                        println!("No entities found.");
                    } else {
                        let mut table = Table::new();
                        table.load_preset(UTF8_FULL_CONDENSED);
                        table.set_content_arrangement(ContentArrangement::Dynamic);
                        table.set_header(vec![Cell::new("Entity").fg(Color::Cyan)]);
                        for entity in &response.entities {
                            table.add_row(vec![Cell::new(entity)]);
                        }
                        println!("{}", table);
                    }
                }
            }
        }
        Command::Entity { name } => {
            let client = UmaClient::new(config.client_config())?;
            let details = client.entity_details(&name).await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&details)?),
                OutputFormat::Csv => {
                    println!("column,type,nullable,primary_key");
                    for column in &details.columns {
                        println!(
                            "{},{},{},{}",
                            jsql_console::export::csv_escape(&column.name),
                            jsql_console::export::csv_escape(&column.data_type),
                            column.nullable,
                            column.primary_key
                        );
                    }
                }
                OutputFormat::Text => {
                    let mut table = Table::new();
                    table.load_preset(UTF8_FULL_CONDENSED);
                    table.set_content_arrangement(ContentArrangement::Dynamic);
                    table.set_header(vec![
                        Cell::new("Column").fg(Color::Cyan),
                        Cell::new("Type").fg(Color::Cyan),
                        Cell::new("Nullable").fg(Color::Cyan),
                        Cell::new("Primary Key").fg(Color::Cyan),
                    ]);
                    for column in &details.columns {
                        table.add_row(vec![
                            Cell::new(&column.name),
                            Cell::new(&column.data_type),
                            Cell::new(if column.nullable { "yes" } else { "no" }),
                            Cell::new(if column.primary_key { "yes" } else { "" }),
                        ]);
                    }
                    println!("Entity: {}", details.name);
                    println!("{}", table);
                }
            }
        }
        Command::Health => {
            let client = UmaClient::new(config.client_config())?;
            let health = client.health().await?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&health)?),
                _ => println!(
                    "{} is {}",
                    client.base_url(),
                    health.status.as_deref().unwrap_or("up")
                ),
            }
        }
        Command::ExampleConfig => {}
    }

    Ok(())
}

async fn run_query(
    config: &ConsoleConfig,
    sql: Option<String>,
    jsql: Option<String>,
    pages: u32,
    format: OutputFormat,
) -> Result<()> {
    let state_path = config
        .state_file
        .clone()
        .unwrap_or_else(FileStateStore::default_path);
    let store = Arc::new(FileStateStore::open(state_path)?);
    let mut console = Console::new(config, store)?;

    let first = match (sql, jsql) {
        (Some(sql), _) => {
            console.editor_mut().set_sql_query(sql)?;
            console.run_sql().await?
        }
        (None, Some(jsql)) => {
            console.editor_mut().set_jsql_text(jsql)?;
            console.run_jsql().await?
        }
        (None, None) => {
            return Err(jsql_console::ConsoleError::Query(
                "either --sql or --jsql is required".to_string(),
            ))
        }
    };

    let mut fetched = 1;
    let mut last_row = first.last_row;
    while fetched < pages && last_row.is_none() {
        let offset = console.results().loaded_row_count();
        match console.load_results_page(offset).await? {
            Some(page) => last_row = page.last_row,
            None => break,
        }
        fetched += 1;
    }

    let meta = console.results().meta();
    let rows = console.results().rows();
    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({ "meta": meta, "data": rows });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Csv => print!("{}", render_csv(&meta, &rows)),
        OutputFormat::Text => {
            print_rows(&meta, &rows);
            let more = if console.results().has_more() {
                ", more available"
            } else {
                ""
            };
            println!(
                "{} row(s) in {} ms{}",
                rows.len(),
                console.editor().execution_time_ms(),
                more
            );
            if let Some(sql) = console.editor().generated_sql() {
                println!("Generated SQL: {}", sql);
            }
        }
    }

    Ok(())
}

fn print_rows(meta: &[ColumnMeta], rows: &[ResultRow]) {
    let columns = column_names(meta, rows);
    if columns.is_empty() {
        println!("No rows returned.");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        columns
            .iter()
            .map(|c| Cell::new(c).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    for row in rows {
        table.add_row(
            columns
                .iter()
                .map(|c| Cell::new(cell_text(row.get(c))))
                .collect::<Vec<_>>(),
        );
    }
    println!("{}", table);
}
