#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

//! # JSQL Console
//!
//! A query console for UMA services. Write SQL or its JSON form (JSQL),
//! convert between the two through the service's transform endpoints, run
//! the query and page through the results.
//!
//! ## Features
//!
//! - **SQL ⇄ JSQL**: conversion by the remote transform service, with dialect selection
//! - **Incremental paging**: pages fetched on demand, cached per session,
//!   concurrent requests for the same page collapsed into one fetch
//! - **Schema browsing**: entity list and column details
//! - **Persistent editors**: SQL text, JSQL, dialect and tab survive restarts
//!
//! ## Library Usage
//!
//! ```no_run
//! use jsql_console::{Console, ConsoleConfig, MemoryStateStore, Result};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<()> {
//! let config = ConsoleConfig::from_toml_str("[api]\nurl = \"http://localhost:8080\"")?;
//! let mut console = Console::new(&config, Arc::new(MemoryStateStore::new()))?;
//!
//! console.editor_mut().set_sql_query("SELECT id, email FROM users")?;
//! let first = console.run_sql().await?;
//! println!("{} rows", first.rows.len());
//!
//! if console.results().has_more() {
//!     let _next = console.load_results_page(first.rows.len() as u64).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The paging engine can also be driven directly with any executor; see
//! [`results::QueryResults`].

pub mod client;
pub mod config;
pub mod console;
pub mod editor;
pub mod error;
pub mod export;
pub mod query;
pub mod results;
pub mod schema;

pub use client::{ClientError, UmaClient, UmaClientConfig};
pub use config::ConsoleConfig;
pub use console::{format_json_text, Console};
pub use editor::{ActiveTab, EditorState, FileStateStore, MemoryStateStore, StateStore};
pub use error::{ConsoleError, ErrorHint, PagingError, Result};
pub use query::{JsqlQuery, QueryConverter, QueryExecutor, QueryParams};
pub use results::{QueryResults, ResultsPage};
pub use schema::SchemaExplorer;
