//! Editor state: the SQL and JSQL text the user is working on, the selected
//! dialect and tab, and the outcome of the last run.
//!
//! The SQL text, the last valid JSQL object, the dialect and the active tab
//! survive restarts through a [`StateStore`]. Values read back from the
//! store are validated; anything malformed falls back to its default and the
//! default is written back.

mod store;

pub use store::{FileStateStore, MemoryStateStore, StateStore};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::error::Result;
use crate::query::JsqlQuery;

pub const SQL_QUERY_KEY: &str = "uma-sql-query";
pub const JSQL_QUERY_KEY: &str = "uma-jsql-query";
pub const DIALECT_KEY: &str = "uma-dialect";
pub const ACTIVE_TAB_KEY: &str = "uma-active-tab";

/// Which console tab is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveTab {
    #[default]
    #[serde(rename = "sqlJsql")]
    SqlJsql,
    #[serde(rename = "schema")]
    Schema,
}

impl ActiveTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveTab::SqlJsql => "sqlJsql",
            ActiveTab::Schema => "schema",
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value.as_str()? {
            "sqlJsql" => Some(ActiveTab::SqlJsql),
            "schema" => Some(ActiveTab::Schema),
            _ => None,
        }
    }
}

/// Editor state with write-through persistence of the durable fields.
pub struct EditorState {
    store: Arc<dyn StateStore>,
    sql_query: String,
    jsql_query: Option<JsqlQuery>,
    jsql_text: String,
    dialect: String,
    active_tab: ActiveTab,
    generated_sql: Option<String>,
    execution_time_ms: u64,
    is_executing: bool,
}

impl std::fmt::Debug for EditorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorState")
            .field("sql_query", &self.sql_query)
            .field("jsql_query", &self.jsql_query)
            .field("dialect", &self.dialect)
            .field("active_tab", &self.active_tab)
            .field("generated_sql", &self.generated_sql)
            .field("execution_time_ms", &self.execution_time_ms)
            .field("is_executing", &self.is_executing)
            .finish()
    }
}

impl EditorState {
    /// Load editor state from `store`, repairing invalid entries.
    pub fn load(store: Arc<dyn StateStore>, default_dialect: &str) -> Result<Self> {
        let sql_query = match store.get(SQL_QUERY_KEY) {
            None => String::new(),
            Some(Value::String(sql)) => sql,
            Some(other) => {
                warn!(key = SQL_QUERY_KEY, value = %other, "Invalid persisted value, using default");
                store.set(SQL_QUERY_KEY, Value::String(String::new()))?;
                String::new()
            }
        };

        let jsql_query = match store.get(JSQL_QUERY_KEY) {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(JsqlQuery::new(map)),
            Some(other) => {
                warn!(key = JSQL_QUERY_KEY, value = %other, "Invalid persisted value, using default");
                store.set(JSQL_QUERY_KEY, Value::Null)?;
                None
            }
        };

        let dialect = match store.get(DIALECT_KEY) {
            Some(Value::String(dialect)) if !dialect.trim().is_empty() => dialect,
            None => default_dialect.to_string(),
            Some(other) => {
                warn!(key = DIALECT_KEY, value = %other, "Invalid persisted value, using default");
                store.set(DIALECT_KEY, Value::String(default_dialect.to_string()))?;
                default_dialect.to_string()
            }
        };

        let active_tab = match store.get(ACTIVE_TAB_KEY) {
            None => ActiveTab::default(),
            Some(value) => match ActiveTab::from_value(&value) {
                Some(tab) => tab,
                None => {
                    warn!(key = ACTIVE_TAB_KEY, value = %value, "Invalid persisted value, using default");
                    let tab = ActiveTab::default();
                    store.set(ACTIVE_TAB_KEY, Value::String(tab.as_str().to_string()))?;
                    tab
                }
            },
        };

        let jsql_text = jsql_query
            .as_ref()
            .and_then(|q| q.to_pretty_string().ok())
            .unwrap_or_default();

        Ok(Self {
            store,
            sql_query,
            jsql_query,
            jsql_text,
            dialect,
            active_tab,
            generated_sql: None,
            execution_time_ms: 0,
            is_executing: false,
        })
    }

    pub fn sql_query(&self) -> &str {
        &self.sql_query
    }

    pub fn jsql_query(&self) -> Option<&JsqlQuery> {
        self.jsql_query.as_ref()
    }

    pub fn jsql_text(&self) -> &str {
        &self.jsql_text
    }

    pub fn dialect(&self) -> &str {
        &self.dialect
    }

    pub fn active_tab(&self) -> ActiveTab {
        self.active_tab
    }

    pub fn generated_sql(&self) -> Option<&str> {
        self.generated_sql.as_deref()
    }

    pub fn execution_time_ms(&self) -> u64 {
        self.execution_time_ms
    }

    pub fn is_executing(&self) -> bool {
        self.is_executing
    }

    /// SQL editor has something to run.
    pub fn sql_editor_valid(&self) -> bool {
        !self.sql_query.trim().is_empty()
    }

    /// JSQL editor holds a parsable JSQL object.
    pub fn jsql_editor_valid(&self) -> bool {
        self.jsql_query.is_some()
    }

    pub fn set_sql_query(&mut self, sql: impl Into<String>) -> Result<()> {
        self.sql_query = sql.into();
        self.store
            .set(SQL_QUERY_KEY, Value::String(self.sql_query.clone()))
    }

    pub fn set_jsql_query(&mut self, jsql: Option<JsqlQuery>) -> Result<()> {
        let value = match &jsql {
            Some(query) => Value::Object(query.as_map().clone()),
            None => Value::Null,
        };
        self.jsql_query = jsql;
        self.store.set(JSQL_QUERY_KEY, value)
    }

    /// Replace the JSQL editor text. The persisted JSQL object follows the
    /// text while it parses and is cleared when it does not.
    pub fn set_jsql_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.jsql_text = text.into();
        let parsed = JsqlQuery::parse(&self.jsql_text).ok();
        self.set_jsql_query(parsed)
    }

    pub fn set_dialect(&mut self, dialect: impl Into<String>) -> Result<()> {
        self.dialect = dialect.into();
        self.store.set(DIALECT_KEY, Value::String(self.dialect.clone()))
    }

    pub fn set_active_tab(&mut self, tab: ActiveTab) -> Result<()> {
        self.active_tab = tab;
        self.store
            .set(ACTIVE_TAB_KEY, Value::String(tab.as_str().to_string()))
    }

    pub fn set_generated_sql(&mut self, sql: Option<String>) {
        self.generated_sql = sql;
    }

    pub fn set_execution_time(&mut self, millis: u64) {
        self.execution_time_ms = millis;
    }

    pub fn set_executing(&mut self, executing: bool) {
        self.is_executing = executing;
    }

    /// Forget the outcome of the last run.
    pub fn clear_results(&mut self) {
        self.execution_time_ms = 0;
        self.generated_sql = None;
    }

    /// Empty both editors and forget the last run.
    pub fn clear_all(&mut self) -> Result<()> {
        self.set_sql_query("")?;
        self.jsql_text.clear();
        self.set_jsql_query(None)?;
        self.clear_results();
        Ok(())
    }
}
