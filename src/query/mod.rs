//! JSQL queries and the services that convert and execute them.
//!
//! JSQL is the JSON representation of a query understood by the UMA service.
//! Its schema belongs to the service, so [`JsqlQuery`] is an open mapping of
//! string keys to JSON values; the console only ever looks at `limit`,
//! `offset` and `params`.

mod converter;
mod executor;
pub mod paging;

pub use converter::{normalize_dialect, QueryConverter};
pub use executor::QueryExecutor;
pub use paging::{default_page_size, with_paging, PageWindow, PagedQuery};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConsoleError, Result};

/// A structured JSQL query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsqlQuery(Map<String, Value>);

impl JsqlQuery {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Parse JSQL text typed by the user.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(ConsoleError::InvalidJsql("JSQL query is empty.".to_string()));
        }

        let value: Value = serde_json::from_str(text)
            .map_err(|e| ConsoleError::InvalidJsql(format!("Invalid JSQL JSON: {}", e)))?;

        Self::try_from(value).map_err(|e| match e {
            ConsoleError::InvalidJsql(msg) => {
                ConsoleError::InvalidJsql(format!("Invalid JSQL JSON: {}", msg))
            }
            other => other,
        })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Bound parameters embedded in the query under `params`, if any.
    pub fn params(&self) -> Option<QueryParams> {
        match self.0.get("params")? {
            Value::Object(named) => Some(QueryParams::Named(named.clone())),
            Value::Array(positional) => Some(QueryParams::Positional(positional.clone())),
            _ => None,
        }
    }

    /// Pretty-printed JSON text of this query.
    pub fn to_pretty_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }
}

impl From<Map<String, Value>> for JsqlQuery {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

impl TryFrom<Value> for JsqlQuery {
    type Error = ConsoleError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ConsoleError::InvalidJsql(
                "JSQL must be a JSON object.".to_string(),
            )),
        }
    }
}

/// Bound parameters sent alongside a query: named or positional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryParams {
    Named(Map<String, Value>),
    Positional(Vec<Value>),
}
