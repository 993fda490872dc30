use serde_json::Value;

use super::JsqlQuery;
use crate::client::{
    endpoints, ClientError, Jsql2SqlRequest, Jsql2SqlResponse, Sql2JsqlRequest, UmaClient,
};

/// Map console dialect names onto the names the transform service expects.
///
/// Only `postgresql` differs; everything else passes through.
pub fn normalize_dialect(dialect: Option<&str>) -> Option<String> {
    match dialect {
        Some("postgresql") => Some("postgres".to_string()),
        Some(other) => Some(other.to_string()),
        None => None,
    }
}

/// Converts between SQL text and JSQL through the UMA transform endpoints.
#[derive(Debug, Clone)]
pub struct QueryConverter {
    client: UmaClient,
}

impl QueryConverter {
    pub fn new(client: UmaClient) -> Self {
        Self { client }
    }

    pub async fn sql_to_jsql(
        &self,
        sql: &str,
        dialect: Option<&str>,
    ) -> Result<JsqlQuery, ClientError> {
        let request = Sql2JsqlRequest {
            data: sql.to_string(),
            dialect: normalize_dialect(dialect),
        };
        let value: Value = self.client.post(endpoints::SQL_TO_JSQL, &request).await?;
        match value {
            Value::Object(map) => Ok(JsqlQuery::new(map)),
            other => Err(ClientError::Parse(format!(
                "expected a JSQL object from sql2jsql, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub async fn jsql_to_sql(
        &self,
        jsql: &JsqlQuery,
        dialect: Option<&str>,
    ) -> Result<Jsql2SqlResponse, ClientError> {
        let request = Jsql2SqlRequest {
            data: jsql.clone(),
            dialect: normalize_dialect(dialect),
        };
        self.client.post(endpoints::JSQL_TO_SQL, &request).await
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
