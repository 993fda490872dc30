//! Wire types for the UMA query, transform and metadata endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::query::{JsqlQuery, QueryParams};

/// One result row: column name to value.
pub type ResultRow = Map<String, Value>;

/// Request body for `/uma/select`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectRequest {
    pub jsql: JsqlQuery,
    #[serde(default)]
    pub params: Option<QueryParams>,
}

/// Column metadata returned alongside query results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub qualified_name: String,
}

/// Response body for `/uma/select`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectResponse {
    #[serde(default)]
    pub meta: Vec<ColumnMeta>,
    #[serde(default)]
    pub data: Vec<ResultRow>,
}

/// Request body for `/uma/transform/sql2jsql`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sql2JsqlRequest {
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialect: Option<String>,
}

/// Request body for `/uma/transform/jsql2sql`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jsql2SqlRequest {
    pub data: JsqlQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialect: Option<String>,
}

/// Response body for `/uma/transform/jsql2sql`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jsql2SqlResponse {
    pub sql: String,
}

/// Request body for `/uma/meta/entity_list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityListRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// Response body for `/uma/meta/entity_list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityListResponse {
    #[serde(default)]
    pub entities: Vec<String>,
}

/// Request body for `/uma/meta/entity_details`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDetailsRequest {
    pub entity_name: String,
}

/// Column description from the schema service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    /// Any additional attributes the service reports.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response body for `/uma/meta/entity_details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDetailsResponse {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnMetadata>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response body for `/health`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
