//! HTTP client for communicating with the UMA query service.
//!
//! The service exposes three groups of endpoints, all JSON over `POST`:
//!
//! - `/uma/select` executes a JSQL query and returns column metadata and rows
//! - `/uma/transform/*` converts between SQL text and JSQL
//! - `/uma/meta/*` lists entities and describes them

mod types;

pub use types::{
    ColumnMeta, ColumnMetadata, EntityDetailsRequest, EntityDetailsResponse, EntityListRequest,
    EntityListResponse, HealthResponse, Jsql2SqlRequest, Jsql2SqlResponse, ResultRow,
    SelectRequest, SelectResponse, Sql2JsqlRequest,
};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::config::{DEFAULT_API_TIMEOUT_MS, DEFAULT_API_URL};

/// Endpoint paths, relative to the configured base URL.
pub mod endpoints {
    pub const SELECT: &str = "/uma/select";
    pub const SQL_TO_JSQL: &str = "/uma/transform/sql2jsql";
    pub const JSQL_TO_SQL: &str = "/uma/transform/jsql2sql";
    pub const ENTITY_LIST: &str = "/uma/meta/entity_list";
    pub const ENTITY_DETAILS: &str = "/uma/meta/entity_details";
    pub const HEALTH: &str = "/health";
}

/// Configuration for the UMA client.
#[derive(Debug, Clone)]
pub struct UmaClientConfig {
    /// Base URL of the UMA HTTP API, without a trailing slash.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for UmaClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_ms: DEFAULT_API_TIMEOUT_MS,
        }
    }
}

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// HTTP client for the UMA API.
#[derive(Debug, Clone)]
pub struct UmaClient {
    config: UmaClientConfig,
    client: reqwest::Client,
}

impl UmaClient {
    /// Create a new UMA client.
    pub fn new(config: UmaClientConfig) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                crate::error::ConsoleError::Internal(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url, endpoint)
    }

    /// Send a JSON body with `POST` and decode the JSON response.
    pub async fn post<Req, Resp>(&self, endpoint: &str, body: &Req) -> Result<Resp, ClientError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = self.url(endpoint);
        debug!(%url, "POST");
        let response = self.client.post(&url).json(body).send().await?;
        Self::decode(response).await
    }

    /// Send a `GET` and decode the JSON response.
    pub async fn get<Resp>(&self, endpoint: &str) -> Result<Resp, ClientError>
    where
        Resp: DeserializeOwned,
    {
        let url = self.url(endpoint);
        debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;
        Self::decode(response).await
    }

    async fn decode<Resp>(response: reqwest::Response) -> Result<Resp, ClientError>
    where
        Resp: DeserializeOwned,
    {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::ApiError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                response.text().await.unwrap_or_default()
            )));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// Check that the service is up.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get(endpoints::HEALTH).await
    }

    /// List entities known to the schema service.
    pub async fn entity_list(
        &self,
        request: &EntityListRequest,
    ) -> Result<EntityListResponse, ClientError> {
        self.post(endpoints::ENTITY_LIST, request).await
    }

    /// Describe a single entity.
    pub async fn entity_details(
        &self,
        entity_name: &str,
    ) -> Result<EntityDetailsResponse, ClientError> {
        let request = EntityDetailsRequest {
            entity_name: entity_name.to_string(),
        };
        self.post(endpoints::ENTITY_DETAILS, &request).await
    }
}
