use tracing::debug;

use super::{JsqlQuery, QueryParams};
use crate::client::{endpoints, ClientError, SelectRequest, SelectResponse, UmaClient};

/// Executes JSQL queries against the UMA select endpoint.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    client: UmaClient,
}

impl QueryExecutor {
    pub fn new(client: UmaClient) -> Self {
        Self { client }
    }

    /// Execute `jsql` with optional bound parameters.
    pub async fn execute_jsql(
        &self,
        jsql: JsqlQuery,
        params: Option<QueryParams>,
    ) -> Result<SelectResponse, ClientError> {
        debug!(
            limit = ?jsql.get("limit"),
            offset = ?jsql.get("offset"),
            has_params = params.is_some(),
            "Executing JSQL"
        );
        let request = SelectRequest { jsql, params };
        self.client.post(endpoints::SELECT, &request).await
    }
}
