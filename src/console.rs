//! The query console: editor state, conversion, execution and paged results
//! wired together.

use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::client::UmaClient;
use crate::config::ConsoleConfig;
use crate::editor::{EditorState, StateStore};
use crate::error::{ConsoleError, Result};
use crate::export::render_csv;
use crate::query::{JsqlQuery, QueryConverter, QueryExecutor, QueryParams};
use crate::results::{QueryResults, ResultsPage};
use crate::schema::SchemaExplorer;

/// Pretty-print JSON text.
pub fn format_json_text(text: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| ConsoleError::Format(format!("Failed to format JSON: {}", e)))?;
    serde_json::to_string_pretty(&value)
        .map_err(|e| ConsoleError::Format(format!("Failed to format JSON: {}", e)))
}

/// Console session over one UMA service.
pub struct Console {
    editor: EditorState,
    results: QueryResults,
    executor: QueryExecutor,
    converter: QueryConverter,
    schema: SchemaExplorer,
    params: Option<QueryParams>,
}

impl Console {
    /// Build a console from configuration, loading editor state from `store`.
    pub fn new(config: &ConsoleConfig, store: Arc<dyn StateStore>) -> Result<Self> {
        let client = UmaClient::new(config.client_config())?;
        let editor = EditorState::load(store, &config.default_dialect)?;
        Ok(Self::with_client(
            client,
            editor,
            QueryResults::with_page_size(config.page_size),
        ))
    }

    pub fn with_client(client: UmaClient, editor: EditorState, results: QueryResults) -> Self {
        Self {
            editor,
            results,
            executor: QueryExecutor::new(client.clone()),
            converter: QueryConverter::new(client.clone()),
            schema: SchemaExplorer::new(client),
            params: None,
        }
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut EditorState {
        &mut self.editor
    }

    /// Handle to the paged results of the last run.
    pub fn results(&self) -> &QueryResults {
        &self.results
    }

    pub fn schema(&self) -> &SchemaExplorer {
        &self.schema
    }

    pub fn schema_mut(&mut self) -> &mut SchemaExplorer {
        &mut self.schema
    }

    /// Parameters bound to the current results session.
    pub fn query_params(&self) -> Option<&QueryParams> {
        self.params.as_ref()
    }

    /// Convert the SQL editor text to JSQL and run it.
    pub async fn run_sql(&mut self) -> Result<ResultsPage> {
        let started = Instant::now();
        self.editor.set_executing(true);
        let outcome = self.run_sql_inner().await;
        self.editor.set_executing(false);

        match outcome {
            Ok(page) => {
                self.record_execution(started);
                Ok(page)
            }
            Err(e) => {
                error!(error = %e, "Failed to execute SQL");
                Err(e)
            }
        }
    }

    async fn run_sql_inner(&mut self) -> Result<ResultsPage> {
        let jsql = self
            .converter
            .sql_to_jsql(self.editor.sql_query(), Some(self.editor.dialect()))
            .await?;
        self.editor.set_jsql_text(jsql.to_pretty_string()?)?;
        self.start_session(jsql).await
    }

    /// Run the JSQL editor text, recording the SQL the service generates for it.
    pub async fn run_jsql(&mut self) -> Result<ResultsPage> {
        let started = Instant::now();
        self.editor.set_executing(true);
        let outcome = self.run_jsql_inner().await;
        self.editor.set_executing(false);

        match outcome {
            Ok(page) => {
                self.record_execution(started);
                Ok(page)
            }
            Err(e) => {
                error!(error = %e, "Failed to execute JSQL");
                Err(e)
            }
        }
    }

    async fn run_jsql_inner(&mut self) -> Result<ResultsPage> {
        let jsql = JsqlQuery::parse(self.editor.jsql_text())?;
        let generated = self
            .converter
            .jsql_to_sql(&jsql, Some(self.editor.dialect()))
            .await?;
        self.editor.set_generated_sql(Some(generated.sql.clone()));
        self.editor.set_sql_query(generated.sql)?;
        self.start_session(jsql).await
    }

    async fn start_session(&mut self, jsql: JsqlQuery) -> Result<ResultsPage> {
        self.params = jsql.params();
        self.results.reset(jsql)?;
        self.load_results_page(0).await?.ok_or_else(|| {
            ConsoleError::Query("Failed to load the first page of query results.".to_string())
        })
    }

    fn record_execution(&mut self, started: Instant) {
        let millis = started.elapsed().as_millis() as u64;
        self.editor.set_execution_time(millis);
        info!(
            execution_time_ms = millis,
            rows = self.results.loaded_row_count(),
            "Query executed"
        );
    }

    /// Load another page of the current results with the session's parameters.
    pub async fn load_results_page(&self, page_offset: u64) -> Result<Option<ResultsPage>> {
        let executor = self.executor.clone();
        let params = self.params.clone();
        let page = self
            .results
            .load_page(
                move |jsql| async move { executor.execute_jsql(jsql, params).await },
                page_offset,
            )
            .await?;
        Ok(page)
    }

    /// Replace the JSQL editor text with the service's JSQL for the SQL text.
    pub async fn convert_sql_to_jsql(&mut self) -> Result<JsqlQuery> {
        self.editor.set_executing(true);
        let outcome = self
            .converter
            .sql_to_jsql(self.editor.sql_query(), Some(self.editor.dialect()))
            .await
            .map_err(ConsoleError::from);
        let outcome = match outcome {
            Ok(jsql) => jsql
                .to_pretty_string()
                .and_then(|text| self.editor.set_jsql_text(text))
                .map(|_| jsql),
            Err(e) => Err(e),
        };
        self.editor.set_executing(false);

        if let Err(ref e) = outcome {
            error!(error = %e, "Failed to convert SQL to JSQL");
        }
        outcome
    }

    /// Replace the SQL editor text with the service's SQL for the JSQL text.
    pub async fn convert_jsql_to_sql(&mut self) -> Result<String> {
        self.editor.set_executing(true);
        let outcome = self.convert_jsql_to_sql_inner().await;
        self.editor.set_executing(false);

        if let Err(ref e) = outcome {
            error!(error = %e, "Failed to convert JSQL to SQL");
        }
        outcome
    }

    async fn convert_jsql_to_sql_inner(&mut self) -> Result<String> {
        let jsql = JsqlQuery::parse(self.editor.jsql_text())?;
        let generated = self
            .converter
            .jsql_to_sql(&jsql, Some(self.editor.dialect()))
            .await?;
        self.editor.set_generated_sql(Some(generated.sql.clone()));
        self.editor.set_sql_query(generated.sql.clone())?;
        Ok(generated.sql)
    }

    /// Drop the results session and the outcome of the last run.
    pub fn clear_results(&mut self) {
        self.results.clear();
        self.editor.clear_results();
        self.params = None;
    }

    pub fn clear_sql(&mut self) -> Result<()> {
        self.editor.set_sql_query("")
    }

    pub fn clear_jsql(&mut self) -> Result<()> {
        self.editor.set_jsql_text("")
    }

    /// Pretty-print the JSQL editor text in place. Blank text is left alone.
    pub fn format_jsql(&mut self) -> Result<()> {
        if self.editor.jsql_text().trim().is_empty() {
            return Ok(());
        }
        let formatted = format_json_text(self.editor.jsql_text())?;
        self.editor.set_jsql_text(formatted)
    }

    /// Loaded rows as CSV with a header line.
    pub fn export_results(&self) -> String {
        render_csv(&self.results.meta(), &self.results.rows())
    }
}
