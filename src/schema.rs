//! Schema explorer: entity list and per-entity column details from the UMA
//! metadata endpoints.

use tracing::{error, info};

use crate::client::{EntityDetailsResponse, EntityListRequest, UmaClient};
use crate::error::{ConsoleError, Result};

/// Browsing state for the schema tab.
#[derive(Debug, Clone)]
pub struct SchemaExplorer {
    client: UmaClient,
    entities: Vec<String>,
    selected: Option<String>,
    details: Option<EntityDetailsResponse>,
    loading_entities: bool,
    loading_details: bool,
}

impl SchemaExplorer {
    pub fn new(client: UmaClient) -> Self {
        Self {
            client,
            entities: Vec::new(),
            selected: None,
            details: None,
            loading_entities: false,
            loading_details: false,
        }
    }

    /// Fetch the entity list. The first entity becomes the selection when
    /// nothing is selected yet.
    pub async fn load_entities(&mut self) -> Result<&[String]> {
        self.loading_entities = true;
        let result = self.client.entity_list(&EntityListRequest::default()).await;
        self.loading_entities = false;

        match result {
            Ok(response) => {
                info!(count = response.entities.len(), "Loaded entity list");
                self.entities = response.entities;
                if self.selected.is_none() {
                    self.selected = self.entities.first().cloned();
                }
                Ok(&self.entities)
            }
            Err(e) => {
                error!(error = %e, "Failed to load entity list");
                Err(ConsoleError::Schema(format!(
                    "Failed to load entity list: {}",
                    e
                )))
            }
        }
    }

    /// Change the selected entity. Details of a previous selection are dropped.
    pub fn select_entity(&mut self, name: Option<String>) {
        if self.selected != name {
            self.details = None;
        }
        self.selected = name;
    }

    /// Fetch details of the selected entity; `Ok(None)` when nothing is selected.
    pub async fn load_entity_details(&mut self) -> Result<Option<&EntityDetailsResponse>> {
        let Some(name) = self.selected.clone() else {
            self.details = None;
            return Ok(None);
        };

        self.loading_details = true;
        let result = self.client.entity_details(&name).await;
        self.loading_details = false;

        match result {
            Ok(details) => {
                // The selection may have moved on while the request was out.
                if self.selected.as_deref() == Some(name.as_str()) {
                    self.details = Some(details);
                }
                Ok(self.details.as_ref())
            }
            Err(e) => {
                error!(entity = %name, error = %e, "Failed to load entity details");
                Err(ConsoleError::Schema(format!(
                    "Failed to load entity details: {}",
                    e
                )))
            }
        }
    }

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn selected_entity(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn details(&self) -> Option<&EntityDetailsResponse> {
        self.details.as_ref()
    }

    pub fn is_loading_entities(&self) -> bool {
        self.loading_entities
    }

    pub fn is_loading_details(&self) -> bool {
        self.loading_details
    }
}
