//! Configuration file support
//!
//! This module provides TOML configuration file parsing.
//!
//! ## Priority Order
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values
//!
//! ## Example Configuration
//!
//! ```toml
//! # jsql-console.toml
//!
//! [api]
//! url = "http://localhost:8080"
//! timeout_ms = 30000
//!
//! [editor]
//! default_dialect = "postgres"
//! state_file = "/home/me/.config/jsql-console/editor-state.json"
//!
//! [results]
//! page_size = 100
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::defaults::DEFAULT_CONFIG_FILE;
use crate::error::{ConsoleError, Result};

/// Root configuration structure for TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// UMA service connection
    pub api: ApiSection,

    /// Editor settings
    pub editor: EditorSection,

    /// Result paging settings
    pub results: ResultsSection,
}

/// API section configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    /// Base URL of the UMA service
    pub url: Option<String>,

    /// Request timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

/// Editor section configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSection {
    /// Dialect used when none has been persisted yet
    pub default_dialect: Option<String>,

    /// Where editor state is persisted between runs
    pub state_file: Option<PathBuf>,
}

/// Results section configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultsSection {
    /// Rows per page when the query carries no limit
    pub page_size: Option<u64>,
}

impl ConfigFile {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| ConsoleError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConsoleError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        toml::from_str(&contents).map_err(|e| {
            ConsoleError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })
    }

    /// Try to load configuration from the default location (`./jsql-console.toml`)
    pub fn load_default() -> Option<Self> {
        let path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if !path.exists() {
            return None;
        }

        match Self::load(&path) {
            Ok(config) => {
                tracing::info!("Loaded configuration from {:?}", path);
                Some(config)
            }
            Err(e) => {
                tracing::warn!("Failed to load config from {:?}: {}", path, e);
                None
            }
        }
    }

    /// Generate an example configuration file
    pub fn generate_example() -> String {
        r#"# jsql-console configuration file
# Copy to jsql-console.toml and customize as needed
#
# Configuration priority (highest to lowest):
# 1. Command-line arguments
# 2. Environment variables (UMA_API_URL, UMA_TIMEOUT_MS, ...)
# 3. This configuration file
# 4. Default values

[api]
# Base URL of the UMA service (required)
url = "http://localhost:8080"

# Request timeout in milliseconds
timeout_ms = 30000

[editor]
# SQL dialect: generic, postgres, mysql, sqlite, mssql
default_dialect = "generic"

[results]
# Rows fetched per page when the query has no explicit limit
page_size = 100
"#
        .to_string()
    }
}
