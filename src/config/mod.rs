//! Configuration module for the console
//!
//! - `defaults` - Default constants and values
//! - `file` - TOML configuration file
//! - `merge` - Merging explicit values with the file and defaults

mod defaults;
pub mod file;
mod merge;

pub use defaults::*;
pub use file::ConfigFile;
pub use merge::{merge_config, ConfigOverrides};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::client::UmaClientConfig;
use crate::error::{ConsoleError, Result};

/// Resolved console configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Base URL of the UMA service. Required.
    pub api_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Dialect used when no dialect has been persisted yet.
    pub default_dialect: String,
    /// Rows per page when the base query carries no limit.
    pub page_size: u64,
    /// Editor state file; `None` means the default location in the user config directory.
    pub state_file: Option<PathBuf>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_ms: DEFAULT_API_TIMEOUT_MS,
            default_dialect: DEFAULT_DIALECT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            state_file: None,
        }
    }
}

impl ConsoleConfig {
    /// Build a configuration from explicit values and an optional config file,
    /// then validate and normalise it.
    pub fn resolve(overrides: ConfigOverrides, file: Option<&ConfigFile>) -> Result<Self> {
        let default_file = ConfigFile::default();
        let config = merge_config(overrides, file.unwrap_or(&default_file));
        config.validate()
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file = ConfigFile::from_toml_str(contents)?;
        Self::resolve(ConfigOverrides::default(), Some(&file))
    }

    /// Load and validate a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let file = ConfigFile::load(path)?;
        Self::resolve(ConfigOverrides::default(), Some(&file))
    }

    /// Validate settings and strip a trailing slash from the API URL.
    pub fn validate(mut self) -> Result<Self> {
        let trimmed = self.api_url.trim();
        if trimmed.is_empty() {
            return Err(ConsoleError::config_missing("api_url"));
        }
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(ConsoleError::config(
                "api_url",
                format!("'{}' must start with http:// or https://", trimmed),
            ));
        }
        self.api_url = trimmed.strip_suffix('/').unwrap_or(trimmed).to_string();

        if self.timeout_ms == 0 {
            return Err(ConsoleError::config(
                "timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.page_size == 0 {
            return Err(ConsoleError::config("page_size", "must be greater than zero"));
        }

        if self.default_dialect.trim().is_empty() {
            self.default_dialect = DEFAULT_DIALECT.to_string();
        }

        Ok(self)
    }

    /// Client settings derived from this configuration.
    pub fn client_config(&self) -> UmaClientConfig {
        UmaClientConfig {
            base_url: self.api_url.clone(),
            timeout_ms: self.timeout_ms,
        }
    }
}
