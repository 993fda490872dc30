//! Configuration merging utilities
//!
//! Merges values given on the command line or through the environment with
//! a configuration file, where explicit values take precedence.

use std::path::PathBuf;

use super::defaults::*;
use super::file::ConfigFile;
use super::ConsoleConfig;

/// Values supplied explicitly by the caller (CLI flags or environment).
///
/// `None` means "not given", so the config file or the default applies.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub default_dialect: Option<String>,
    pub page_size: Option<u64>,
    pub state_file: Option<PathBuf>,
}

/// Merge explicit overrides with configuration file values and defaults.
///
/// The result is not validated; call [`ConsoleConfig::validate`] afterwards.
pub fn merge_config(overrides: ConfigOverrides, file: &ConfigFile) -> ConsoleConfig {
    ConsoleConfig {
        api_url: overrides
            .api_url
            .or_else(|| file.api.url.clone())
            .unwrap_or_default(),
        timeout_ms: overrides
            .timeout_ms
            .or(file.api.timeout_ms)
            .unwrap_or(DEFAULT_API_TIMEOUT_MS),
        default_dialect: overrides
            .default_dialect
            .or_else(|| file.editor.default_dialect.clone())
            .unwrap_or_else(|| DEFAULT_DIALECT.to_string()),
        page_size: overrides
            .page_size
            .or(file.results.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE),
        state_file: overrides
            .state_file
            .or_else(|| file.editor.state_file.clone()),
    }
}
