//! Default constants for console configuration
//!
//! These constants define the default values used throughout the configuration
//! system when no explicit value is provided.

/// Default UMA service URL
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default request timeout in milliseconds (30 seconds)
pub const DEFAULT_API_TIMEOUT_MS: u64 = 30_000;

/// Default SQL dialect sent to the transform service
pub const DEFAULT_DIALECT: &str = "generic";

/// Default number of rows per results page when the query carries no limit
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "jsql-console.toml";

/// Default editor state file name, under the user's config directory
pub const DEFAULT_STATE_FILE: &str = "editor-state.json";
