//! Error types for the JSQL console
//!
//! This module defines the main error type used throughout the crate together
//! with the structured domain errors raised by the paging engine and the
//! configuration layer.

use thiserror::Error;

mod domain;
mod hints;

pub use crate::client::ClientError;
pub use domain::{ConfigError, PagingError};
pub use hints::ErrorHint;

/// Result type alias for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Main error type for the console
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Paging error: {0}")]
    Paging(#[from] PagingError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration error: {0}")]
    ConfigDomain(#[from] ConfigError),

    #[error("{0}")]
    InvalidJsql(String),

    #[error("{0}")]
    Format(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ConsoleError {
    /// Create a configuration error with context
    pub fn config(setting: &str, reason: impl Into<String>) -> Self {
        ConsoleError::ConfigDomain(ConfigError::invalid_setting(setting, reason))
    }

    /// Create a configuration error for a missing setting
    pub fn config_missing(setting: &str) -> Self {
        ConsoleError::ConfigDomain(ConfigError::missing(setting))
    }

    /// Returns the paging error if this error originated in the paging engine.
    pub fn as_paging(&self) -> Option<&PagingError> {
        match self {
            ConsoleError::Paging(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the remote service was unreachable or answered with a transport error.
    pub fn is_transport(&self) -> bool {
        match self {
            ConsoleError::Client(ClientError::Http(_)) => true,
            ConsoleError::Paging(PagingError::Execute(err)) => {
                matches!(err.as_ref(), ClientError::Http(_))
            }
            _ => false,
        }
    }
}
