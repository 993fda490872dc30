//! Domain-specific error types for the console

use std::sync::Arc;

use thiserror::Error;

use crate::client::ClientError;

/// Structured paging error domain
///
/// `Clone` so that a single shared page fetch can hand the same outcome to
/// every caller waiting on it.
#[derive(Debug, Error, Clone)]
pub enum PagingError {
    #[error("JSQL {field} must be a non-negative integer")]
    InvalidPagingField { field: String },
    #[error("cannot load results page without base JSQL")]
    NoActiveSession,
    #[error("query execution failed: {0}")]
    Execute(Arc<ClientError>),
}

impl PagingError {
    pub fn invalid_field(field: impl Into<String>) -> Self {
        Self::InvalidPagingField {
            field: field.into(),
        }
    }

    /// Name of the offending paging field, if this is a validation error.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidPagingField { field } => Some(field),
            _ => None,
        }
    }
}

impl From<ClientError> for PagingError {
    fn from(value: ClientError) -> Self {
        Self::Execute(Arc::new(value))
    }
}

/// Structured configuration error domain
#[derive(Debug, Error, Clone)]
pub enum ConfigError {
    #[error("{setting}: {reason}")]
    InvalidSetting { setting: String, reason: String },
    #[error("missing {0}")]
    Missing(String),
}

impl ConfigError {
    pub fn invalid_setting(setting: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            setting: setting.into(),
            reason: reason.into(),
        }
    }

    pub fn missing(setting: impl Into<String>) -> Self {
        Self::Missing(setting.into())
    }
}
