//! Error hints for actionable CLI messages

use super::{ClientError, ConfigError, ConsoleError, PagingError};

/// Extension trait for adding hints to errors
pub trait ErrorHint {
    /// Get a helpful hint for resolving this error
    fn hint(&self) -> Option<String>;

    /// Format the error with hint for display
    fn with_hint(&self) -> String;
}

impl ErrorHint for ConsoleError {
    fn hint(&self) -> Option<String> {
        match self {
            ConsoleError::ConfigDomain(ConfigError::Missing(setting)) if setting == "api_url" => {
                Some(
                    "Set the UMA service URL with `--api-url`, the UMA_API_URL environment variable, or `url` under `[api]` in jsql-console.toml"
                        .to_string(),
                )
            }
            ConsoleError::Client(ClientError::Http(_)) => Some(
                "The UMA service could not be reached. Check it is running with: `jsql-console health`"
                    .to_string(),
            ),
            ConsoleError::Paging(PagingError::InvalidPagingField { field }) => Some(format!(
                "The JSQL `{}` field must be a whole number >= 0, or omitted",
                field
            )),
            ConsoleError::Paging(PagingError::NoActiveSession) => {
                Some("Run a query before requesting further result pages".to_string())
            }
            ConsoleError::InvalidJsql(_) => {
                Some("JSQL must be a JSON object, e.g. '{\"select\": [...], \"from\": \"users\"}'".to_string())
            }
            _ => None,
        }
    }

    fn with_hint(&self) -> String {
        match self.hint() {
            Some(hint) => format!("{}\n  hint: {}", self, hint),
            None => self.to_string(),
        }
    }
}
