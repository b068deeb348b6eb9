//! Error handling for Eventum
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for the Eventum application
#[derive(Error, Debug)]
pub enum EventumError {
    #[error("Incorrectly made request: {0}")]
    Validation(String),

    #[error("The required object was not found: {0}")]
    NotFound(String),

    #[error("Integrity constraint has been violated: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias for Eventum operations
pub type Result<T> = std::result::Result<T, EventumError>;

impl EventumError {
    pub fn validation(message: impl Into<String>) -> Self {
        EventumError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        EventumError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        EventumError::Conflict(message.into())
    }

    /// Check if the error is caused by the caller rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EventumError::Validation(_) | EventumError::NotFound(_) | EventumError::Conflict(_)
        )
    }
}

/// Check whether a database error is a unique-constraint violation
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error
            .code()
            .map(|code| code == "23505")
            .unwrap_or(false),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(EventumError::validation("bad id").is_client_error());
        assert!(EventumError::not_found("event 5").is_client_error());
        assert!(EventumError::conflict("limit reached").is_client_error());
        assert!(!EventumError::Config("missing url".to_string()).is_client_error());
    }

    #[test]
    fn test_row_not_found_is_not_unique_violation() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
