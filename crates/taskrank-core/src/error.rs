//! Core error types for taskrank-core.
//!
//! This module defines the error hierarchy using thiserror. Client-facing
//! failures (`ValidationError`, `ScoringError`) carry the exact message that
//! is returned to HTTP callers.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for taskrank-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Scoring precondition errors
    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    /// The store holds no tasks to suggest from
    #[error("No tasks available to suggest.")]
    NoTasks,
}

impl CoreError {
    /// True when the error was caused by the caller's input rather than
    /// by the service itself.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::Validation(_) | CoreError::Scoring(_) | CoreError::NoTasks
        )
    }

    /// Message suitable for an `{"error": ...}` response body.
    pub fn client_message(&self) -> String {
        match self {
            CoreError::Validation(e) => e.to_string(),
            CoreError::Scoring(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// A stored row could not be decoded
    #[error("Corrupt row in '{table}': {message}")]
    CorruptRow { table: String, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Home/config directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors for inbound task batches.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Request body is not a JSON array
    #[error("Expected a list of tasks.")]
    NotAList,

    /// Request body is an empty array
    #[error("No tasks provided.")]
    EmptyBatch,

    /// Title or due date missing or blank
    #[error("Title and due_date are required fields.")]
    MissingRequired,

    /// Importance outside [1, 10]
    #[error("Importance must be between 1 and 10.")]
    ImportanceOutOfRange,

    /// Estimated hours below 1
    #[error("Estimated hours must be at least 1.")]
    EstimatedHoursTooLow,

    /// Due date is not `YYYY-MM-DD`
    #[error("Invalid due_date '{0}': expected YYYY-MM-DD.")]
    InvalidDate(String),

    /// Body is not well-formed JSON or a field has the wrong type
    #[error("Malformed request body: {0}")]
    Malformed(String),
}

/// Precondition failures raised by the scoring engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("due date too far in the past: {days_overdue} days overdue (max {max_days})")]
    DueDateTooFarInPast { days_overdue: i64, max_days: i64 },

    #[error("importance out of range: {0} (expected 1-10)")]
    ImportanceOutOfRange(i64),

    #[error("estimated hours below minimum: {0} (expected at least 1)")]
    EstimatedHoursBelowMinimum(i64),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(DatabaseError::from(err))
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_message_strips_category_prefix() {
        let err = CoreError::from(ValidationError::EmptyBatch);
        assert_eq!(err.client_message(), "No tasks provided.");
        assert!(err.is_client_error());
    }

    #[test]
    fn scoring_messages_name_the_violation() {
        let err = ScoringError::DueDateTooFarInPast {
            days_overdue: 31,
            max_days: 30,
        };
        assert!(err.to_string().starts_with("due date too far in the past"));
        assert!(ScoringError::ImportanceOutOfRange(11)
            .to_string()
            .starts_with("importance out of range"));
        assert!(ScoringError::EstimatedHoursBelowMinimum(0)
            .to_string()
            .starts_with("estimated hours below minimum"));
    }

    #[test]
    fn database_errors_are_not_client_errors() {
        let err = CoreError::from(DatabaseError::Locked);
        assert!(!err.is_client_error());
        assert_eq!(err.client_message(), "Database error: Database is locked");
    }
}
