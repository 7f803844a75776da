//! Core error types for timemaster-core.
//!
//! Every failure the engine can report is advisory: callers surface it to the
//! player and keep going. Nothing here is fatal to a session.

use std::path::PathBuf;
use thiserror::Error;

use crate::task::TaskTransitionError;

/// Core error type for timemaster-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Another task already holds the active slot.
    #[error("Task already in progress: complete '{active}' before starting a new one")]
    Conflict { active: String },

    /// The task id does not resolve to a known task.
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// Task status transition refused.
    #[error(transparent)]
    InvalidTransition(#[from] TaskTransitionError),

    /// Ignore/yield called while no distraction is showing.
    #[error("No distraction is pending")]
    NoDistraction,

    /// Timer control attempted while a distraction waits for resolution.
    #[error("A distraction is pending: ignore or yield first")]
    DistractionPending,

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors raised at the input boundary.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is blank
    #[error("'{field}' must not be empty")]
    Empty { field: String },

    /// Numeric value outside the accepted range
    #[error("'{field}' must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        value: i64,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;

    #[test]
    fn conflict_message_names_active_task() {
        let err = CoreError::Conflict {
            active: "task-1".into(),
        };
        assert!(err.to_string().contains("task-1"));
    }

    #[test]
    fn transition_error_converts() {
        let err: CoreError = TaskTransitionError {
            from: TaskStatus::Completed,
            to: TaskStatus::InProgress,
        }
        .into();
        assert!(matches!(err, CoreError::InvalidTransition(_)));
    }

    #[test]
    fn out_of_range_message() {
        let err = ValidationError::OutOfRange {
            field: "rating".into(),
            min: 1,
            max: 5,
            value: 9,
        };
        assert_eq!(err.to_string(), "'rating' must be between 1 and 5, got 9");
    }
}
