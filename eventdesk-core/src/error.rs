//! Error types for eventdesk.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur in eventdesk operations.
#[derive(Error, Debug)]
pub enum EventDeskError {
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Event not found")]
    NotFound,

    #[error("An event with this name already exists")]
    DuplicateName,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("Email already registered: {0}")]
    EmailTaken(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Caller-facing classification of an [`EventDeskError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Storage,
}

/// Error payload handed back to the request layer.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub success: bool,
    pub kind: ErrorKind,
    pub errors: Vec<String>,
}

impl EventDeskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EventDeskError::Validation(_) => ErrorKind::Validation,
            EventDeskError::NotFound | EventDeskError::UserNotFound(_) => ErrorKind::NotFound,
            EventDeskError::DuplicateName
            | EventDeskError::UserExists(_)
            | EventDeskError::EmailTaken(_) => ErrorKind::Conflict,
            EventDeskError::Config(_)
            | EventDeskError::Io(_)
            | EventDeskError::Json(_)
            | EventDeskError::Sqlite(_) => ErrorKind::Storage,
        }
    }

    /// Human-readable messages, one per problem.
    pub fn messages(&self) -> Vec<String> {
        match self {
            EventDeskError::Validation(errors) => errors.clone(),
            other => vec![other.to_string()],
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload {
            success: false,
            kind: self.kind(),
            errors: self.messages(),
        }
    }
}

/// Result type alias for eventdesk operations.
pub type EventDeskResult<T> = Result<T, EventDeskError>;
