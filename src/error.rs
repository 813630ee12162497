//! Error types for the task assistant

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

#[derive(Error, Debug)]
pub enum AssistantError {

    // =============================
    // Input Errors
    // =============================

    #[error("Empty utterance")]
    EmptyUtterance,

    #[error("Malformed task {id}: {reason}")]
    MalformedTask { id: i64, reason: String },

    // =============================
    // Collaborator Errors
    // =============================

    #[error("Task fetch failed: {0}")]
    TaskFetch(String),

    // =============================
    // Logic Errors
    // =============================

    #[error("Reply generation failed: {0}")]
    ReplyFailed(String),

    // =============================
    // Session Gate
    // =============================

    #[error("A reply is already in flight")]
    ReplyInFlight,

    #[error("No utterance is awaiting a reply")]
    NoPendingUtterance,

    #[error("Session is closed")]
    SessionClosed,

    #[error("Configuration error: {0}")]
    Config(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
