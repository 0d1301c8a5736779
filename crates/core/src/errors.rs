//! Error types shared across the DevPulse crates.

use thiserror::Error;

/// Result type alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Database-layer failures surfaced through the storage crate.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A query or statement failed to execute.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// The connection pool could not hand out a connection.
    #[error("Connection unavailable: {0}")]
    ConnectionFailed(String),

    /// Schema migrations could not be applied.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Anything else the storage layer could not classify.
    #[error("Storage error: {0}")]
    Internal(String),
}

/// Top-level error for sync, analytics and query operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// An external source (GitHub/Jira) fetch failed.
    #[error("Source error: {0}")]
    Source(String),

    /// Caller-supplied input was rejected before any work started.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn source(message: impl Into<String>) -> Self {
        Self::Source(message.into())
    }
}
