//! Error types for the source-client crate.

use thiserror::Error;

/// Result type alias for source fetch operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors raised while talking to an external source API.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-2xx or otherwise unusable response from a provider
    #[error("{provider} error: {message}")]
    Provider { provider: String, message: String },
}

impl SourceError {
    pub fn provider(provider: &str, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

impl From<SourceError> for devpulse_core::Error {
    fn from(err: SourceError) -> Self {
        devpulse_core::Error::Source(err.to_string())
    }
}
