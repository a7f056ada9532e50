//! Core error types for `WatchLink`.

use thiserror::Error;

/// Core error type for `WatchLink` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Streaming service name did not match any known platform or alias.
    #[error("Unknown streaming service: {0}")]
    UnknownService(String),

    /// A request was missing a required field.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
