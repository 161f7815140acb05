//! Shared error taxonomy for core operations.

use thiserror::Error;

/// Errors surfaced by the transport collaborator and by the
/// request-construction helpers built on top of it.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The underlying HTTP request could not be carried out.
    #[error("request failed: {0}")]
    Request(String),

    /// The platform answered with a non-success status payload.
    #[error("api status {code}: {message}")]
    Status {
        /// Platform status code.
        code: i64,
        /// Human-readable message from the platform.
        message: String,
    },

    /// A request body or response could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A media source could not be fetched or read.
    #[error("invalid media: {0}")]
    InvalidMedia(String),

    /// A context-bound operation was invoked on a context whose event does
    /// not carry the required chat or author data. Programming error.
    #[error("operation requires an active message context")]
    NotInContext,

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
