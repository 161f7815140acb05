//! Error types for the dispatch layer.

use thiserror::Error;
use trellis_core::ApiError;

/// Errors produced by the dispatch and command-routing layer.
#[derive(Debug, Clone, Error)]
pub enum FrameworkError {
    /// The named command is neither a canonical name nor an alias.
    #[error("command '{0}' not found")]
    CommandNotFound(String),

    /// `wait_for_message` was called without the intents feature enabled.
    #[error("waiting for replies requires intents to be enabled")]
    IntentsDisabled,

    /// A handler parameter could not be supplied from the context.
    #[error("parameter extraction failed: {0}")]
    Extract(String),

    /// An outbound API operation failed inside a handler.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A handler reported a domain failure.
    #[error("handler error: {0}")]
    Handler(String),
}

/// Result type for framework operations.
pub type FrameworkResult<T> = Result<T, FrameworkError>;
