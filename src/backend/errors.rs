//! Execution-boundary error type.

use thiserror::Error;

/// Result type for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Opaque failure from the execution boundary.
///
/// Carried through unchanged: this layer never interprets storage-specific
/// codes, it only distinguishes failure from an empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("backend failure: {message}")]
pub struct BackendError {
    message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
