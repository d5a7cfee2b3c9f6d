//! Crate-level error type.
//!
//! Unifies the module taxonomies for pipeline surfaces: per-field input
//! failures, schema/usage failures, and opaque execution-boundary failures.

use thiserror::Error;

use crate::backend::BackendError;
use crate::field::FieldError;
use crate::schema::ModelError;

/// Result type for operations that can fail anywhere in the pipeline.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error for the record layer.
#[derive(Debug, Error)]
pub enum Error {
    /// Input validation/coercion failure for one field
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Schema or usage failure
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Execution-boundary failure, propagated without interpretation
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Record value bag could not be serialized
    #[error("serialization failure: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    /// Stable string code for host consumption.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Field(_) => "FIELD_ERROR",
            Error::Model(_) => "MODEL_ERROR",
            Error::Backend(_) => "BACKEND_ERROR",
            Error::Serialize(_) => "SERIALIZE_ERROR",
        }
    }
}
