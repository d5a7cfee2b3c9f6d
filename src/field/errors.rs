//! Field error types.

use thiserror::Error;

/// Result type for field coercion.
pub type FieldResult<T> = Result<T, FieldError>;

/// Input validation/coercion failures.
///
/// Always attributable to one field and one caller-supplied value; the
/// message names both.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Required field received no value and has no default
    #[error("the field '{field}' must not be null")]
    MissingValue { field: String },

    /// Value could not be parsed as the field's type
    #[error("the {kind} field value '{value}' format error")]
    TypeMismatch { kind: &'static str, value: String },

    /// Numeric value outside the declared range
    #[error("the {kind} field value '{value}' out of range")]
    OutOfRange { kind: &'static str, value: String },

    /// String length outside the declared range
    #[error("the length of the field value '{value}' out of range")]
    LengthOutOfRange { value: String },

    /// Value did not match the field's pattern
    #[error("the {kind} field value '{value}' format error")]
    PatternMismatch { kind: &'static str, value: String },

    /// Range declared with min greater than max
    #[error("the range {min}-{max} of field '{field}' define error")]
    InvalidRange { field: String, min: i64, max: i64 },
}
