//! Schema and usage error types.

use thiserror::Error;

/// Result type for schema operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Schema/usage failures: bad declarations, unknown columns, lifecycle
/// misuse. Distinct from per-value [`crate::field::FieldError`]s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Record type declared without a table name
    #[error("schema declared without a table name")]
    MissingTableName,

    /// Record type declared with no fields
    #[error("schema for table '{table}' declares no fields")]
    NoFields { table: String },

    /// No field marked as primary key
    #[error("schema for table '{table}' has no primary key")]
    MissingPrimaryKey { table: String },

    /// More than one field marked as primary key
    #[error("schema for table '{table}' marks both '{first}' and '{second}' as primary key")]
    DuplicatePrimaryKey {
        table: String,
        first: String,
        second: String,
    },

    /// Same column declared twice
    #[error("schema for table '{table}' declares column '{column}' more than once")]
    DuplicateColumn { table: String, column: String },

    /// Criterion or value referenced a column the schema does not have
    #[error("table '{table}' has no column '{column}'")]
    UnknownColumn { table: String, column: String },

    /// Record value bag has no entry under that column name. Distinct from
    /// an empty SQL result.
    #[error("record for table '{table}' has no value for column '{column}'")]
    MissingColumn { table: String, column: String },

    /// Registry already holds a schema for that table
    #[error("a schema for table '{table}' is already registered")]
    AlreadyRegistered { table: String },

    /// Persistence operation that needs a stored row ran against a record
    /// that was never saved
    #[error("record for table '{table}' has not been persisted")]
    NotPersisted { table: String },

    /// Persisted-record operation found no primary-key value in the bag
    #[error("record for table '{table}' carries no value for primary key '{column}'")]
    MissingPrimaryKeyValue { table: String, column: String },
}
