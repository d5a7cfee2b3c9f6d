//! quarry - a strict, lightweight schema-validating record mapper
//!
//! Record types are declared once as an immutable [`Schema`]; values coerce
//! through typed [`Field`]s; queries build up per-call [`Query`] state and
//! terminal operations hand parameter-bound statements to a host-supplied
//! [`Backend`].

pub mod backend;
pub mod error;
pub mod field;
pub mod observability;
pub mod query;
pub mod record;
pub mod schema;
pub mod sql;

pub use backend::{Backend, BackendError, BackendResult, Row};
pub use error::{Error, Result};
pub use field::{Field, FieldError, FieldKind, ValueRange};
pub use query::{Direction, Query};
pub use record::{Record, RecordState};
pub use schema::{ModelError, Schema, SchemaBuilder, SchemaRegistry};
pub use sql::Statement;
