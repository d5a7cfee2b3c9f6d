//! The execution boundary: the external component that actually runs
//! composed statements against storage.
//!
//! This layer performs no scheduling and never suspends; both calls are
//! treated as blocking, and anything that blocks (or cancels) lives on the
//! other side of this trait.

mod errors;

pub use errors::{BackendError, BackendResult};

use serde_json::{Map, Value};

use crate::sql::Statement;

/// One result row: an ordered column-name to value mapping, in storage
/// result order.
pub type Row = Map<String, Value>;

/// Host-supplied statement runner.
///
/// Implementations must:
/// - acquire any underlying connection before each call and release it on
///   every exit path, including failure;
/// - bind [`Statement::params`] positionally to the `?N` placeholders in
///   [`Statement::sql`];
/// - report failures as [`BackendError`]. Zero rows and zero affected rows
///   are successful results, never errors.
pub trait Backend {
    /// Runs a data or DDL statement, returning the affected-row count.
    fn execute(&self, stmt: &Statement) -> BackendResult<u64>;

    /// Runs a SELECT, returning rows in storage result order.
    fn query(&self, stmt: &Statement) -> BackendResult<Vec<Row>>;
}
