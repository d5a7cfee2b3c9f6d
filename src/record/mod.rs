//! Dynamic record instances.
//!
//! A [`Record`] is one row's worth of data: an ordered column-name to value
//! bag tagged with its schema and a lifecycle state. Records are created
//! `New` by construction and `Persisted` by read operations; saving
//! dispatches on that state.

use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::backend::Backend;
use crate::error::Error;
use crate::schema::{ModelError, Schema};

/// Persistence state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// Never stored; saving issues an INSERT
    New,
    /// Loaded from storage or already saved; saving issues an UPDATE
    Persisted,
}

/// One row's worth of data, dynamically keyed, tagged with its schema.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<Schema>,
    values: Map<String, Value>,
    state: RecordState,
}

impl Record {
    /// Creates an empty, never-persisted record of the given type.
    pub fn new(schema: &Arc<Schema>) -> Self {
        Self {
            schema: schema.clone(),
            values: Map::new(),
            state: RecordState::New,
        }
    }

    /// Wraps a storage row; used by read operations.
    pub(crate) fn persisted(schema: &Arc<Schema>, values: Map<String, Value>) -> Self {
        Self {
            schema: schema.clone(),
            values,
            state: RecordState::Persisted,
        }
    }

    pub fn state(&self) -> RecordState {
        self.state
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Reads one column. A key the bag does not hold is a typed
    /// unknown-column error, distinct from an empty SQL result.
    pub fn get(&self, column: &str) -> Result<&Value, ModelError> {
        self.values.get(column).ok_or_else(|| ModelError::MissingColumn {
            table: self.schema.table_name().to_string(),
            column: column.to_string(),
        })
    }

    /// Writes one column. Keys are not checked here; validation happens
    /// when the record is saved.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(column.into(), value.into());
    }

    /// Reads one column, falling back to `default` on absence. Never fails.
    pub fn get_value(&self, column: &str, default: Value) -> Value {
        self.values.get(column).cloned().unwrap_or(default)
    }

    /// Serializes the current value bag.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Saves the record: INSERT when `New` (success transitions to
    /// `Persisted`), UPDATE by primary key when `Persisted` (the SET list
    /// excludes the primary-key column).
    pub fn save(&mut self, backend: &dyn Backend) -> Result<u64, Error> {
        match self.state {
            RecordState::New => {
                let pairs = self.raw_pairs(None);
                let refs: Vec<(&str, &str)> = pairs
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect();
                let affected = self.schema.insert(backend, &refs)?;
                self.state = RecordState::Persisted;
                Ok(affected)
            }
            RecordState::Persisted => {
                let pk = self.primary_key_value()?;
                let pk_name = self.schema.primary_key().name().to_string();
                let pairs = self.raw_pairs(Some(&pk_name));
                let refs: Vec<(&str, &str)> = pairs
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect();
                self.schema.update_by_pk(backend, &pk, &refs)
            }
        }
    }

    /// Deletes the stored row this record came from, consuming the record.
    /// Calling this on a never-persisted record is a usage error.
    pub fn remove(self, backend: &dyn Backend) -> Result<u64, Error> {
        if self.state == RecordState::New {
            return Err(ModelError::NotPersisted {
                table: self.schema.table_name().to_string(),
            }
            .into());
        }
        let pk = self.primary_key_value()?;
        self.schema.delete_by_pk(backend, &pk)
    }

    /// The bag as `(column, raw text)` pairs, optionally excluding one
    /// column (the primary key on the update path).
    fn raw_pairs(&self, exclude: Option<&str>) -> Vec<(String, String)> {
        self.values
            .iter()
            .filter(|(k, _)| exclude != Some(k.as_str()))
            .map(|(k, v)| (k.clone(), value_to_raw(v)))
            .collect()
    }

    fn primary_key_value(&self) -> Result<String, Error> {
        let pk_name = self.schema.primary_key().name();
        match self.values.get(pk_name) {
            Some(value) => Ok(value_to_raw(value)),
            None => Err(ModelError::MissingPrimaryKeyValue {
                table: self.schema.table_name().to_string(),
                column: pk_name.to_string(),
            }
            .into()),
        }
    }
}

/// A record serializes as its value bag, in bag order.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}

/// Renders a bag value as the textual input the field coercers expect.
fn value_to_raw(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
