//! Table-name keyed store of compiled schemas.

use std::collections::HashMap;
use std::sync::Arc;

use super::errors::{ModelError, ModelResult};
use super::Schema;

/// Holds the compiled schema for every declared record type.
///
/// Registration happens once per type at declaration time; stored schemas
/// are immutable, so the registry hands out shared `Arc`s that any number
/// of threads may read concurrently.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a compiled schema under its table name.
    pub fn register(&mut self, schema: Arc<Schema>) -> ModelResult<()> {
        let table = schema.table_name().to_string();
        if self.schemas.contains_key(&table) {
            return Err(ModelError::AlreadyRegistered { table });
        }
        self.schemas.insert(table, schema);
        Ok(())
    }

    pub fn get(&self, table: &str) -> Option<Arc<Schema>> {
        self.schemas.get(table).cloned()
    }

    pub fn contains(&self, table: &str) -> bool {
        self.schemas.contains_key(table)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
