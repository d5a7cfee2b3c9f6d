//! Schema compilation and registration.
//!
//! A record type is declared once by building a [`Schema`]: the builder
//! scans the declared fields, assigns names from declaration keys, enforces
//! exactly one primary key, and freezes an ordered name-to-field mapping.
//! The compiled schema is immutable and may be shared across threads
//! without synchronization.

mod errors;
mod registry;

pub use errors::{ModelError, ModelResult};
pub use registry::SchemaRegistry;

use std::sync::{Arc, Weak};

use crate::error::Error;
use crate::field::{Field, FieldError};

/// Immutable compiled schema for one record type.
#[derive(Debug)]
pub struct Schema {
    table: String,
    // Declaration order matters for composed column lists and DDL.
    fields: Vec<(String, Field)>,
    primary_key: usize,
    // Back-reference to the owning Arc so read operations can tag the
    // records they produce.
    self_ref: Weak<Schema>,
}

impl Schema {
    /// Starts a declaration for the given table.
    pub fn builder(table: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            table: table.into(),
            fields: Vec::new(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Looks a field up by its declaration key or its column name (the two
    /// differ only when the field carries an explicit name).
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(k, f)| k == key || f.name() == key)
            .map(|(_, f)| f)
    }

    /// Declaration-ordered iteration over `(key, field)` pairs.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(k, f)| (k.as_str(), f))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// The designated primary-key field.
    pub fn primary_key(&self) -> &Field {
        &self.fields[self.primary_key].1
    }

    /// The owning shared handle. Always succeeds: a live `&self` implies
    /// the `Arc` built by [`SchemaBuilder::build`] is still alive.
    pub(crate) fn shared(&self) -> Arc<Schema> {
        self.self_ref.upgrade().expect("schema outlived its handle")
    }

    /// Validates and coerces caller-supplied `(column, raw value)` pairs
    /// through their fields, producing `(sql column name, coerced value)`
    /// pairs in input order.
    pub(crate) fn coerce_params(
        &self,
        values: &[(&str, &str)],
    ) -> Result<Vec<(String, String)>, Error> {
        let mut out = Vec::with_capacity(values.len());
        for (key, raw) in values {
            let field = self.field(key).ok_or_else(|| ModelError::UnknownColumn {
                table: self.table.clone(),
                column: (*key).to_string(),
            })?;
            let coerced = field.coerce(Some(raw))?;
            out.push((field.name().to_string(), coerced));
        }
        Ok(out)
    }
}

/// Collects field declarations for one record type; [`SchemaBuilder::build`]
/// is the registration step that runs once per type.
#[derive(Debug)]
pub struct SchemaBuilder {
    table: String,
    fields: Vec<(String, Field)>,
}

impl SchemaBuilder {
    /// Declares a field under the given key. The key becomes the column
    /// name unless the field carries an explicit name.
    pub fn field(mut self, key: impl Into<String>, field: Field) -> Self {
        self.fields.push((key.into(), field));
        self
    }

    /// Compiles the declarations into an immutable schema.
    ///
    /// Fails when the table name is empty, no fields are declared, a column
    /// is declared twice, a field range has `min > max`, or the primary key
    /// is missing or duplicated.
    pub fn build(self) -> Result<Arc<Schema>, Error> {
        if self.table.is_empty() {
            return Err(ModelError::MissingTableName.into());
        }
        if self.fields.is_empty() {
            return Err(ModelError::NoFields { table: self.table }.into());
        }

        let mut fields = self.fields;
        let mut primary_key: Option<usize> = None;

        for index in 0..fields.len() {
            let key = fields[index].0.clone();
            if fields[..index].iter().any(|(k, _)| *k == key) {
                return Err(ModelError::DuplicateColumn {
                    table: self.table,
                    column: key,
                }
                .into());
            }

            let field = &mut fields[index].1;
            if field.name.is_empty() {
                field.name = key.clone();
            }
            if let Some(range) = field.value_range() {
                if range.min > range.max {
                    return Err(FieldError::InvalidRange {
                        field: field.name.clone(),
                        min: range.min,
                        max: range.max,
                    }
                    .into());
                }
            }
            if field.is_primary_key() {
                match primary_key {
                    None => primary_key = Some(index),
                    Some(first) => {
                        return Err(ModelError::DuplicatePrimaryKey {
                            table: self.table,
                            first: fields[first].0.clone(),
                            second: key,
                        }
                        .into())
                    }
                }
            }
        }

        let primary_key = primary_key.ok_or(ModelError::MissingPrimaryKey {
            table: self.table.clone(),
        })?;

        Ok(Arc::new_cyclic(|weak| Schema {
            table: self.table,
            fields,
            primary_key,
            self_ref: weak.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;

    fn host_builder() -> SchemaBuilder {
        Schema::builder("host")
            .field("id", Field::integer().primary_key())
            .field("url", Field::string().range(1, 255).required())
            .field("ip", Field::ip())
            .field("description", Field::text())
    }

    #[test]
    fn test_build_assigns_names_from_declaration_keys() {
        let schema = host_builder().build().unwrap();
        assert_eq!(schema.field("url").unwrap().name(), "url");
        assert_eq!(schema.primary_key().name(), "id");
    }

    #[test]
    fn test_explicit_name_survives_build() {
        let schema = Schema::builder("t")
            .field("key", Field::integer().primary_key().named("id"))
            .build()
            .unwrap();
        assert_eq!(schema.field("key").unwrap().name(), "id");
    }

    #[test]
    fn test_fields_keep_declaration_order() {
        let schema = host_builder().build().unwrap();
        let keys: Vec<&str> = schema.fields().map(|(k, _)| k).collect();
        assert_eq!(keys, ["id", "url", "ip", "description"]);
    }

    #[test]
    fn test_missing_table_name_rejected() {
        let err = Schema::builder("")
            .field("id", Field::integer().primary_key())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Model(ModelError::MissingTableName)
        ));
    }

    #[test]
    fn test_no_fields_rejected() {
        let err = Schema::builder("t").build().unwrap_err();
        assert!(matches!(err, Error::Model(ModelError::NoFields { .. })));
    }

    #[test]
    fn test_missing_primary_key_rejected() {
        let err = Schema::builder("t")
            .field("name", Field::string())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Model(ModelError::MissingPrimaryKey { .. })
        ));
    }

    #[test]
    fn test_duplicate_primary_key_rejected() {
        let err = Schema::builder("t")
            .field("a", Field::integer().primary_key())
            .field("b", Field::integer().primary_key())
            .build()
            .unwrap_err();
        match err {
            Error::Model(ModelError::DuplicatePrimaryKey { first, second, .. }) => {
                assert_eq!(first, "a");
                assert_eq!(second, "b");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = Schema::builder("t")
            .field("id", Field::integer().primary_key())
            .field("id", Field::string())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Model(ModelError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn test_inverted_range_is_a_definition_time_error() {
        let err = Schema::builder("t")
            .field("id", Field::integer().primary_key())
            .field("name", Field::string().range(10, 1))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Field(FieldError::InvalidRange { min: 10, max: 1, .. })
        ));
    }

    #[test]
    fn test_coerce_params_validates_and_maps_names() {
        let schema = host_builder().build().unwrap();
        let params = schema
            .coerce_params(&[("url", "example.com"), ("id", "07")])
            .unwrap();
        assert_eq!(
            params,
            vec![
                ("url".to_string(), "example.com".to_string()),
                ("id".to_string(), "7".to_string()),
            ]
        );
    }

    #[test]
    fn test_coerce_params_rejects_unknown_column() {
        let schema = host_builder().build().unwrap();
        let err = schema.coerce_params(&[("bogus", "1")]).unwrap_err();
        assert!(matches!(
            err,
            Error::Model(ModelError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_field_kind_accessible_after_build() {
        let schema = host_builder().build().unwrap();
        assert_eq!(schema.field("ip").unwrap().kind(), FieldKind::Ip);
        assert_eq!(schema.field_count(), 4);
    }
}
