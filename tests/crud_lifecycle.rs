//! CRUD and Record Lifecycle Tests
//!
//! End-to-end flows against a scripted backend double:
//! - get() wraps a found row and returns None when storage is empty
//! - list() wraps rows in storage order
//! - save() dispatches on lifecycle state; remove() consumes the record
//! - insert_many() is validate-first, then sequential and best-effort

use quarry::{
    Backend, BackendError, BackendResult, Error, Field, Record, RecordState, Row, Schema,
    Statement,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

// =============================================================================
// Helper Functions
// =============================================================================

/// Backend double with canned query results and an optional execute budget
/// after which every call fails.
#[derive(Default)]
struct ScriptedBackend {
    statements: Mutex<Vec<Statement>>,
    rows: Mutex<Vec<Row>>,
    fail_after: Option<usize>,
}

impl ScriptedBackend {
    fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    fn failing_after(calls: usize) -> Self {
        Self {
            fail_after: Some(calls),
            ..Self::default()
        }
    }

    fn executed(&self) -> usize {
        self.statements.lock().unwrap().len()
    }

    fn last_sql(&self) -> String {
        self.statements
            .lock()
            .unwrap()
            .last()
            .map(|s| s.sql().to_string())
            .unwrap_or_default()
    }
}

impl Backend for ScriptedBackend {
    fn execute(&self, stmt: &Statement) -> BackendResult<u64> {
        let mut statements = self.statements.lock().unwrap();
        if let Some(budget) = self.fail_after {
            if statements.len() >= budget {
                return Err(BackendError::new("write failed"));
            }
        }
        statements.push(stmt.clone());
        Ok(1)
    }

    fn query(&self, stmt: &Statement) -> BackendResult<Vec<Row>> {
        self.statements.lock().unwrap().push(stmt.clone());
        Ok(self.rows.lock().unwrap().clone())
    }
}

fn host_schema() -> Arc<Schema> {
    Schema::builder("host")
        .field("id", Field::integer().primary_key())
        .field("url", Field::string().range(1, 255).required())
        .field("ip", Field::ip())
        .field("description", Field::text())
        .build()
        .unwrap()
}

fn host_row(id: i64, url: &str) -> Row {
    let mut row = Row::new();
    row.insert("id".into(), json!(id));
    row.insert("url".into(), json!(url));
    row.insert("ip".into(), json!("1.2.3.4"));
    row
}

// =============================================================================
// Read Tests
// =============================================================================

/// get() against empty storage is an explicit not-found, never a record of
/// defaults.
#[test]
fn test_get_not_found_is_none() {
    let schema = host_schema();
    let backend = ScriptedBackend::default();

    let found = schema.get(&backend, "999").unwrap();
    assert!(found.is_none());
}

/// get() wraps the row into a persisted record.
#[test]
fn test_get_wraps_found_row() {
    let schema = host_schema();
    let backend = ScriptedBackend::with_rows(vec![host_row(7, "example.com")]);

    let record = schema.get(&backend, "7").unwrap().unwrap();
    assert_eq!(record.state(), RecordState::Persisted);
    assert_eq!(record.get("url").unwrap(), &json!("example.com"));
}

/// list() preserves storage result order and wraps every row.
#[test]
fn test_list_wraps_rows_in_order() {
    let schema = host_schema();
    let backend = ScriptedBackend::with_rows(vec![
        host_row(2, "b.com"),
        host_row(1, "a.com"),
    ]);

    let records = schema.query().list(&backend).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("url").unwrap(), &json!("b.com"));
    assert_eq!(records[1].get("url").unwrap(), &json!("a.com"));
}

/// Raw reads return rows untouched, without record wrapping.
#[test]
fn test_raw_reads_bypass_wrapping() {
    let schema = host_schema();
    let backend = ScriptedBackend::with_rows(vec![host_row(1, "a.com")]);

    let rows = schema.query().list_raw(&backend, &[]).unwrap();
    assert_eq!(rows[0]["url"], json!("a.com"));

    let row = schema.get_raw(&backend, "1", &["url"]).unwrap().unwrap();
    assert_eq!(row["url"], json!("a.com"));
    assert_eq!(backend.last_sql(), "select url from host where id=?1");
}

// =============================================================================
// Record Lifecycle Tests
// =============================================================================

/// A new record saves as an INSERT and transitions to persisted; a second
/// save is an UPDATE keyed by primary key.
#[test]
fn test_save_dispatches_on_state() {
    let schema = host_schema();
    let backend = ScriptedBackend::default();

    let mut record = Record::new(&schema);
    record.set("id", "5");
    record.set("url", "example.com");

    record.save(&backend).unwrap();
    assert_eq!(record.state(), RecordState::Persisted);
    assert!(backend.last_sql().starts_with("insert into host"));

    record.set("url", "changed.com");
    record.save(&backend).unwrap();
    assert_eq!(
        backend.last_sql(),
        "update host set url=?1 where id=?2"
    );
}

/// remove() deletes by the record's own primary key and consumes it.
#[test]
fn test_remove_deletes_own_row() {
    let schema = host_schema();
    let backend = ScriptedBackend::with_rows(vec![host_row(7, "example.com")]);

    let record = schema.get(&backend, "7").unwrap().unwrap();
    record.remove(&backend).unwrap();
    assert_eq!(backend.last_sql(), "delete from host where id=?1");
}

/// remove() on a never-persisted record is a usage error, not a statement.
#[test]
fn test_remove_unpersisted_fails() {
    let schema = host_schema();
    let backend = ScriptedBackend::default();

    let record = Record::new(&schema);
    let err = record.remove(&backend).unwrap_err();
    assert!(matches!(err, Error::Model(_)));
    assert_eq!(backend.executed(), 0);
}

/// get_value() falls back to the default instead of failing.
#[test]
fn test_get_value_fallback() {
    let schema = host_schema();
    let backend = ScriptedBackend::with_rows(vec![host_row(1, "a.com")]);

    let record = schema.get(&backend, "1").unwrap().unwrap();
    assert_eq!(record.get_value("url", json!("")), json!("a.com"));
    assert_eq!(record.get_value("absent", json!("d")), json!("d"));
    assert!(record.get("absent").is_err());
}

/// to_json() serializes the live bag, including local modifications.
#[test]
fn test_to_json_reflects_bag() {
    let schema = host_schema();
    let mut record = Record::new(&schema);
    record.set("url", "example.com");
    record.set("description", "probe target");

    let parsed: serde_json::Value =
        serde_json::from_str(&record.to_json().unwrap()).unwrap();
    assert_eq!(parsed["url"], "example.com");
    assert_eq!(parsed["description"], "probe target");
}

// =============================================================================
// Batch Insert Tests
// =============================================================================

/// A validation failure anywhere in the batch aborts before any statement
/// runs.
#[test]
fn test_insert_many_validates_before_executing() {
    let schema = host_schema();
    let backend = ScriptedBackend::default();

    let rows = vec![
        vec![("url", "a.com")],
        vec![("url", "b.com"), ("id", "junk")],
    ];
    assert!(schema.insert_many(&backend, &rows).is_err());
    assert_eq!(backend.executed(), 0);
}

/// A backend failure mid-batch aborts the remaining rows; earlier rows stay
/// written.
#[test]
fn test_insert_many_aborts_on_backend_failure() {
    let schema = host_schema();
    let backend = ScriptedBackend::failing_after(2);

    let rows = vec![
        vec![("url", "a.com")],
        vec![("url", "b.com")],
        vec![("url", "c.com")],
        vec![("url", "d.com")],
    ];
    let err = schema.insert_many(&backend, &rows).unwrap_err();
    assert!(matches!(err, Error::Backend(_)));
    assert_eq!(backend.executed(), 2);
}

/// A clean batch reports the summed affected count.
#[test]
fn test_insert_many_counts() {
    let schema = host_schema();
    let backend = ScriptedBackend::default();

    let rows = vec![vec![("url", "a.com")], vec![("url", "b.com")]];
    assert_eq!(schema.insert_many(&backend, &rows).unwrap(), 2);
}

// =============================================================================
// DDL Tests
// =============================================================================

/// create_table() composes DDL from the compiled schema.
#[test]
fn test_create_table_ddl() {
    let schema = host_schema();
    let backend = ScriptedBackend::default();

    schema.create_table(&backend).unwrap();
    assert_eq!(
        backend.last_sql(),
        "create table if not exists host (id integer primary key, \
         url varchar(255) not null, ip varchar(255), description text)"
    );
}
