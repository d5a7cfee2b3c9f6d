//! Query building and CRUD composition.
//!
//! [`Query`] holds the pending filter/order state for one chained call
//! sequence. The builder owns that state and every terminal operation takes
//! it by move, so a finished or failed call can never leak criteria into a
//! later one, and concurrent callers on the same schema are isolated by
//! construction.
//!
//! Terminal operations validate input through the schema, compose a
//! [`Statement`] with bound parameters, and hand it to the [`Backend`].

use std::sync::Arc;

use crate::backend::{Backend, Row};
use crate::error::Error;
use crate::observability::Logger;
use crate::record::Record;
use crate::schema::{ModelError, Schema};
use crate::sql::{self, Statement, StatementBuilder};

/// Sort direction for [`Query::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn keyword(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Pending filter/order state for one chained call sequence against one
/// record type.
#[derive(Debug, Clone)]
pub struct Query {
    schema: Arc<Schema>,
    // (sql column name, coerced value), AND-joined equality criteria
    criteria: Vec<(String, String)>,
    order: Option<(String, Direction)>,
}

impl Query {
    fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            criteria: Vec::new(),
            order: None,
        }
    }

    /// Adds an equality criterion. The column must exist in the schema and
    /// the value is coerced through its field before it is stored.
    pub fn filter(mut self, column: &str, raw: &str) -> Result<Self, Error> {
        let field = self
            .schema
            .field(column)
            .ok_or_else(|| ModelError::UnknownColumn {
                table: self.schema.table_name().to_string(),
                column: column.to_string(),
            })?;
        let coerced = field.coerce(Some(raw))?;
        self.criteria.push((field.name().to_string(), coerced));
        Ok(self)
    }

    /// Sets the ordering clause. Only a schema column plus a [`Direction`]
    /// is accepted, so no caller-supplied text reaches the statement.
    pub fn order_by(mut self, column: &str, direction: Direction) -> Result<Self, Error> {
        let field = self
            .schema
            .field(column)
            .ok_or_else(|| ModelError::UnknownColumn {
                table: self.schema.table_name().to_string(),
                column: column.to_string(),
            })?;
        self.order = Some((field.name().to_string(), direction));
        Ok(self)
    }

    /// Runs the pending SELECT and wraps each row into a persisted
    /// [`Record`]. An empty result set is an empty vector, not an error.
    pub fn list(self, backend: &dyn Backend) -> Result<Vec<Record>, Error> {
        let schema = self.schema.clone();
        let rows = self.run_select(backend, &[])?;
        Ok(rows
            .into_iter()
            .map(|row| Record::persisted(&schema, row))
            .collect())
    }

    /// Runs the pending SELECT and returns raw rows, bypassing record
    /// wrapping. `columns` projects the result; empty means every column.
    pub fn list_raw(self, backend: &dyn Backend, columns: &[&str]) -> Result<Vec<Row>, Error> {
        self.run_select(backend, columns)
    }

    /// Validates and coerces `values`, then runs an UPDATE scoped by the
    /// pending filter. Empty input returns 0 without contacting the
    /// backend.
    pub fn update(self, backend: &dyn Backend, values: &[(&str, &str)]) -> Result<u64, Error> {
        if values.is_empty() {
            return Ok(0);
        }
        let params = self.schema.coerce_params(values)?;
        let mut b = StatementBuilder::new();
        b.push(&format!("update {} set ", self.schema.table_name()));
        push_assignments(&mut b, &params);
        push_where(&mut b, &self.criteria);
        execute_logged(backend, &self.schema, "update", &b.finish())
    }

    /// Runs a DELETE scoped by the pending filter.
    ///
    /// With no filter set this deletes every row in the table; callers that
    /// want a scoped delete must say so with [`Query::filter`] or use
    /// [`Schema::delete_by_pk`].
    pub fn delete(self, backend: &dyn Backend) -> Result<u64, Error> {
        let mut b = StatementBuilder::new();
        b.push(&format!("delete from {}", self.schema.table_name()));
        push_where(&mut b, &self.criteria);
        execute_logged(backend, &self.schema, "delete", &b.finish())
    }

    fn run_select(self, backend: &dyn Backend, columns: &[&str]) -> Result<Vec<Row>, Error> {
        let stmt = self.into_select(columns)?;
        query_logged(backend, &stmt)
    }

    fn into_select(self, columns: &[&str]) -> Result<Statement, Error> {
        let cols = self.schema.projection(columns)?;
        let mut b = StatementBuilder::new();
        b.push(&format!("select {} from {}", cols, self.schema.table_name()));
        push_where(&mut b, &self.criteria);
        if let Some((column, direction)) = &self.order {
            b.push(&format!(" order by {} {}", column, direction.keyword()));
        }
        Ok(b.finish())
    }
}

impl Schema {
    /// Starts a chained call sequence against this record type.
    pub fn query(&self) -> Query {
        Query::new(self.shared())
    }

    /// Looks one row up by primary key. `None` is the explicit not-found
    /// result; a found row comes back as a persisted [`Record`].
    pub fn get(&self, backend: &dyn Backend, pk: &str) -> Result<Option<Record>, Error> {
        let rows = self.select_by_pk(backend, pk, &[])?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| Record::persisted(&self.shared(), row)))
    }

    /// Raw-row variant of [`Schema::get`], with optional column projection.
    pub fn get_raw(
        &self,
        backend: &dyn Backend,
        pk: &str,
        columns: &[&str],
    ) -> Result<Option<Row>, Error> {
        let rows = self.select_by_pk(backend, pk, columns)?;
        Ok(rows.into_iter().next())
    }

    /// Validates and coerces every supplied column, then runs an INSERT.
    /// Empty input returns 0 without contacting the backend.
    pub fn insert(&self, backend: &dyn Backend, values: &[(&str, &str)]) -> Result<u64, Error> {
        if values.is_empty() {
            return Ok(0);
        }
        let stmt = self.compose_insert(values)?;
        execute_logged(backend, self, "insert", &stmt)
    }

    /// Inserts a batch of rows.
    ///
    /// Every row is validated and composed before anything runs, so a bad
    /// row aborts the whole batch up front. Execution is then sequential
    /// and best-effort: the first backend failure aborts the remaining
    /// rows, and rows already written are not rolled back.
    pub fn insert_many(
        &self,
        backend: &dyn Backend,
        rows: &[Vec<(&str, &str)>],
    ) -> Result<u64, Error> {
        let mut statements = Vec::with_capacity(rows.len());
        for row in rows {
            if row.is_empty() {
                continue;
            }
            statements.push(self.compose_insert(row)?);
        }

        let mut affected = 0;
        for stmt in &statements {
            affected += execute_logged(backend, self, "insert", stmt)?;
        }
        Ok(affected)
    }

    /// Deletes exactly the row with the given primary-key value.
    pub fn delete_by_pk(&self, backend: &dyn Backend, pk: &str) -> Result<u64, Error> {
        let pk_field = self.primary_key();
        let coerced = pk_field.coerce(Some(pk))?;
        let mut b = StatementBuilder::new();
        b.push(&format!(
            "delete from {} where {}=",
            self.table_name(),
            pk_field.name()
        ));
        b.bind(coerced);
        execute_logged(backend, self, "delete", &b.finish())
    }

    /// Composes and runs CREATE TABLE DDL from the compiled schema, using
    /// each field's storage hint (or a kind-derived default).
    pub fn create_table(&self, backend: &dyn Backend) -> Result<u64, Error> {
        let mut lines = Vec::with_capacity(self.field_count());
        for (_, field) in self.fields() {
            let mut line = format!(
                "{} {}",
                field.name(),
                field.ddl_hint().unwrap_or_else(|| field.kind().default_ddl())
            );
            if field.is_primary_key() {
                line.push_str(" primary key");
            }
            if field.is_required() {
                line.push_str(" not null");
            }
            if let Some(default) = field.default() {
                line.push_str(&format!(" default '{}'", sql::escape(default)));
            }
            lines.push(line);
        }
        let stmt = Statement::raw(format!(
            "create table if not exists {} ({})",
            self.table_name(),
            lines.join(", ")
        ));
        execute_logged(backend, self, "create_table", &stmt)
    }

    /// UPDATE one row by primary key; used by the record save path. The
    /// assignments never include the primary-key column.
    pub(crate) fn update_by_pk(
        &self,
        backend: &dyn Backend,
        pk: &str,
        values: &[(&str, &str)],
    ) -> Result<u64, Error> {
        if values.is_empty() {
            return Ok(0);
        }
        let params = self.coerce_params(values)?;
        let pk_field = self.primary_key();
        let pk_value = pk_field.coerce(Some(pk))?;

        let mut b = StatementBuilder::new();
        b.push(&format!("update {} set ", self.table_name()));
        push_assignments(&mut b, &params);
        b.push(&format!(" where {}=", pk_field.name()));
        b.bind(pk_value);
        execute_logged(backend, self, "update", &b.finish())
    }

    fn select_by_pk(
        &self,
        backend: &dyn Backend,
        pk: &str,
        columns: &[&str],
    ) -> Result<Vec<Row>, Error> {
        let pk_field = self.primary_key();
        let coerced = pk_field.coerce(Some(pk))?;
        let cols = self.projection(columns)?;
        let mut b = StatementBuilder::new();
        b.push(&format!(
            "select {} from {} where {}=",
            cols,
            self.table_name(),
            pk_field.name()
        ));
        b.bind(coerced);
        query_logged(backend, &b.finish())
    }

    /// Renders a projection list, validating every name against the schema.
    /// Empty input selects every column.
    fn projection(&self, columns: &[&str]) -> Result<String, Error> {
        if columns.is_empty() {
            return Ok("*".to_string());
        }
        let mut names = Vec::with_capacity(columns.len());
        for column in columns {
            let field = self.field(column).ok_or_else(|| ModelError::UnknownColumn {
                table: self.table_name().to_string(),
                column: (*column).to_string(),
            })?;
            names.push(field.name());
        }
        Ok(names.join(","))
    }

    fn compose_insert(&self, values: &[(&str, &str)]) -> Result<Statement, Error> {
        let params = self.coerce_params(values)?;
        let columns: Vec<&str> = params.iter().map(|(c, _)| c.as_str()).collect();
        let mut b = StatementBuilder::new();
        b.push(&format!(
            "insert into {}({}) values(",
            self.table_name(),
            columns.join(",")
        ));
        for (i, (_, value)) in params.iter().enumerate() {
            if i > 0 {
                b.push(",");
            }
            b.bind(value.clone());
        }
        b.push(")");
        Ok(b.finish())
    }
}

fn push_where(b: &mut StatementBuilder, criteria: &[(String, String)]) {
    for (i, (column, value)) in criteria.iter().enumerate() {
        b.push(if i == 0 { " where " } else { " and " });
        b.push(&format!("{}=", column));
        b.bind(value.clone());
    }
}

fn push_assignments(b: &mut StatementBuilder, params: &[(String, String)]) {
    for (i, (column, value)) in params.iter().enumerate() {
        if i > 0 {
            b.push(",");
        }
        b.push(&format!("{}=", column));
        b.bind(value.clone());
    }
}

fn execute_logged(
    backend: &dyn Backend,
    schema: &Schema,
    op: &str,
    stmt: &Statement,
) -> Result<u64, Error> {
    Logger::trace(
        "statement.compose",
        &[
            ("op", op),
            ("sql", &stmt.render()),
            ("table", schema.table_name()),
        ],
    );
    match backend.execute(stmt) {
        Ok(affected) => {
            Logger::info(
                "statement.execute",
                &[
                    ("op", op),
                    ("rows", &affected.to_string()),
                    ("table", schema.table_name()),
                ],
            );
            Ok(affected)
        }
        Err(err) => {
            Logger::error(
                "statement.execute",
                &[
                    ("error", &err.to_string()),
                    ("op", op),
                    ("table", schema.table_name()),
                ],
            );
            Err(err.into())
        }
    }
}

fn query_logged(backend: &dyn Backend, stmt: &Statement) -> Result<Vec<Row>, Error> {
    Logger::trace("statement.compose", &[("op", "select"), ("sql", &stmt.render())]);
    match backend.query(stmt) {
        Ok(rows) => {
            Logger::info(
                "statement.execute",
                &[("op", "select"), ("rows", &rows.len().to_string())],
            );
            Ok(rows)
        }
        Err(err) => {
            Logger::error(
                "statement.execute",
                &[("error", &err.to_string()), ("op", "select")],
            );
            Err(err.into())
        }
    }
}
