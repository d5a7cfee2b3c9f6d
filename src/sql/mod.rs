//! SQL statement composition.
//!
//! Statements carry their text and their parameter values separately: every
//! value position in composed SQL is a numbered placeholder (`?1`, `?2`, ...)
//! bound at the execution boundary. Identifier positions (table names,
//! columns, ordering) only ever receive text that was checked against a
//! compiled schema, so no caller-supplied value reaches the statement text.

/// Doubles single quotes so the text can sit inside a quoted SQL literal.
pub fn escape(raw: &str) -> String {
    raw.replace('\'', "''")
}

/// Folds doubled single quotes back into one; inverse of [`escape`].
pub fn unescape(escaped: &str) -> String {
    escaped.replace("''", "'")
}

/// One composed SQL statement: text with numbered placeholders plus the
/// values to bind, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    params: Vec<String>,
}

impl Statement {
    /// Passthrough statement with no bound parameters.
    ///
    /// This is the escape hatch for callers that need to run hand-written
    /// SQL through the execution boundary directly.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// The statement text, containing `?N` placeholders.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameter values in placeholder order (`params[0]` binds `?1`).
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Inlines escaped, quoted parameters into displayable SQL.
    ///
    /// For logs and diagnostics only; execution always receives the
    /// placeholder text and the parameters separately.
    pub fn render(&self) -> String {
        let mut out = self.sql.clone();
        // Highest placeholder first so "?1" never clips the front of "?10".
        for (i, param) in self.params.iter().enumerate().rev() {
            let placeholder = format!("?{}", i + 1);
            let literal = format!("'{}'", escape(param));
            out = out.replace(&placeholder, &literal);
        }
        out
    }
}

/// Incremental statement composer that manages placeholder numbering.
#[derive(Debug, Default)]
pub(crate) struct StatementBuilder {
    sql: String,
    params: Vec<String>,
}

impl StatementBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends literal statement text (keywords, validated identifiers).
    pub(crate) fn push(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    /// Appends the next `?N` placeholder and records its value.
    pub(crate) fn bind(&mut self, value: impl Into<String>) {
        self.params.push(value.into());
        self.sql.push('?');
        self.sql.push_str(&self.params.len().to_string());
    }

    pub(crate) fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}
