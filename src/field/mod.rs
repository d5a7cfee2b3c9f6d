//! Typed field validators and coercers.
//!
//! A [`Field`] describes one column: its kind, constraints, and optional
//! storage hints. [`Field::coerce`] turns untyped textual input into the
//! canonical value for that kind, failing with [`FieldError`] on bad input.
//! Coercion is pure: the same input against the same definition always
//! produces the same output.

mod errors;

pub use errors::{FieldError, FieldResult};

use std::sync::OnceLock;

use regex::Regex;

use crate::sql;

/// Closed interval constraint on a field.
///
/// Numeric value bounds for integer fields; length bounds for string-like
/// fields (measured on the escaped text for plain strings).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueRange {
    pub min: i64,
    pub max: i64,
}

impl ValueRange {
    fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// The kind of a field, selecting its coercion behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Whole number; coerces to the canonical decimal string
    Integer,
    /// Passthrough, no additional coercion
    Float,
    /// Passthrough, no additional coercion
    Boolean,
    /// Free text with optional length bounds
    String,
    /// Unbounded free text
    Text,
    /// Optional scheme + dotted host, optional port and path
    Url,
    /// Dotted-quad IPv4 address, optional port
    Ip,
    /// local-part @ dotted domain, restricted character set
    Email,
}

impl FieldKind {
    /// Returns the kind name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::String => "string",
            FieldKind::Text => "text",
            FieldKind::Url => "url",
            FieldKind::Ip => "IP",
            FieldKind::Email => "email",
        }
    }

    /// Storage type used by DDL composition when no `ddl` hint is set.
    pub(crate) fn default_ddl(&self) -> &'static str {
        match self {
            FieldKind::Integer | FieldKind::Boolean => "integer",
            FieldKind::Float => "real",
            FieldKind::Text => "text",
            FieldKind::String | FieldKind::Url | FieldKind::Ip | FieldKind::Email => {
                "varchar(255)"
            }
        }
    }
}

/// One column's definition: a typed validator/coercer.
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) name: String,
    kind: FieldKind,
    primary_key: bool,
    required: bool,
    default: Option<String>,
    ddl: Option<String>,
    range: Option<ValueRange>,
}

impl Field {
    fn new(kind: FieldKind) -> Self {
        Self {
            name: String::new(),
            kind,
            primary_key: false,
            required: false,
            default: None,
            ddl: None,
            range: None,
        }
    }

    pub fn integer() -> Self {
        Self::new(FieldKind::Integer)
    }

    pub fn float() -> Self {
        Self::new(FieldKind::Float)
    }

    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    pub fn string() -> Self {
        Self::new(FieldKind::String)
    }

    pub fn text() -> Self {
        Self::new(FieldKind::Text)
    }

    pub fn url() -> Self {
        Self::new(FieldKind::Url)
    }

    pub fn ip() -> Self {
        Self::new(FieldKind::Ip)
    }

    pub fn email() -> Self {
        Self::new(FieldKind::Email)
    }

    /// Marks this field as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks this field not-null: coercion of an absent value fails unless
    /// a default is configured.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Raw value substituted when the input is absent.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Storage-type hint for DDL composition (informational only).
    pub fn ddl(mut self, hint: impl Into<String>) -> Self {
        self.ddl = Some(hint.into());
        self
    }

    /// Closed `[min, max]` constraint. Checked for `min <= max` when the
    /// owning schema is built, not here.
    pub fn range(mut self, min: i64, max: i64) -> Self {
        self.range = Some(ValueRange { min, max });
        self
    }

    /// Explicit column name, overriding the schema declaration key.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The column name. Empty until the owning schema assigns it from the
    /// declaration key (unless set with [`Field::named`]).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn value_range(&self) -> Option<ValueRange> {
        self.range
    }

    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub(crate) fn ddl_hint(&self) -> Option<&str> {
        self.ddl.as_deref()
    }

    /// Coerces untyped textual input into the canonical value for this
    /// field.
    ///
    /// Absent/empty input falls back to the configured default; if the
    /// field is required and no value remains, coercion fails. Optional
    /// fields with no value coerce to the empty string.
    pub fn coerce(&self, raw: Option<&str>) -> FieldResult<String> {
        let raw = raw.unwrap_or("");
        let value = if raw.is_empty() {
            match &self.default {
                Some(default) => default.clone(),
                None if self.required => {
                    return Err(FieldError::MissingValue {
                        field: self.name.clone(),
                    })
                }
                None => return Ok(String::new()),
            }
        } else {
            raw.to_string()
        };

        match self.kind {
            FieldKind::Integer => self.coerce_integer(&value),
            // Passthrough kinds: no coercion in the current design.
            FieldKind::Float | FieldKind::Boolean | FieldKind::Text => Ok(value),
            FieldKind::String => self.coerce_string(value),
            FieldKind::Url => self.coerce_pattern(value, url_pattern(), "url"),
            FieldKind::Ip => self.coerce_pattern(value, ip_pattern(), "IP"),
            FieldKind::Email => self.coerce_pattern(value, email_pattern(), "email"),
        }
    }

    fn coerce_integer(&self, value: &str) -> FieldResult<String> {
        let parsed: i64 = value.parse().map_err(|_| FieldError::TypeMismatch {
            kind: self.kind.type_name(),
            value: value.to_string(),
        })?;
        if let Some(range) = self.range {
            if !range.contains(parsed) {
                return Err(FieldError::OutOfRange {
                    kind: self.kind.type_name(),
                    value: value.to_string(),
                });
            }
        }
        Ok(parsed.to_string())
    }

    /// Length bounds are measured on the escaped text, so a value that only
    /// fits its column before quote-doubling is rejected here rather than
    /// truncated by storage.
    fn coerce_string(&self, value: String) -> FieldResult<String> {
        if let Some(range) = self.range {
            let escaped_len = sql::escape(&value).chars().count() as i64;
            if !range.contains(escaped_len) {
                return Err(FieldError::LengthOutOfRange { value });
            }
        }
        Ok(value)
    }

    fn coerce_pattern(
        &self,
        value: String,
        pattern: &Regex,
        kind: &'static str,
    ) -> FieldResult<String> {
        let matched = pattern
            .captures(&value)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(FieldError::PatternMismatch { kind, value })?;
        if let Some(range) = self.range {
            if !range.contains(matched.chars().count() as i64) {
                return Err(FieldError::LengthOutOfRange { value: matched });
            }
        }
        Ok(matched)
    }
}

/// Optional scheme, dotted host, optional port, optional path. The capture
/// is everything after the scheme.
fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:https?://)?((?:[-0-9A-Za-z_]+\.)+[-0-9A-Za-z_]+(?::\d+)?(?:/\S*)?)")
            .expect("url pattern is valid")
    })
}

/// Four dot-separated octets in 0-255, optional trailing port.
fn ip_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^((?:(?:2[0-4]\d|25[0-5]|[01]?\d\d?)\.){3}(?:2[0-4]\d|25[0-5]|[01]?\d\d?)(?::\d+)?)$",
        )
        .expect("ip pattern is valid")
    })
}

/// Restricted local-part @ dotted domain.
fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([-0-9A-Za-z_!=:.%+]+@(?:[-0-9A-Za-z_!=:]+\.)+[-0-9A-Za-z_!=:]+)$")
            .expect("email pattern is valid")
    })
}
