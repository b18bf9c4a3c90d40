//! Field access over raw listing documents.
//!
//! Raw listings arrive as semi-structured JSON documents. This module gives
//! the flattener two lookup modes with distinct failure semantics:
//!
//! - **required**: absence of the path is a record-level integrity error
//!   ([`ProcessingError::MissingField`]).
//! - **optional**: absence (or an explicit null) yields `None`.
//!
//! In both modes a value that is present but cannot be read as the expected
//! scalar shape is a [`ProcessingError::MalformedField`]: "malformed but
//! present" stays distinct from "absent".

use crate::error::{ProcessingError, Result};
use serde_json::Value;

/// Read-only accessor over one raw listing document.
pub struct Document<'a> {
    inner: &'a Value,
}

impl<'a> Document<'a> {
    pub fn new(record: &'a Value) -> Self {
        Self { inner: record }
    }

    /// Strict lookup of a dotted path. Absence or a null value is a
    /// missing-field error.
    pub fn required(&self, path: &str) -> Result<&'a Value> {
        match lookup(self.inner, path) {
            Some(Value::Null) | None => Err(ProcessingError::MissingField(path.to_string())),
            Some(value) => Ok(value),
        }
    }

    /// Permissive lookup of a dotted path. Absence and null both map to `None`.
    pub fn optional(&self, path: &str) -> Option<&'a Value> {
        match lookup(self.inner, path) {
            Some(Value::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    pub fn required_text(&self, path: &str) -> Result<String> {
        as_text(self.required(path)?, path)
    }

    pub fn optional_text(&self, path: &str) -> Result<Option<String>> {
        self.optional(path).map(|v| as_text(v, path)).transpose()
    }

    pub fn required_i64(&self, path: &str) -> Result<i64> {
        as_i64(self.required(path)?, path)
    }

    pub fn optional_i64(&self, path: &str) -> Result<Option<i64>> {
        self.optional(path).map(|v| as_i64(v, path)).transpose()
    }

    pub fn required_f64(&self, path: &str) -> Result<f64> {
        as_f64(self.required(path)?, path)
    }

    pub fn optional_f64(&self, path: &str) -> Result<Option<f64>> {
        self.optional(path).map(|v| as_f64(v, path)).transpose()
    }

    pub fn required_bool(&self, path: &str) -> Result<bool> {
        match self.required(path)? {
            Value::Bool(b) => Ok(*b),
            other => Err(malformed(path, format!("expected boolean, got {other}"))),
        }
    }

    pub fn required_array(&self, path: &str) -> Result<&'a [Value]> {
        match self.required(path)? {
            Value::Array(items) => Ok(items.as_slice()),
            other => Err(malformed(path, format!("expected array, got {other}"))),
        }
    }
}

fn lookup<'v>(root: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(root, |value, segment| value.get(segment))
}

fn malformed(field: &str, reason: impl Into<String>) -> ProcessingError {
    ProcessingError::MalformedField {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Read a value as display text. Numbers are rendered in their source form
/// (the table keeps mixed-representation numeric fields as text until the
/// preprocessor coerces them).
pub fn as_text(value: &Value, field: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(malformed(field, format!("expected text, got {other}"))),
    }
}

/// Read a value as an integer. Integer-valued strings are accepted (the
/// source dataset stores night counts as strings); floats are truncated.
pub fn as_i64(value: &Value, field: &str) -> Result<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if let Some(f) = n.as_f64() {
                Ok(f.trunc() as i64)
            } else {
                Err(malformed(field, format!("integer out of range: {n}")))
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| malformed(field, format!("expected integer, got '{s}'"))),
        other => Err(malformed(field, format!("expected integer, got {other}"))),
    }
}

/// Read a value as a float. Numeric strings are accepted.
pub fn as_f64(value: &Value, field: &str) -> Result<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| malformed(field, format!("number out of range: {n}"))),
        Value::String(s) => crate::utils::parse_f64(s)
            .ok_or_else(|| malformed(field, format!("expected number, got '{s}'"))),
        other => Err(malformed(field, format!("expected number, got {other}"))),
    }
}
