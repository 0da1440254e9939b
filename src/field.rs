//! Dotted field paths into row records
//!
//! A path is either `field` or `field.subfield`. Anything absent along the
//! way resolves to the [`SENTINEL`] so every exported cell has a value.

use crate::error::{SheetIoError, SheetIoResult};
use crate::types::Row;
use serde_json::Value;
use std::fmt;

/// Placeholder written for data that is absent from a row
pub const SENTINEL: &str = "-";

/// A parsed `field` or `field.subfield` path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPath {
    Field(String),
    Nested(String, String),
}

impl FieldPath {
    /// Parse a dotted path. Empty segments and more than two levels are rejected.
    pub fn parse(path: &str) -> SheetIoResult<Self> {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(SheetIoError::InvalidFieldPath(path.to_string()));
        }
        match segments.as_slice() {
            [field] => Ok(FieldPath::Field(field.to_string())),
            [parent, child] => Ok(FieldPath::Nested(parent.to_string(), child.to_string())),
            _ => Err(SheetIoError::InvalidFieldPath(path.to_string())),
        }
    }

    /// Look the path up in a row, returning the sentinel when anything is missing
    pub fn resolve(&self, row: &Row) -> String {
        self.lookup(row)
            .map(render_value)
            .unwrap_or_else(|| SENTINEL.to_string())
    }

    fn lookup<'a>(&self, row: &'a Row) -> Option<&'a Value> {
        let value = match self {
            FieldPath::Field(field) => row.get(field)?,
            FieldPath::Nested(parent, child) => row.get(parent)?.as_object()?.get(child)?,
        };
        // null counts as absent, the same as a missing key
        (!value.is_null()).then_some(value)
    }

    /// Store a value at this path, creating the parent object when needed
    pub fn assign(&self, row: &mut Row, value: Value) {
        match self {
            FieldPath::Field(field) => {
                row.insert(field.clone(), value);
            }
            FieldPath::Nested(parent, child) => {
                let slot = row
                    .entry(parent.clone())
                    .or_insert_with(|| Value::Object(Row::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Row::new());
                }
                if let Value::Object(map) = slot {
                    map.insert(child.clone(), value);
                }
            }
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Field(field) => write!(f, "{}", field),
            FieldPath::Nested(parent, child) => write!(f, "{}.{}", parent, child),
        }
    }
}

/// Render a JSON scalar as cell text
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Null => SENTINEL.to_string(),
        other => other.to_string(),
    }
}
