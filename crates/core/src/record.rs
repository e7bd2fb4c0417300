//! Schema-agnostic record model.
//!
//! The set of columns is whatever the backing file's header declares, so a
//! record is an ordered map from column name to a tagged scalar rather than a
//! fixed struct. Only the `id` column is treated specially.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::{RecordId, ID_COLUMN};

/// A single cell value.
///
/// Serializes as the plain JSON scalar (`null`, `true`, `42`, `1.5`, `"text"`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Convert a JSON value from a request body into a cell value.
    ///
    /// Arrays and objects have no CSV representation and are rejected.
    pub fn from_json(column: &str, value: &serde_json::Value) -> Result<Self, CoreError> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(FieldValue::Null),
            Value::Bool(b) => Ok(FieldValue::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(FieldValue::Int(i)),
                None => n.as_f64().map(FieldValue::Float).ok_or_else(|| {
                    CoreError::Validation(format!("'{column}' is not a representable number"))
                }),
            },
            Value::String(s) => Ok(FieldValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => Err(CoreError::Validation(format!(
                "'{column}' must be a string, number, boolean or null"
            ))),
        }
    }

    /// Integer view of the value, used for `id` comparisons.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

/// Formats the value the way it is written into a CSV cell.
///
/// `Null` is the empty string. Whole floats keep a trailing `.0` so the
/// column is still read back as floating point.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            FieldValue::Float(x) => write!(f, "{x}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

/// Column name to value, in column order.
pub type FieldMap = IndexMap<String, FieldValue>;

/// A JSON object from a request body: column name to raw JSON value.
pub type JsonFields = serde_json::Map<String, serde_json::Value>;

/// One row of the table.
///
/// Serializes as a flat JSON object whose keys follow the header order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: FieldMap,
}

impl Record {
    pub fn new(fields: FieldMap) -> Self {
        Self { fields }
    }

    /// The record's `id`, if the column is present and holds an integer.
    pub fn id(&self) -> Option<RecordId> {
        self.fields.get(ID_COLUMN).and_then(FieldValue::as_i64)
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }

    /// Overwrite an existing column. Returns `false` (and changes nothing)
    /// when the record has no such column.
    pub fn set(&mut self, column: &str, value: FieldValue) -> bool {
        match self.fields.get_mut(column) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Merge a partial update onto this record.
    ///
    /// Keys the record has no column for are ignored without being looked
    /// at, and so is `id`. Values are converted before anything is written,
    /// so a rejected value leaves the record unchanged.
    /// Returns the number of columns that were overwritten.
    pub fn merge(&mut self, partial: &JsonFields) -> Result<usize, CoreError> {
        let mut changes = Vec::new();
        for (column, value) in partial {
            if column == ID_COLUMN || !self.fields.contains_key(column) {
                continue;
            }
            changes.push((column, FieldValue::from_json(column, value)?));
        }

        let count = changes.len();
        for (column, value) in changes {
            self.set(column, value);
        }
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
