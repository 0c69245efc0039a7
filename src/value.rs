//! Cell values and rows
//!
//! Rows are supplied already materialized by callers. `Value::Missing` and
//! `Value::Empty` are dedicated sentinels, never strings, so they cannot
//! collide with real data.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{ReportError, Result};

/// Display text of the `Missing` sentinel
pub const MISSING: &str = "MISSING";
/// Display text of the `Empty` sentinel
pub const EMPTY: &str = "EMPTY";

/// Largest integer an f64 holds exactly
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    /// No data for this column in this row
    Missing,
    /// Field present but blank
    Empty,
}

/// Coarse value kinds; values of different kinds have no mutual ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueKind {
    String,
    Number,
    Boolean,
    Null,
    Missing,
    Empty,
}

impl Value {
    /// Numeric view of the value. Only numbers are numeric; a string that
    /// happens to hold digits is still a string.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub(crate) fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Number(_) => ValueKind::Number,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Null => ValueKind::Null,
            Value::Missing => ValueKind::Missing,
            Value::Empty => ValueKind::Empty,
        }
    }

    /// Substitute the `Empty` sentinel for blank strings.
    pub(crate) fn normalized(self) -> Value {
        match self {
            Value::String(s) if s.trim().is_empty() => Value::Empty,
            other => other,
        }
    }

    /// Convert a JSON scalar. Nested arrays and objects are kept as their
    /// compact JSON text. Integers too large for an f64 to hold exactly are
    /// kept as their digits, so they print unchanged but are not numeric.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => {
                let exact = match (n.as_i64(), n.as_u64()) {
                    (Some(i), _) => i.unsigned_abs() <= MAX_EXACT_INT as u64,
                    (None, Some(u)) => u <= MAX_EXACT_INT as u64,
                    (None, None) => true,
                };
                match n.as_f64() {
                    Some(f) if exact => Value::Number(f),
                    _ => Value::String(n.to_string()),
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            other => Value::String(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
            Value::Missing => write!(f, "{}", MISSING),
            Value::Empty => write!(f, "{}", EMPTY),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INT => {
                serializer.serialize_i64(*n as i64)
            }
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Null => serializer.serialize_unit(),
            Value::Missing => serializer.serialize_str(MISSING),
            Value::Empty => serializer.serialize_str(EMPTY),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Missing)
    }
}

/// An ordered mapping from column name to value
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row over a shared column list
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(ReportError::ShapeMismatch(format!(
                "expected {} values, got {}",
                columns.len(),
                values.len()
            )));
        }
        Ok(Self { columns, values })
    }

    /// Build a standalone row from (column, value) pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (columns, values): (Vec<String>, Vec<Value>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            columns: columns.into(),
            values,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keep only the columns at `indices`, in that order.
    pub(crate) fn project(&self, columns: &Arc<[String]>, indices: &[usize]) -> Row {
        Row {
            columns: Arc::clone(columns),
            values: indices.iter().map(|&i| self.values[i].clone()).collect(),
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// A row as handed to a Report, before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum RowData {
    /// One value per heading, in heading order
    Positional(Vec<Value>),
    /// Values keyed by heading; extra keys are ignored
    Keyed(HashMap<String, Value>),
}

impl From<Vec<Value>> for RowData {
    fn from(values: Vec<Value>) -> Self {
        RowData::Positional(values)
    }
}

impl<V: Into<Value>, const N: usize> From<[V; N]> for RowData {
    fn from(values: [V; N]) -> Self {
        RowData::Positional(values.into_iter().map(Into::into).collect())
    }
}

impl From<HashMap<String, Value>> for RowData {
    fn from(map: HashMap<String, Value>) -> Self {
        RowData::Keyed(map)
    }
}

impl From<Vec<(String, Value)>> for RowData {
    fn from(pairs: Vec<(String, Value)>) -> Self {
        RowData::Keyed(pairs.into_iter().collect())
    }
}

impl From<Row> for RowData {
    fn from(row: Row) -> Self {
        RowData::Keyed(
            row.iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }
}
