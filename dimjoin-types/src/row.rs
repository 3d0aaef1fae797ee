//! Typed output rows.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared type of an output field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Double,
    Boolean,
}

impl FieldType {
    /// Returns true if `value` may occupy a slot of this type.
    /// Null fits every type.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (_, FieldValue::Null)
                | (Self::String, FieldValue::String(_))
                | (Self::Double, FieldValue::Double(_))
                | (Self::Boolean, FieldValue::Boolean(_))
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "STRING",
            Self::Double => "DOUBLE",
            Self::Boolean => "BOOLEAN",
        };
        f.write_str(name)
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STRING" | "VARCHAR" => Ok(Self::String),
            "DOUBLE" => Ok(Self::Double),
            "BOOLEAN" | "BOOL" => Ok(Self::Boolean),
            other => Err(format!("unsupported field type: {other}")),
        }
    }
}

/// One slot of a [`Row`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    String(String),
    Double(f64),
    Boolean(bool),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for FieldValue {
    fn from(d: f64) -> Self {
        Self::Double(d)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A fixed-length, fixed-order row matching a [`Schema`](crate::Schema).
///
/// Rows are plain values: cloning a row never aliases another row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Vec<FieldValue>);

impl Row {
    #[must_use]
    pub fn new(values: Vec<FieldValue>) -> Self {
        Self(values)
    }

    /// A row of `arity` null slots.
    #[must_use]
    pub fn nulls(arity: usize) -> Self {
        Self(vec![FieldValue::Null; arity])
    }

    pub fn arity(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<&FieldValue> {
        self.0.get(index)
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldValue> {
        self.0.iter()
    }

    pub fn into_values(self) -> Vec<FieldValue> {
        self.0
    }
}

impl From<Vec<FieldValue>> for Row {
    fn from(values: Vec<FieldValue>) -> Self {
        Self(values)
    }
}

impl FromIterator<FieldValue> for Row {
    fn from_iter<I: IntoIterator<Item = FieldValue>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
