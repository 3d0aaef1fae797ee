//! Lookup keys.

use crate::{FieldType, FieldValue, Schema};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One component of a lookup key, in the store's native key representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyValue {
    String(String),
    /// Decimal text.
    Number(String),
}

impl KeyValue {
    pub fn as_str(&self) -> &str {
        match self {
            Self::String(s) | Self::Number(s) => s,
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable join key: one value per key field of the schema, in key order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupKey(Vec<KeyValue>);

impl LookupKey {
    #[must_use]
    pub fn new(parts: Vec<KeyValue>) -> Self {
        Self(parts)
    }

    /// Single string key, the common case.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self(vec![KeyValue::String(value.into())])
    }

    pub fn parts(&self) -> &[KeyValue] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builds a key from the join column values of an incoming record.
    ///
    /// `values` holds one value per key field, in the schema's key order.
    /// Rejects wrong arity, nulls, empty strings and non-finite numbers, and
    /// values whose type does not match the declared key field type.
    pub fn from_values(schema: &Schema, values: &[FieldValue]) -> Result<Self, String> {
        if values.len() != schema.key_names().len() {
            return Err(format!(
                "expected {} key value(s), got {}",
                schema.key_names().len(),
                values.len()
            ));
        }

        let mut parts = Vec::with_capacity(values.len());
        for ((name, ty), value) in schema.key_names().iter().zip(schema.key_types()).zip(values) {
            let part = match (ty, value) {
                (_, FieldValue::Null) => return Err(format!("key field '{name}' is null")),
                (FieldType::String, FieldValue::String(s)) if s.is_empty() => {
                    return Err(format!("key field '{name}' is empty"));
                }
                (FieldType::String, FieldValue::String(s)) => KeyValue::String(s.clone()),
                (FieldType::Double, FieldValue::Double(d)) if !d.is_finite() => {
                    return Err(format!("key field '{name}' is not a finite number"));
                }
                (FieldType::Double, FieldValue::Double(d)) => KeyValue::Number(d.to_string()),
                (ty, other) => {
                    return Err(format!(
                        "key field '{name}' expects {ty}, got {other:?}"
                    ));
                }
            };
            parts.push(part);
        }

        Ok(Self(parts))
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl From<&str> for LookupKey {
    fn from(value: &str) -> Self {
        Self::string(value)
    }
}
