//! Loosely-typed store values.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One attribute value as reported by the remote store.
///
/// Numbers keep the store's decimal text so no precision is lost before the
/// value reaches the converter. Anything the lookup path does not understand
/// (sets, lists, maps, binary, explicit nulls) travels as `Other` holding a
/// printable form of the original value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeValue {
    String(String),
    Number(String),
    Boolean(bool),
    Other(String),
}

impl AttributeValue {
    /// Builds an attribute from a JSON value.
    ///
    /// Strings, numbers and booleans map to their own variants. Everything
    /// else is kept as `Other` with its JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::String(s.clone()),
            serde_json::Value::Number(n) => Self::Number(n.to_string()),
            serde_json::Value::Bool(b) => Self::Boolean(*b),
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the name of the populated variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::Other(_) => "other",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) | Self::Number(s) | Self::Other(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// A raw item: field name to attribute value. Field order is irrelevant.
pub type Item = HashMap<String, AttributeValue>;
