//! Output schema resolution.

use crate::{FieldType, SchemaError, SchemaResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A declared output field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// The resolved output schema of a lookup table.
///
/// Built once at construction and immutable afterwards. Every key name is
/// guaranteed to be one of the field names, and key fields are guaranteed to
/// have a type the store can use as a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
    key_names: Vec<String>,
    key_indices: Vec<usize>,
}

impl Schema {
    /// Resolves a schema from ordered fields and the designated key names.
    pub fn new(fields: Vec<FieldSpec>, key_names: Vec<String>) -> SchemaResult<Self> {
        if fields.is_empty() {
            return Err(SchemaError::NoFields);
        }

        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }

        if key_names.is_empty() {
            return Err(SchemaError::NoKeyFields);
        }

        let mut key_indices = Vec::with_capacity(key_names.len());
        for key in &key_names {
            let index = fields
                .iter()
                .position(|f| &f.name == key)
                .ok_or_else(|| SchemaError::UnknownKeyField(key.clone()))?;
            let ty = fields[index].ty;
            if ty == FieldType::Boolean {
                return Err(SchemaError::UnsupportedKeyType {
                    name: key.clone(),
                    ty,
                });
            }
            key_indices.push(index);
        }

        Ok(Self {
            fields,
            key_names,
            key_indices,
        })
    }

    /// Number of output slots.
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn key_names(&self) -> &[String] {
        &self.key_names
    }

    /// Positions of the key fields within the output row, in key order.
    pub fn key_indices(&self) -> &[usize] {
        &self.key_indices
    }

    /// Declared types of the key fields, in key order.
    pub fn key_types(&self) -> impl Iterator<Item = FieldType> + '_ {
        self.key_indices.iter().map(|&i| self.fields[i].ty)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}
