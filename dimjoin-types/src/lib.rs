//! Core type definitions for dimjoin.
//!
//! This crate defines the plain data model shared by the cache, the store
//! clients and the lookup function:
//! - Store attribute values and raw items as returned by a point lookup
//! - Typed output rows and their field values
//! - Lookup keys derived from the join columns of an incoming record
//! - The output schema (ordered fields plus designated key fields)
//!
//! Nothing here performs I/O.

mod attribute;
mod key;
mod row;
mod schema;

pub use attribute::{AttributeValue, Item};
pub use key::{KeyValue, LookupKey};
pub use row::{FieldType, FieldValue, Row};
pub use schema::{FieldSpec, Schema};

/// Result type for schema construction.
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// Errors raised while resolving an output schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("schema declares no fields")]
    NoFields,

    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),

    #[error("schema declares no key fields")]
    NoKeyFields,

    #[error("key field '{0}' not found in table schema")]
    UnknownKeyField(String),

    #[error("key field '{name}' has type {ty}, which cannot be used as a store key")]
    UnsupportedKeyType { name: String, ty: FieldType },
}
