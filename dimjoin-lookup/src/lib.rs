//! Cached dimension-table lookups for stream enrichment.
//!
//! For every incoming record key, an [`OpenLookup`] returns zero or one row
//! of the dimension table, served from an in-process LRU cache when possible
//! and from the remote store otherwise. Store failures are retried with
//! linear backoff and, once retries are exhausted, degrade to "no match" so
//! the enclosing stream keeps flowing.
//!
//! # Flow
//!
//! 1. Validate the key against the schema's key fields
//! 2. Cache hit: return the cached row
//! 3. Cache miss: fetch from the store (with retry)
//! 4. Convert the item to a row, cache it, return it
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use dimjoin_lookup::{LookupConfig, LookupFunction};
//! use dimjoin_store::{ItemStore, MemoryStore};
//! use dimjoin_types::{AttributeValue, FieldSpec, FieldType, FieldValue, Item};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! store.create_table("products", &["product_id"]).await;
//! store
//!     .put_item(
//!         "products",
//!         Item::from([
//!             ("product_id".to_string(), AttributeValue::String("p1".into())),
//!             ("price".to_string(), AttributeValue::Number("19.99".into())),
//!         ]),
//!     )
//!     .await?;
//!
//! let config = LookupConfig::new(
//!     "products",
//!     "ap-southeast-1",
//!     vec![
//!         FieldSpec::new("product_id", FieldType::String),
//!         FieldSpec::new("price", FieldType::Double),
//!     ],
//!     vec!["product_id".to_string()],
//! );
//!
//! let lookup = LookupFunction::new(config)?.open(store);
//! let row = lookup.lookup(&[FieldValue::from("p1")]).await.unwrap();
//! assert_eq!(row.get(1), Some(&FieldValue::Double(19.99)));
//! lookup.close();
//! # Ok(())
//! # }
//! ```

pub mod config;
mod convert;
mod error;
mod function;

pub use config::LookupConfig;
pub use convert::convert;
pub use error::{ConfigError, ConfigResult, LookupError};
pub use function::{LookupFunction, OpenLookup};
