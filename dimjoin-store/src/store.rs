//! Outbound store interface.

use crate::error::StoreResult;
use async_trait::async_trait;
use dimjoin_types::{Item, KeyValue, LookupKey};

/// Primary key of one item: attribute name and value per key attribute.
pub type ItemKey = Vec<(String, KeyValue)>;

/// Pairs key attribute names with the parts of a lookup key.
pub fn item_key(key_names: &[String], key: &LookupKey) -> ItemKey {
    key_names
        .iter()
        .cloned()
        .zip(key.parts().iter().cloned())
        .collect()
}

/// A remote key-value store supporting single-item point lookups.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Returns the name of the backend, for logs.
    fn provider_name(&self) -> &'static str;

    /// Fetches one item by primary key.
    ///
    /// `Ok(None)` means the store has no item for the key; it is not an error.
    async fn get_item(&self, table: &str, key: &[(String, KeyValue)]) -> StoreResult<Option<Item>>;

    /// Writes one item, replacing any item with the same primary key.
    async fn put_item(&self, table: &str, item: Item) -> StoreResult<()>;
}
