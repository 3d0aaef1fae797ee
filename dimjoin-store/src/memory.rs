//! In-process item store.
//!
//! Tables must be declared with their key attributes before use, the same way
//! a remote table has a fixed primary key. Key values compare by their text,
//! so `"42"` and `"42.0"` are different numeric keys here.

use crate::error::{StoreError, StoreResult};
use crate::store::ItemStore;
use async_trait::async_trait;
use dimjoin_types::{AttributeValue, Item, KeyValue};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

struct Table {
    key_names: Vec<String>,
    items: HashMap<Vec<KeyValue>, Item>,
}

/// An [`ItemStore`] held entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `table` with the given key attributes. Existing items of a
    /// previously declared table with the same name are dropped.
    pub async fn create_table(&self, table: &str, key_names: &[&str]) {
        let table_def = Table {
            key_names: key_names.iter().map(|k| k.to_string()).collect(),
            items: HashMap::new(),
        };
        self.tables.write().await.insert(table.to_string(), table_def);
    }

    /// Number of items stored in `table`, or `None` if it does not exist.
    pub async fn item_count(&self, table: &str) -> Option<usize> {
        self.tables.read().await.get(table).map(|t| t.items.len())
    }

    fn key_of(key_names: &[String], item: &Item) -> StoreResult<Vec<KeyValue>> {
        key_names
            .iter()
            .map(|name| match item.get(name) {
                Some(AttributeValue::String(s)) => Ok(KeyValue::String(s.clone())),
                Some(AttributeValue::Number(n)) => Ok(KeyValue::Number(n.clone())),
                Some(other) => Err(StoreError::InvalidItem(format!(
                    "key attribute '{name}' has unsupported type {}",
                    other.kind()
                ))),
                None => Err(StoreError::InvalidItem(format!(
                    "missing key attribute '{name}'"
                ))),
            })
            .collect()
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    fn provider_name(&self) -> &'static str {
        "memory"
    }

    async fn get_item(&self, table: &str, key: &[(String, KeyValue)]) -> StoreResult<Option<Item>> {
        let tables = self.tables.read().await;
        let table_def = tables
            .get(table)
            .ok_or_else(|| StoreError::Request(format!("table not found: {table}")))?;

        if key.len() != table_def.key_names.len()
            || key
                .iter()
                .zip(&table_def.key_names)
                .any(|((name, _), expected)| name != expected)
        {
            return Err(StoreError::InvalidItem(format!(
                "key does not match table key schema {:?}",
                table_def.key_names
            )));
        }

        let values: Vec<KeyValue> = key.iter().map(|(_, v)| v.clone()).collect();
        Ok(table_def.items.get(&values).cloned())
    }

    async fn put_item(&self, table: &str, item: Item) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let table_def = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::Request(format!("table not found: {table}")))?;

        let key = Self::key_of(&table_def.key_names, &item)?;
        debug!("Stored item {:?} in memory table {}", key, table);
        table_def.items.insert(key, item);
        Ok(())
    }
}
