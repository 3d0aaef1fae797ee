//! Shared test helpers for lookup tests.

#![allow(dead_code)]

use async_trait::async_trait;
use dimjoin_lookup::LookupConfig;
use dimjoin_store::{ItemStore, StoreError, StoreResult};
use dimjoin_types::{AttributeValue, FieldSpec, FieldType, Item, KeyValue};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// Store stub that counts `get_item` calls and can fail a fixed number of
/// times before answering from its item map.
#[derive(Default)]
pub struct CountingStore {
    items: Mutex<HashMap<String, Item>>,
    failures: AtomicU32,
    calls: AtomicU32,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `n` calls fail with a request error.
    pub fn fail_next(&self, n: u32) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub fn insert(&self, id: &str, item: Item) {
        self.items.lock().unwrap().insert(id.to_string(), item);
    }

    pub fn remove(&self, id: &str) {
        self.items.lock().unwrap().remove(id);
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItemStore for CountingStore {
    fn provider_name(&self) -> &'static str {
        "counting"
    }

    async fn get_item(&self, _table: &str, key: &[(String, KeyValue)]) -> StoreResult<Option<Item>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Request("service unavailable".to_string()));
        }
        let id = key[0].1.as_str();
        Ok(self.items.lock().unwrap().get(id).cloned())
    }

    async fn put_item(&self, _table: &str, _item: Item) -> StoreResult<()> {
        Ok(())
    }
}

pub fn product(id: &str, price: &str, active: bool) -> Item {
    Item::from([
        ("product_id".to_string(), AttributeValue::String(id.to_string())),
        ("price".to_string(), AttributeValue::Number(price.to_string())),
        ("active".to_string(), AttributeValue::Boolean(active)),
    ])
}

pub fn product_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("product_id", FieldType::String),
        FieldSpec::new("price", FieldType::Double),
        FieldSpec::new("active", FieldType::Boolean),
    ]
}

pub fn product_config() -> LookupConfig {
    LookupConfig::new(
        "products",
        "ap-southeast-1",
        product_fields(),
        vec!["product_id".to_string()],
    )
}
