//! The lookup function: cache first, store on miss.
//!
//! Lifecycle is encoded in types. [`LookupFunction`] is a validated but
//! unopened table; opening consumes it and yields an [`OpenLookup`], the only
//! type that can perform lookups; closing consumes the [`OpenLookup`].

use crate::config::LookupConfig;
use crate::convert::convert;
use crate::error::{ConfigResult, LookupError};
use dimjoin_cache::{BoundedCache, CacheStats};
use dimjoin_store::{DynamoDbStore, FetchError, ItemStore, RetryingStore, item_key};
use dimjoin_types::{FieldType, FieldValue, KeyValue, LookupKey, Row, Schema};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// A configured lookup table that has not been opened yet.
#[derive(Debug, Clone)]
pub struct LookupFunction {
    config: LookupConfig,
    schema: Arc<Schema>,
}

impl LookupFunction {
    /// Validates `config`. Fails on missing table or region, or on key
    /// fields that are not part of the output schema.
    pub fn new(config: LookupConfig) -> ConfigResult<Self> {
        let schema = config.validate()?;
        Ok(Self {
            config,
            schema: Arc::new(schema),
        })
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Opens the function on an injected store handle with an empty cache.
    pub fn open(self, store: Arc<dyn ItemStore>) -> OpenLookup {
        let cancel = CancellationToken::new();
        let client = RetryingStore::with_cancellation(
            store,
            self.config.table_name.clone(),
            self.config.retry_policy(),
            cancel.clone(),
        );

        info!(
            "{} lookup function opened. Table: {}, Region: {}",
            client.inner().provider_name(),
            self.config.table_name,
            self.config.region
        );

        OpenLookup {
            cache: BoundedCache::new(self.config.cache_config()),
            config: self.config,
            schema: self.schema,
            client,
            cancel,
        }
    }

    /// Connects to DynamoDB using the configured region and endpoint, then
    /// opens the function on that client.
    pub async fn open_dynamodb(self) -> OpenLookup {
        let store = DynamoDbStore::connect(&self.config.dynamodb_config()).await;
        self.open(Arc::new(store))
    }

    /// Closing a function that was never opened releases nothing.
    pub fn close(self) {
        debug!("Lookup function for table {} closed before open", self.config.table_name);
    }
}

/// An open lookup table. Share it between workers behind an `Arc`.
pub struct OpenLookup {
    config: LookupConfig,
    schema: Arc<Schema>,
    client: RetryingStore,
    cache: BoundedCache<LookupKey, Row>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for OpenLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenLookup")
            .field("table", &self.config.table_name)
            .field("region", &self.config.region)
            .field("cache", &self.cache)
            .finish()
    }
}

impl OpenLookup {
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Looks up the row for the given key field values (schema key order).
    ///
    /// Returns `None` when there is no match, when the key is malformed, and
    /// when the store could not be reached after all retries. Failures are
    /// logged, never raised.
    pub async fn lookup(&self, key: &[FieldValue]) -> Option<Row> {
        Self::degrade(&self.config.table_name, self.try_lookup(key).await)
    }

    /// Like [`lookup`](Self::lookup), with retry backoff interrupted once
    /// `cancel` fires. Other lookups keep their full retry budget.
    pub async fn lookup_with(&self, key: &[FieldValue], cancel: &CancellationToken) -> Option<Row> {
        Self::degrade(
            &self.config.table_name,
            self.try_lookup_with(key, cancel).await,
        )
    }

    /// Like [`lookup`](Self::lookup), for an already-built key.
    pub async fn lookup_key(&self, key: &LookupKey) -> Option<Row> {
        Self::degrade(&self.config.table_name, self.try_lookup_key(key).await)
    }

    /// Looks up the row for the given key field values, reporting failures.
    pub async fn try_lookup(&self, key: &[FieldValue]) -> Result<Option<Row>, LookupError> {
        let key = self.build_key(key)?;
        self.resolve(&key, None).await
    }

    /// Like [`try_lookup`](Self::try_lookup), cancellable per call.
    pub async fn try_lookup_with(
        &self,
        key: &[FieldValue],
        cancel: &CancellationToken,
    ) -> Result<Option<Row>, LookupError> {
        let key = self.build_key(key)?;
        self.resolve(&key, Some(cancel)).await
    }

    /// Looks up the row for `key`, reporting failures.
    pub async fn try_lookup_key(&self, key: &LookupKey) -> Result<Option<Row>, LookupError> {
        self.resolve(key, None).await
    }

    /// Found rows are cached. "Not found" answers are not, since the table
    /// may gain the key later.
    async fn resolve(
        &self,
        key: &LookupKey,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<Row>, LookupError> {
        self.check_key(key)?;

        if let Some(row) = self.cache.get(key) {
            debug!("Cache hit for key {}", key);
            return Ok(Some(row));
        }
        debug!("Cache miss for key {}", key);

        let store_key = item_key(self.schema.key_names(), key);
        let item = match cancel {
            Some(cancel) => self.client.fetch_with(&store_key, cancel).await?,
            None => self.client.fetch(&store_key).await?,
        };

        match item {
            Some(item) if !item.is_empty() => {
                let row = convert(&item, &self.schema);
                self.cache.put(key.clone(), row.clone());
                Ok(Some(row))
            }
            _ => {
                debug!("No item for key {} in table {}", key, self.config.table_name);
                Ok(None)
            }
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Shutdown signal for this function. Cancelling it interrupts the
    /// backoff of every lookup in flight and of every later lookup. Use
    /// [`lookup_with`](Self::lookup_with) to cancel a single lookup.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Releases the store handle and clears the cache. Returns the number of
    /// cached rows dropped.
    pub fn close(self) -> usize {
        self.cancel.cancel();
        let cleared = self.cache.clear();
        info!(
            "Lookup function closed. Table: {}, cleared {} cached row(s), cache stats: {:?}",
            self.config.table_name,
            cleared,
            self.cache.stats()
        );
        cleared
    }

    fn build_key(&self, values: &[FieldValue]) -> Result<LookupKey, LookupError> {
        LookupKey::from_values(&self.schema, values).map_err(LookupError::MalformedKey)
    }

    fn check_key(&self, key: &LookupKey) -> Result<(), LookupError> {
        if key.len() != self.schema.key_names().len() {
            return Err(LookupError::MalformedKey(format!(
                "expected {} key part(s), got {}",
                self.schema.key_names().len(),
                key.len()
            )));
        }

        for ((name, ty), part) in self
            .schema
            .key_names()
            .iter()
            .zip(self.schema.key_types())
            .zip(key.parts())
        {
            let fits = match (ty, part) {
                (FieldType::String, KeyValue::String(s)) => !s.is_empty(),
                (FieldType::Double, KeyValue::Number(n)) => !n.is_empty(),
                _ => false,
            };
            if !fits {
                return Err(LookupError::MalformedKey(format!(
                    "key field '{name}' expects a non-empty {ty} value, got {part:?}"
                )));
            }
        }
        Ok(())
    }

    fn degrade(table: &str, result: Result<Option<Row>, LookupError>) -> Option<Row> {
        match result {
            Ok(row) => row,
            Err(LookupError::MalformedKey(reason)) => {
                warn!("Skipping lookup on table {}: {}", table, reason);
                None
            }
            Err(LookupError::Fetch(FetchError::Cancelled)) => {
                warn!("Lookup on table {} cancelled", table);
                None
            }
            Err(e) => {
                error!("Error querying table {}: {}", table, e);
                None
            }
        }
    }
}
