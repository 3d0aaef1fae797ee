//! Bounded in-memory cache for dimension rows.
//!
//! [`BoundedCache`] is a size-bounded key to value map with least-recently-used
//! eviction and optional time-based expiry. It is safe to share between
//! threads and tasks without external locking: every operation takes a short
//! internal lock and never awaits or performs I/O while holding it.
//!
//! # Eviction
//!
//! Each successful `get` and every `put` marks the entry as most recently
//! used. When a `put` pushes the entry count above `max_size`, the least
//! recently used entry is removed before `put` returns, so `len() <= max_size`
//! holds after every call. A `max_size` of zero disables caching entirely.
//!
//! # Expiry
//!
//! With a TTL configured, an entry whose age (measured from its last `put`)
//! has reached the TTL is never returned. Expired entries are dropped lazily
//! when touched by `get`, or in bulk by [`BoundedCache::purge_expired`].
//!
//! Time is read from [`tokio::time::Instant`], so tests running on a paused
//! tokio clock can advance it deterministically.

mod lru;
mod stats;

pub use stats::CacheStats;

use lru::LruList;
use stats::StatsRecorder;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Cache sizing and expiry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries. Zero disables caching.
    pub max_size: usize,
    /// Maximum entry age. `None` keeps entries until evicted.
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 10_000,
            ttl: Some(Duration::from_millis(300_000)),
        }
    }
}

/// A concurrency-safe, size-bounded LRU cache with optional TTL.
pub struct BoundedCache<K, V> {
    config: CacheConfig,
    entries: Mutex<LruList<K, V>>,
    stats: StatsRecorder,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(LruList::with_capacity(config.max_size.min(1024))),
            stats: StatsRecorder::default(),
        }
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self::new(CacheConfig { max_size, ttl: None })
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Returns a copy of the cached value, or `None` on a miss or if the
    /// entry has expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.lock();

        let Some(inserted_at) = entries.inserted_at(key) else {
            drop(entries);
            self.stats.miss();
            return None;
        };

        if self.is_expired(inserted_at, now) {
            entries.remove(key);
            drop(entries);
            self.stats.expired(1);
            self.stats.miss();
            return None;
        }

        let value = entries.touch(key).cloned();
        drop(entries);
        self.stats.hit();
        value
    }

    /// Inserts or replaces `key`, resetting its age. Evicts the least recently
    /// used entry if the cache grew past `max_size`.
    pub fn put(&self, key: K, value: V) {
        if self.config.max_size == 0 {
            return;
        }

        let now = Instant::now();
        let mut entries = self.lock();
        entries.insert(key, value, now);

        let mut evicted = 0;
        while entries.len() > self.config.max_size {
            if entries.pop_lru().is_none() {
                break;
            }
            evicted += 1;
        }
        drop(entries);

        self.stats.inserted();
        if evicted > 0 {
            debug!("Evicted {} cache entr(ies) over max size {}", evicted, self.config.max_size);
            self.stats.evicted(evicted);
        }
    }

    /// Removes `key`, returning its value if present.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.lock().remove(key)
    }

    /// Returns true if `key` is present and not expired. Does not touch
    /// recency or the hit/miss counters.
    pub fn contains(&self, key: &K) -> bool {
        let now = Instant::now();
        self.lock()
            .inserted_at(key)
            .is_some_and(|at| !self.is_expired(at, now))
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let Some(ttl) = self.config.ttl else {
            return 0;
        };
        let now = Instant::now();
        let removed = self
            .lock()
            .retain(|inserted_at| now.saturating_duration_since(inserted_at) < ttl);
        self.stats.expired(removed as u64);
        removed
    }

    /// Removes all entries and returns how many were present.
    pub fn clear(&self) -> usize {
        let mut entries = self.lock();
        let removed = entries.len();
        entries.clear();
        removed
    }

    /// Number of physically present entries, expired ones included until
    /// they are touched or purged.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    fn is_expired(&self, inserted_at: Instant, now: Instant) -> bool {
        self.config
            .ttl
            .is_some_and(|ttl| now.saturating_duration_since(inserted_at) >= ttl)
    }

    fn lock(&self) -> MutexGuard<'_, LruList<K, V>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, V> std::fmt::Debug for BoundedCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedCache")
            .field("config", &self.config)
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}
