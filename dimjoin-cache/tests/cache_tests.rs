use dimjoin_cache::{BoundedCache, CacheConfig, CacheStats};
use std::sync::Arc;
use std::time::Duration;

fn cache(max_size: usize, ttl_ms: Option<u64>) -> BoundedCache<String, u32> {
    BoundedCache::new(CacheConfig {
        max_size,
        ttl: ttl_ms.map(Duration::from_millis),
    })
}

// ── Basic operations ────────────────────────────────────────────

#[test]
fn default_config() {
    let config = CacheConfig::default();
    assert_eq!(config.max_size, 10_000);
    assert_eq!(config.ttl, Some(Duration::from_secs(300)));
}

#[test]
fn get_returns_inserted_value() {
    let cache = cache(10, None);
    cache.put("p1".to_string(), 1);
    assert_eq!(cache.get(&"p1".to_string()), Some(1));
    assert_eq!(cache.get(&"p2".to_string()), None);
}

#[test]
fn put_replaces_existing_value() {
    let cache = cache(10, None);
    cache.put("p1".to_string(), 1);
    cache.put("p1".to_string(), 2);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&"p1".to_string()), Some(2));
}

#[test]
fn remove_and_clear() {
    let cache = cache(10, None);
    cache.put("a".to_string(), 1);
    cache.put("b".to_string(), 2);
    assert_eq!(cache.remove(&"a".to_string()), Some(1));
    assert_eq!(cache.remove(&"a".to_string()), None);
    assert_eq!(cache.clear(), 1);
    assert!(cache.is_empty());
    assert_eq!(cache.get(&"b".to_string()), None);
    assert_eq!(cache.clear(), 0);
}

#[test]
fn zero_max_size_disables_caching() {
    let cache = cache(0, None);
    cache.put("a".to_string(), 1);
    assert!(cache.is_empty());
    assert_eq!(cache.get(&"a".to_string()), None);
}

// ── Eviction ────────────────────────────────────────────────────

#[test]
fn put_over_capacity_evicts_exactly_one() {
    let cache = cache(3, None);
    for (i, key) in ["a", "b", "c"].iter().enumerate() {
        cache.put(key.to_string(), i as u32);
    }
    cache.put("d".to_string(), 3);
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn evicts_least_recently_used() {
    let cache = cache(3, None);
    cache.put("a".to_string(), 1);
    cache.put("b".to_string(), 2);
    cache.put("c".to_string(), 3);

    // Reading "a" makes "b" the oldest.
    assert_eq!(cache.get(&"a".to_string()), Some(1));
    cache.put("d".to_string(), 4);

    assert!(cache.contains(&"a".to_string()));
    assert!(!cache.contains(&"b".to_string()));
    assert!(cache.contains(&"c".to_string()));
    assert!(cache.contains(&"d".to_string()));
}

#[test]
fn replacing_refreshes_recency() {
    let cache = cache(2, None);
    cache.put("a".to_string(), 1);
    cache.put("b".to_string(), 2);
    cache.put("a".to_string(), 10);
    cache.put("c".to_string(), 3);
    assert_eq!(cache.get(&"a".to_string()), Some(10));
    assert_eq!(cache.get(&"b".to_string()), None);
}

#[test]
fn concurrent_inserts_respect_max_size() {
    let max_size = 100;
    let cache = Arc::new(BoundedCache::<String, usize>::with_max_size(max_size));

    std::thread::scope(|scope| {
        for t in 0..8 {
            let cache = Arc::clone(&cache);
            scope.spawn(move || {
                for i in 0..250 {
                    cache.put(format!("t{t}-k{i}"), i);
                    assert!(cache.len() <= max_size);
                    let _ = cache.get(&format!("t{t}-k{}", i / 2));
                }
            });
        }
    });

    assert_eq!(cache.len(), max_size);
    let stats = cache.stats();
    assert_eq!(stats.insertions, 8 * 250);
    assert_eq!(stats.evictions, 8 * 250 - max_size as u64);
}

// ── Expiry ──────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn entry_expires_at_ttl() {
    let cache = cache(10, Some(1_000));
    cache.put("p1".to_string(), 1);

    tokio::time::advance(Duration::from_millis(999)).await;
    assert_eq!(cache.get(&"p1".to_string()), Some(1));

    tokio::time::advance(Duration::from_millis(1)).await;
    assert_eq!(cache.get(&"p1".to_string()), None);
    assert!(cache.is_empty());
    assert_eq!(cache.stats().expirations, 1);
}

#[tokio::test(start_paused = true)]
async fn get_does_not_extend_ttl() {
    let cache = cache(10, Some(1_000));
    cache.put("p1".to_string(), 1);

    tokio::time::advance(Duration::from_millis(600)).await;
    assert_eq!(cache.get(&"p1".to_string()), Some(1));

    tokio::time::advance(Duration::from_millis(600)).await;
    assert_eq!(cache.get(&"p1".to_string()), None);
}

#[tokio::test(start_paused = true)]
async fn put_resets_age() {
    let cache = cache(10, Some(1_000));
    cache.put("p1".to_string(), 1);

    tokio::time::advance(Duration::from_millis(800)).await;
    cache.put("p1".to_string(), 2);

    tokio::time::advance(Duration::from_millis(800)).await;
    assert_eq!(cache.get(&"p1".to_string()), Some(2));
}

#[tokio::test(start_paused = true)]
async fn contains_ignores_expired_entries() {
    let cache = cache(10, Some(50));
    cache.put("p1".to_string(), 1);
    tokio::time::advance(Duration::from_millis(50)).await;
    assert!(!cache.contains(&"p1".to_string()));
    // contains() does not evict.
    assert_eq!(cache.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn purge_expired_removes_only_old_entries() {
    let cache = cache(10, Some(1_000));
    cache.put("old".to_string(), 1);
    tokio::time::advance(Duration::from_millis(700)).await;
    cache.put("new".to_string(), 2);
    tokio::time::advance(Duration::from_millis(300)).await;

    assert_eq!(cache.purge_expired(), 1);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&"new".to_string()), Some(2));
}

#[tokio::test(start_paused = true)]
async fn no_ttl_never_expires() {
    let cache = cache(10, None);
    cache.put("p1".to_string(), 1);
    tokio::time::advance(Duration::from_secs(86_400)).await;
    assert_eq!(cache.get(&"p1".to_string()), Some(1));
    assert_eq!(cache.purge_expired(), 0);
}

// ── Stats ───────────────────────────────────────────────────────

#[test]
fn stats_count_hits_and_misses() {
    let cache = cache(10, None);
    cache.put("a".to_string(), 1);
    cache.get(&"a".to_string());
    cache.get(&"a".to_string());
    cache.get(&"b".to_string());

    let stats = cache.stats();
    assert_eq!(
        stats,
        CacheStats {
            hits: 2,
            misses: 1,
            insertions: 1,
            evictions: 0,
            expirations: 0,
        }
    );
    assert!((stats.hit_rate() - 2.0 / 3.0).abs() < f64::EPSILON);
}

#[test]
fn hit_rate_without_lookups_is_zero() {
    assert_eq!(CacheStats::default().hit_rate(), 0.0);
}
