//! Generic in-memory TTL cache
//!
//! Used by the scanner to remember pairwise correlation lookups within a
//! scan window so the provider is asked at most once per pair. Thread-safe,
//! generic over key/value, with hit/miss metrics.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub inserts: u64,
}

impl CacheMetrics {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub struct TtlCache<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    ttl: Duration,
    capacity: usize,
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    metrics: RwLock<CacheMetrics>,
}

impl<K, V> TtlCache<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            entries: RwLock::new(HashMap::new()),
            metrics: RwLock::new(CacheMetrics::default()),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() <= self.ttl => {
                self.metrics.write().hits += 1;
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                let mut metrics = self.metrics.write();
                metrics.misses += 1;
                metrics.evictions += 1;
                None
            }
            None => {
                self.metrics.write().misses += 1;
                None
            }
        }
    }

    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.write();

        // At capacity: drop the oldest entry
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest);
                self.metrics.write().evictions += 1;
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
        self.metrics.write().inserts += 1;
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn metrics(&self) -> CacheMetrics {
        *self.metrics.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_basic_operations() {
        let cache: TtlCache<String, f64> = TtlCache::new(Duration::from_secs(60), 100);
        cache.insert("BTC/ETH".to_string(), 0.82);
        assert_eq!(cache.get(&"BTC/ETH".to_string()), Some(0.82));
        assert_eq!(cache.get(&"BTC/SOL".to_string()), None);

        let metrics = cache.metrics();
        assert_eq!(metrics.hits, 1);
        assert_eq!(metrics.misses, 1);
        assert_eq!(metrics.hit_rate(), 0.5);
    }

    #[test]
    fn test_ttl_expiration() {
        let cache: TtlCache<&str, i32> = TtlCache::new(Duration::from_millis(30), 100);
        cache.insert("key", 1);
        assert_eq!(cache.get(&"key"), Some(1));
        thread::sleep(Duration::from_millis(60));
        assert_eq!(cache.get(&"key"), None);
        assert_eq!(cache.metrics().evictions, 1);
    }

    #[test]
    fn test_capacity_eviction() {
        let cache: TtlCache<i32, i32> = TtlCache::new(Duration::from_secs(60), 2);
        cache.insert(1, 1);
        cache.insert(2, 2);
        cache.insert(3, 3);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&3), Some(3));
    }

    #[test]
    fn test_clear() {
        let cache: TtlCache<i32, i32> = TtlCache::new(Duration::from_secs(60), 10);
        cache.insert(1, 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
