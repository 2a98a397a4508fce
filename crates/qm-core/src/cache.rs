//! Bounded LRU cache with time-to-live.
//!
//! Not synchronized: owners wrap it in a lock. Eviction scans for the least
//! recently used entry, which is fine at the capacities used here (hundreds).

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use serde::Serialize;

struct Entry<V> {
    value: V,
    inserted: Instant,
    last_used: u64,
}

pub struct LruTtlCache<K, V> {
    entries: HashMap<K, Entry<V>>,
    capacity: usize,
    ttl: Duration,
    tick: u64,
    hits: u64,
    misses: u64,
}

/// Counters for status reporting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub len: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

impl<K: Eq + Hash + Clone, V: Clone> LruTtlCache<K, V> {
    /// A capacity of 0 disables caching.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.min(1024)),
            capacity,
            ttl,
            tick: 0,
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(&mut self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&mut self, key: &K, now: Instant) -> Option<V> {
        self.tick += 1;
        let expired = match self.entries.get_mut(key) {
            Some(e) if now.saturating_duration_since(e.inserted) < self.ttl => {
                e.last_used = self.tick;
                self.hits += 1;
                return Some(e.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        self.misses += 1;
        None
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    /// Insert or overwrite (last write wins).
    pub fn insert_at(&mut self, key: K, value: V, now: Instant) {
        if self.capacity == 0 {
            return;
        }
        self.tick += 1;
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            let ttl = self.ttl;
            self.entries
                .retain(|_, e| now.saturating_duration_since(e.inserted) < ttl);
            if self.entries.len() >= self.capacity {
                self.evict_lru();
            }
        }
        self.entries.insert(
            key,
            Entry {
                value,
                inserted: now,
                last_used: self.tick,
            },
        );
    }

    fn evict_lru(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.last_used)
            .map(|(k, _)| k.clone());
        if let Some(k) = oldest {
            self.entries.remove(&k);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            len: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> LruTtlCache<&'static str, u32> {
        LruTtlCache::new(capacity, Duration::from_secs(60))
    }

    #[test]
    fn test_get_after_insert() {
        let mut c = cache(4);
        c.insert("a", 1);
        assert_eq!(c.get(&"a"), Some(1));
        assert_eq!(c.get(&"b"), None);
        let s = c.stats();
        assert_eq!((s.hits, s.misses), (1, 1));
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut c = cache(2);
        c.insert("a", 1);
        c.insert("b", 2);
        assert_eq!(c.get(&"a"), Some(1));
        c.insert("c", 3);
        assert_eq!(c.len(), 2);
        assert_eq!(c.get(&"b"), None);
        assert_eq!(c.get(&"a"), Some(1));
        assert_eq!(c.get(&"c"), Some(3));
    }

    #[test]
    fn test_ttl_expiry() {
        let mut c = cache(4);
        let t0 = Instant::now();
        c.insert_at("a", 1, t0);
        assert_eq!(c.get_at(&"a", t0 + Duration::from_secs(59)), Some(1));
        assert_eq!(c.get_at(&"a", t0 + Duration::from_secs(61)), None);
        assert!(c.is_empty());
    }

    #[test]
    fn test_overwrite_last_write_wins() {
        let mut c = cache(1);
        c.insert("a", 1);
        c.insert("a", 2);
        assert_eq!(c.len(), 1);
        assert_eq!(c.get(&"a"), Some(2));
    }

    #[test]
    fn test_zero_capacity_disabled() {
        let mut c = cache(0);
        c.insert("a", 1);
        assert!(c.is_empty());
        assert_eq!(c.get(&"a"), None);
    }
}
