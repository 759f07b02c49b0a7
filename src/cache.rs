//! # Reconciled-record cache
//!
//! A best-effort LRU cache with per-entry TTL, sitting in front of the
//! by-id reconciliation path. Entries are cloned out; expiry is checked
//! lazily on read, so a stale entry costs one miss and is dropped in
//! place. Synchronization is a single mutex around the LRU list, which
//! is plenty for the by-id lookup rates the core sees.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Hit and miss counters, readable without locking the cache.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

/// TTL-bounded LRU cache for reconciled records.
pub struct RecordCache<K, V> {
    entries: Mutex<LruCache<K, Entry<V>>>,
    ttl: Duration,
    stats: CacheStats,
}

impl<K: std::hash::Hash + Eq, V: Clone> RecordCache<K, V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
            stats: CacheStats::default(),
        }
    }

    /// Returns a clone of the cached value, dropping it if expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.pop(key);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn put(&self, key: K, value: V) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.lock().push(key, entry);
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.lock().pop(key);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}
