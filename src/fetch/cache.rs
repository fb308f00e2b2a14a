//! LRU lookup table cache with TTL
//!
//! Caches decoded tables to avoid refetching them for every message.
//! - Key: table address
//! - TTL: 60 seconds by default. An entry may miss addresses appended after it
//!   was cached; `TableFetcher` refetches when a lookup index falls past its end
//! - Capacity: 1024 tables by default

use crate::table::LookupTableState;
use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use solana_sdk::pubkey::Pubkey;
use std::num::NonZeroUsize;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1024) {
    Some(capacity) => capacity,
    None => NonZeroUsize::MIN,
};

#[derive(Clone)]
struct CacheEntry {
    table: LookupTableState,
    cached_at: DateTime<Utc>,
}

/// LRU cache for decoded lookup tables
pub struct TableCache {
    cache: Mutex<LruCache<Pubkey, CacheEntry>>,
    ttl: Duration,
}

impl TableCache {
    /// Create a new table cache
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of tables to cache, zero falls back to the default
    /// * `ttl_seconds` - Time-to-live in seconds for each entry
    pub fn new(capacity: usize, ttl_seconds: i64) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY);
        Self {
            cache: Mutex::new(LruCache::new(cap)),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    pub fn default_config() -> Self {
        Self::new(DEFAULT_CAPACITY.get(), 60)
    }

    /// Get a cached table if it exists and hasn't expired
    pub fn get(&self, key: &Pubkey) -> Option<LookupTableState> {
        let mut cache = self.cache.lock();

        if let Some(entry) = cache.get(key) {
            let age = Utc::now() - entry.cached_at;
            if age < self.ttl {
                tracing::trace!(table = %key, age_secs = age.num_seconds(), "Cache hit");
                return Some(entry.table.clone());
            }
            tracing::trace!(table = %key, "Cache entry expired");
            cache.pop(key);
        }

        None
    }

    pub fn insert(&self, key: Pubkey, table: LookupTableState) {
        let entry = CacheEntry {
            table,
            cached_at: Utc::now(),
        };
        self.cache.lock().put(key, entry);
        tracing::trace!(table = %key, "Cache insert");
    }

    pub fn invalidate(&self, key: &Pubkey) {
        self.cache.lock().pop(key);
        tracing::trace!(table = %key, "Cache invalidate");
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
        tracing::debug!("Table cache cleared");
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let cache = self.cache.lock();
        CacheStats {
            entries: cache.len(),
            capacity: cache.cap().get(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Current number of entries
    pub entries: usize,
    /// Maximum capacity
    pub capacity: usize,
}
