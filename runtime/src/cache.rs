//! In-memory TTL caches for discovery payloads and roster extractions.
//!
//! ## Read-time expiry
//!
//! Entries are never purged in the background. A read checks the entry's
//! age against the TTL the caller passes in, and an entry at or past that
//! age reads as absent. The caller chooses the TTL per read, so a TTL of
//! zero always misses and forces a refresh.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Cache entry with metadata.
struct CacheEntry<V> {
    value: V,
    /// When the entry was stored.
    created_at: Instant,
}

impl<V> CacheEntry<V> {
    fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

/// Age report for one cached key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryStats {
    pub key: String,
    pub age_seconds: f64,
}

/// Snapshot returned by [`TtlCache::stats`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub size: usize,
    pub entries: Vec<EntryStats>,
}

/// Process-wide key/value store with per-read TTL checks.
///
/// Safe to share behind an `Arc`; the map is sharded internally.
pub struct TtlCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    /// TTL applied by [`get`](Self::get).
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Value for `key` if younger than the default TTL.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_with_ttl(key, self.default_ttl)
    }

    /// Value for `key` if younger than `ttl`.
    pub fn get_with_ttl(&self, key: &str, ttl: Duration) -> Option<V> {
        let entry = self.entries.get(key)?;
        entry.is_fresh(ttl).then(|| entry.value.clone())
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn put(&self, key: impl Into<String>, value: V) {
        self.put_at(key, value, Instant::now());
    }

    pub(crate) fn put_at(&self, key: impl Into<String>, value: V, created_at: Instant) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                created_at,
            },
        );
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, including expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry count and per-entry age, sorted by key.
    pub fn stats(&self) -> CacheStats {
        let mut entries: Vec<EntryStats> = self
            .entries
            .iter()
            .map(|e| EntryStats {
                key: e.key().clone(),
                age_seconds: e.value().age().as_secs_f64(),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        CacheStats {
            size: entries.len(),
            entries,
        }
    }
}
