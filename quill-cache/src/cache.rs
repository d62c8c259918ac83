//! In-memory TTL cache.

use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

/// Cache entry with an absolute expiry.
#[derive(Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Keyed cache whose entries expire at a fixed instant.
///
/// Expiry is checked lazily on access. Nothing is evicted except by
/// overwriting the key, so a key that is never read again keeps its stale
/// value for the life of the process.
///
/// No lock is held while a producer runs. Two callers missing on the same key
/// may both run the producer; the entry ends up holding one complete result.
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the value for `key` if present and not expired at `now`.
    pub fn get_fresh(&self, key: &str, now: DateTime<Utc>) -> Option<V> {
        let entries = self.entries.read();
        entries.get(key).and_then(|e| {
            if e.is_expired(now) {
                None
            } else {
                Some(e.value.clone())
            }
        })
    }

    /// Stores `value` under `key` until `expires_at`, replacing any prior entry.
    pub fn insert(&self, key: &str, value: V, expires_at: DateTime<Utc>) {
        self.entries
            .write()
            .insert(key.to_string(), CacheEntry { value, expires_at });
    }

    /// Returns the cached value, running `producer` on a miss or after expiry.
    pub async fn get<F, Fut>(&self, key: &str, expires_at: DateTime<Utc>, producer: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        self.get_at(key, Utc::now(), expires_at, producer).await
    }

    /// Like [`get`](Self::get) with an explicit clock reading.
    pub async fn get_at<F, Fut>(
        &self,
        key: &str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        producer: F,
    ) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        if let Some(value) = self.get_fresh(key, now) {
            debug!(key, "Cache hit");
            return value;
        }

        debug!(key, "Cache miss, refreshing");
        let value = producer().await;
        self.insert(key, value.clone(), expires_at);
        value
    }

    /// Fallible form of [`get_at`](Self::get_at).
    ///
    /// An `Err` from the producer is handed back and nothing is stored, so the
    /// next access tries again.
    pub async fn try_get_at<F, Fut, E>(
        &self,
        key: &str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        producer: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get_fresh(key, now) {
            debug!(key, "Cache hit");
            return Ok(value);
        }

        debug!(key, "Cache miss, refreshing");
        let value = producer().await?;
        self.insert(key, value.clone(), expires_at);
        Ok(value)
    }

    /// Returns true if `key` holds a value that is still fresh at `now`.
    pub fn contains_fresh(&self, key: &str, now: DateTime<Utc>) -> bool {
        self.entries
            .read()
            .get(key)
            .map(|e| !e.is_expired(now))
            .unwrap_or(false)
    }

    /// Returns the number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns cache statistics as of `now`.
    pub fn stats(&self, now: DateTime<Utc>) -> CacheStats {
        let entries = self.entries.read();
        let expired = entries.values().filter(|e| e.is_expired(now)).count();
        CacheStats {
            total_entries: entries.len(),
            expired_entries: expired,
            valid_entries: entries.len().saturating_sub(expired),
        }
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheStats {
    /// Total entries (including expired)
    pub total_entries: usize,
    /// Expired entries
    pub expired_entries: usize,
    /// Valid (non-expired) entries
    pub valid_entries: usize,
}
