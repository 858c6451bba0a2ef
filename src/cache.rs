//! In-memory translation cache with TTL and a hard entry limit.
//!
//! Key: blake3 fingerprint of the length-prefixed (source_lang, target_lang,
//! text) fields.
//! Eviction order is insertion order: reads never refresh an entry's
//! position, an overwrite counts as a fresh insertion.

use std::fmt;
use std::num::NonZeroUsize;
use std::time::Duration;

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

/// Content fingerprint of a translation request.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    pub fn fingerprint(source_lang: &str, target_lang: &str, text: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        for field in [source_lang, target_lang, text] {
            // Length prefix keeps field boundaries unambiguous
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        CacheKey(*hasher.finalize().as_bytes())
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey(")?;
        for byte in &self.0[..6] {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, ")")
    }
}

struct CacheEntry {
    translated_text: String,
    inserted_at: Instant,
}

/// Snapshot of the cache for monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub ttl_seconds: u64,
}

pub struct CacheStore {
    inner: Mutex<LruCache<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl CacheStore {
    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Look up a cached translation. Returns None if absent or expired.
    ///
    /// An expired entry is removed as a side effect.
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        let mut cache = self.inner.lock();
        let expired = match cache.peek(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.translated_text.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            debug!(?key, "Dropping expired cache entry");
            cache.pop(key);
        }
        None
    }

    /// Insert a translation, evicting the oldest entry when full.
    pub fn put(&self, key: CacheKey, translated_text: String) {
        let entry = CacheEntry {
            translated_text,
            inserted_at: Instant::now(),
        };

        // Remove first so an overwrite moves the key to the newest position
        // and never triggers an eviction of some other entry.
        let mut cache = self.inner.lock();
        cache.pop(&key);
        if let Some((evicted, _)) = cache.push(key, entry) {
            debug!(?evicted, "Cache full, evicted oldest entry");
        }
    }

    pub fn stats(&self) -> CacheStats {
        let cache = self.inner.lock();
        CacheStats {
            size: cache.len(),
            max_size: cache.cap().get(),
            ttl_seconds: self.ttl.as_secs(),
        }
    }

    /// Drop every entry, returning how many were removed.
    pub fn clear(&self) -> usize {
        let mut cache = self.inner.lock();
        let removed = cache.len();
        cache.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
