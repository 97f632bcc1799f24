//! TTL response cache.
//!
//! Keys are request signatures (verb + URL + body); entries expire a fixed
//! duration after insertion and are evicted lazily on the next lookup.
//! Disabling the cache clears it immediately, so re-enabling starts empty.

use {
    dashmap::DashMap,
    serde_json::Value,
    std::sync::atomic::{AtomicBool, Ordering},
    std::time::{Duration, Instant},
    tracing::debug,
};

struct CacheEntry {
    payload: Value,
    expires_at: Instant,
}

pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    enabled: AtomicBool,
}

impl ResponseCache {
    /// Default TTL for upstream responses.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            enabled: AtomicBool::new(true),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Look up a non-expired entry. An expired entry is treated as absent
    /// and removed.
    pub fn get(&self, key: &str) -> Option<Value> {
        if !self.is_enabled() {
            return None;
        }
        if let Some(entry) = self.entries.get(key) {
            if Instant::now() < entry.expires_at {
                return Some(entry.payload.clone());
            }
        } else {
            return None;
        }
        debug!(key = %key, "evicting expired cache entry");
        self.entries.remove(key);
        None
    }

    pub fn insert(&self, key: String, payload: Value) {
        if !self.is_enabled() {
            return;
        }
        self.entries.insert(
            key,
            CacheEntry {
                payload,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Disabling clears the store immediately.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
        if !enabled {
            self.clear();
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL)
    }
}
