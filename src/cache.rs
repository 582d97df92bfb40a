//! TTL cache capability.
//!
//! Monthly pay reports are cheap to recompute but requested often; the API
//! layer keeps them in a [`TtlCache`] injected through the application
//! state. The cache is an explicit capability with get-or-compute and
//! key/prefix invalidation — workflow operations that change a worker's
//! month invalidate the affected keys rather than relying on expiry alone.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::error::EngineResult;

/// An in-process cache with per-entry time-to-live.
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, V)>>,
}

impl<V: Clone> TtlCache<V> {
    /// Creates a cache whose entries expire after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    // The map stays usable after a panic in another holder; recover the
    // guard rather than propagating the poison.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, (Instant, V)>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the cached value for `key`, computing and storing it when
    /// absent or expired. A failed computation is not cached.
    pub fn get_or_compute(
        &self,
        key: &str,
        compute: impl FnOnce() -> EngineResult<V>,
    ) -> EngineResult<V> {
        let mut entries = self.entries();
        if let Some((stored_at, value)) = entries.get(key) {
            if stored_at.elapsed() < self.ttl {
                return Ok(value.clone());
            }
        }
        let value = compute()?;
        entries.insert(key.to_string(), (Instant::now(), value.clone()));
        Ok(value)
    }

    /// Drops one entry.
    pub fn invalidate(&self, key: &str) {
        self.entries().remove(key);
    }

    /// Drops every entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) {
        self.entries().retain(|key, _| !key.starts_with(prefix));
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns true when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    #[test]
    fn test_computes_once_within_ttl() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
        let mut calls = 0;

        for _ in 0..3 {
            let value = cache
                .get_or_compute("k", || {
                    calls += 1;
                    Ok(7)
                })
                .unwrap();
            assert_eq!(value, 7);
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_expired_entry_is_recomputed() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::ZERO);
        let mut calls = 0;
        for _ in 0..2 {
            cache
                .get_or_compute("k", || {
                    calls += 1;
                    Ok(calls)
                })
                .unwrap();
        }
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_failed_computation_is_not_cached() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
        let failed: EngineResult<u32> = cache.get_or_compute("k", || {
            Err(EngineError::Validation {
                message: "nope".to_string(),
            })
        });
        assert!(failed.is_err());

        let value = cache.get_or_compute("k", || Ok(9)).unwrap();
        assert_eq!(value, 9);
    }

    #[test]
    fn test_invalidate_by_key_and_prefix() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
        cache.get_or_compute("pay:w1:2025-03", || Ok(1)).unwrap();
        cache.get_or_compute("pay:w1:2025-04", || Ok(2)).unwrap();
        cache.get_or_compute("pay:w2:2025-03", || Ok(3)).unwrap();
        assert_eq!(cache.len(), 3);

        cache.invalidate("pay:w1:2025-03");
        assert_eq!(cache.len(), 2);

        cache.invalidate_prefix("pay:w1:");
        assert_eq!(cache.len(), 1);

        cache.invalidate_prefix("pay:");
        assert!(cache.is_empty());
    }
}
