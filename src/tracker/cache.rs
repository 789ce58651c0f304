//! Get-or-compute caching for tracker responses.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::Value;

use super::{Issue, IssueQuery, IssueSource};
use crate::error::{Error, Result};

/// A key/value cache of JSON values.
pub trait Cache: Send + Sync {
    /// Return the cached value for `key`, or compute, store and return it.
    ///
    /// With a `ttl` the stored entry expires after that long; without one it
    /// never does. A failed computation stores nothing.
    fn get_or_compute(
        &self,
        key: &str,
        ttl: Option<Duration>,
        compute: &mut dyn FnMut() -> Result<Value>,
    ) -> Result<Value>;

    fn invalidate(&self, key: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub value: Value,
    pub expires_at: Option<Instant>,
    pub created_at: Instant,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// In-process [`Cache`].
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, CacheEntry>>> {
        self.entries
            .lock()
            .map_err(|_| Error::Tracker("cache lock poisoned".to_string()))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Cache for MemoryCache {
    fn get_or_compute(
        &self,
        key: &str,
        ttl: Option<Duration>,
        compute: &mut dyn FnMut() -> Result<Value>,
    ) -> Result<Value> {
        let now = Instant::now();
        if let Some(entry) = self.lock()?.get(key) {
            if entry.is_live(now) {
                tracing::trace!(key, "cache hit");
                return Ok(entry.value.clone());
            }
        }

        tracing::trace!(key, "cache miss");
        // Computed without holding the lock
        let value = compute()?;
        let entry = CacheEntry {
            value: value.clone(),
            // A TTL past the end of `Instant` never expires
            expires_at: ttl.and_then(|ttl| now.checked_add(ttl)),
            created_at: now,
        };
        self.lock()?.insert(key.to_string(), entry);
        Ok(value)
    }

    fn invalidate(&self, key: &str) {
        if let Ok(mut entries) = self.lock() {
            entries.remove(key);
        }
    }
}

/// An [`IssueSource`] that answers from a cache when it can.
pub struct CachedSource<S> {
    source: S,
    cache: Arc<dyn Cache>,
    ttl: Option<Duration>,
}

impl<S: IssueSource> CachedSource<S> {
    pub fn new(source: S, cache: Arc<dyn Cache>, ttl: Option<Duration>) -> Self {
        Self { source, cache, ttl }
    }
}

impl<S: IssueSource> IssueSource for CachedSource<S> {
    fn search(&self, query: &IssueQuery) -> Result<Vec<Issue>> {
        let value = self.cache.get_or_compute(&query.cache_key(), self.ttl, &mut || {
            Ok(serde_json::to_value(self.source.search(query)?)?)
        })?;
        Ok(serde_json::from_value(value)?)
    }

    fn invalidate(&self, query: &IssueQuery) {
        self.cache.invalidate(&query.cache_key());
        self.source.invalidate(query);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{sample_issue, FixtureSource};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_get_or_compute_caches() {
        let cache = MemoryCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            let value = cache
                .get_or_compute("k", None, &mut || {
                    calls += 1;
                    Ok(json!({ "n": 1 }))
                })
                .unwrap();
            assert_eq!(value["n"], 1);
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_expired_entry_recomputed() {
        let cache = MemoryCache::new();
        let mut calls = 0;
        let mut compute = || {
            calls += 1;
            Ok(json!(calls))
        };
        cache.get_or_compute("k", Some(Duration::ZERO), &mut compute).unwrap();
        let second = cache.get_or_compute("k", Some(Duration::ZERO), &mut compute).unwrap();
        assert_eq!(second, json!(2));
    }

    #[test]
    fn test_unbounded_ttl_never_expires() {
        let cache = MemoryCache::new();
        let mut calls = 0;
        for _ in 0..2 {
            let value = cache
                .get_or_compute("k", Some(Duration::MAX), &mut || {
                    calls += 1;
                    Ok(json!("v"))
                })
                .unwrap();
            assert_eq!(value, json!("v"));
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_failed_compute_stores_nothing() {
        let cache = MemoryCache::new();
        let result = cache.get_or_compute("k", None, &mut || Err(Error::Tracker("down".into())));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    struct Counting {
        inner: FixtureSource,
        calls: AtomicUsize,
    }

    impl IssueSource for Counting {
        fn search(&self, query: &IssueQuery) -> Result<Vec<Issue>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.search(query)
        }
    }

    #[test]
    fn test_cached_source() {
        let source = CachedSource::new(
            Counting {
                inner: FixtureSource::new(vec![sample_issue("FLOW-1", "Cache me", "Open")]),
                calls: AtomicUsize::new(0),
            },
            Arc::new(MemoryCache::new()),
            None,
        );
        let query = IssueQuery::default();

        assert_eq!(source.search(&query).unwrap()[0].key, "FLOW-1");
        assert_eq!(source.search(&query).unwrap().len(), 1);
        assert_eq!(source.source.calls.load(Ordering::SeqCst), 1);

        source.invalidate(&query);
        source.search(&query).unwrap();
        assert_eq!(source.source.calls.load(Ordering::SeqCst), 2);
    }
}
