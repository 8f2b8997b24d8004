use super::CacheMetrics;
use dashmap::DashMap;
use hickory_proto::op::Message;
use lechr_dns_application::ports::{CacheMetricsSnapshot, CachedResponse, ResponseCachePort};
use lechr_dns_domain::CacheKey;
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::debug;

struct StoredEntry {
    response: Arc<Message>,
    stored_at: Instant,
    expires_at: Instant,
    /// Distinguishes this entry from a later `put` under the same key, so a
    /// late-firing timer never removes its replacement.
    generation: u64,
    expiry: Option<AbortHandle>,
}

impl StoredEntry {
    fn is_live_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    fn cancel_expiry(&self) {
        if let Some(handle) = &self.expiry {
            handle.abort();
        }
    }

    fn to_cached(&self) -> CachedResponse {
        CachedResponse {
            response: Arc::clone(&self.response),
            stored_at: self.stored_at,
            expires_at: self.expires_at,
        }
    }
}

struct CacheInner {
    entries: DashMap<CacheKey, StoredEntry, FxBuildHasher>,
    metrics: CacheMetrics,
    next_generation: AtomicU64,
}

impl CacheInner {
    fn expire(&self, key: &CacheKey, generation: u64) {
        let removed = self
            .entries
            .remove_if(key, |_, entry| entry.generation == generation);
        if removed.is_some() {
            self.metrics
                .expirations
                .fetch_add(1, AtomicOrdering::Relaxed);
            debug!(key = %key, "Cache entry expired");
        }
    }
}

/// TTL-bounded response cache.
///
/// Every entry gets its own expiry task; replacing or invalidating an entry
/// aborts that task. Reads also check the deadline, so an entry is never
/// served late even if its task has not run yet.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Arc<CacheInner>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: DashMap::with_hasher(FxBuildHasher),
                metrics: CacheMetrics::default(),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.inner.metrics
    }

    pub fn clear(&self) {
        self.inner.entries.retain(|_, entry| {
            entry.cancel_expiry();
            false
        });
    }

    fn schedule_expiry(
        &self,
        key: CacheKey,
        generation: u64,
        deadline: Instant,
    ) -> Option<AbortHandle> {
        // Without a runtime there is no timer; reads still enforce the deadline.
        let handle = Handle::try_current().ok()?;
        let weak: Weak<CacheInner> = Arc::downgrade(&self.inner);

        let task = handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(inner) = weak.upgrade() {
                inner.expire(&key, generation);
            }
        });
        Some(task.abort_handle())
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseCachePort for ResponseCache {
    fn get(&self, key: &CacheKey) -> Option<CachedResponse> {
        let now = Instant::now();

        let stale_generation = match self.inner.entries.get(key) {
            Some(entry) if entry.is_live_at(now) => {
                self.inner.metrics.hits.fetch_add(1, AtomicOrdering::Relaxed);
                return Some(entry.to_cached());
            }
            Some(entry) => Some(entry.generation),
            None => None,
        };

        if let Some(generation) = stale_generation {
            if let Some((_, entry)) = self
                .inner
                .entries
                .remove_if(key, |_, entry| entry.generation == generation)
            {
                entry.cancel_expiry();
                self.inner
                    .metrics
                    .expirations
                    .fetch_add(1, AtomicOrdering::Relaxed);
            }
        }

        self.inner.metrics.misses.fetch_add(1, AtomicOrdering::Relaxed);
        None
    }

    fn put(&self, key: CacheKey, response: Arc<Message>, ttl_secs: u32) {
        if ttl_secs == 0 {
            self.invalidate(&key);
            return;
        }

        let stored_at = Instant::now();
        let expires_at = stored_at + Duration::from_secs(u64::from(ttl_secs));
        let generation = self
            .inner
            .next_generation
            .fetch_add(1, AtomicOrdering::Relaxed);
        let expiry = self.schedule_expiry(key.clone(), generation, expires_at);

        debug!(key = %key, ttl = ttl_secs, "Inserted response into cache");

        let entry = StoredEntry {
            response,
            stored_at,
            expires_at,
            generation,
            expiry,
        };

        if let Some(previous) = self.inner.entries.insert(key, entry) {
            previous.cancel_expiry();
        }
        self.inner
            .metrics
            .insertions
            .fetch_add(1, AtomicOrdering::Relaxed);
    }

    fn invalidate(&self, key: &CacheKey) -> bool {
        match self.inner.entries.remove(key) {
            Some((_, entry)) => {
                entry.cancel_expiry();
                self.inner
                    .metrics
                    .invalidations
                    .fetch_add(1, AtomicOrdering::Relaxed);
                debug!(key = %key, "Cache entry invalidated");
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.inner.entries.len()
    }

    fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.inner.metrics.snapshot(self.inner.entries.len())
    }
}
