use hickory_proto::op::Message;
use lechr_dns_domain::CacheKey;
use std::sync::Arc;
use tokio::time::Instant;

/// A live cache entry handed out by [`ResponseCachePort::get`].
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub response: Arc<Message>,
    pub stored_at: Instant,
    pub expires_at: Instant,
}

impl CachedResponse {
    /// Whole seconds left before expiry, rounded up.
    pub fn remaining_ttl(&self, now: Instant) -> u32 {
        let remaining = self.expires_at.saturating_duration_since(now);
        let secs = remaining.as_millis().div_ceil(1000);
        u32::try_from(secs).unwrap_or(u32::MAX)
    }
}

/// Snapshot of response cache counters.
#[derive(Debug, Clone, Default)]
pub struct CacheMetricsSnapshot {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    pub expirations: u64,
    pub invalidations: u64,
    pub hit_rate: f64,
}

/// TTL-bounded store of decoded upstream responses.
///
/// Implementations must never return an entry past its deadline, and a
/// `put` over an existing key must retire the previous entry's expiry.
pub trait ResponseCachePort: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<CachedResponse>;

    fn put(&self, key: CacheKey, response: Arc<Message>, ttl_secs: u32);

    /// Remove immediately. Returns whether an entry was present.
    fn invalidate(&self, key: &CacheKey) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn metrics_snapshot(&self) -> CacheMetricsSnapshot;
}
