use arc_swap::ArcSwap;
use lechr_dns_domain::ProxySnapshot;
use std::sync::Arc;
use tracing::info;

/// The configuration snapshot queries currently resolve against.
///
/// Readers take one `Arc` per query and keep it for the whole pipeline, so a
/// concurrent `replace` never shows them a half-updated table.
pub struct ActiveConfig {
    current: ArcSwap<ProxySnapshot>,
}

impl ActiveConfig {
    pub fn new(snapshot: ProxySnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    pub fn load(&self) -> Arc<ProxySnapshot> {
        self.current.load_full()
    }

    /// Publish a new snapshot, returning the one it replaced.
    pub fn replace(&self, snapshot: ProxySnapshot) -> Arc<ProxySnapshot> {
        self.current.swap(Arc::new(snapshot))
    }
}

pub fn log_snapshot_summary(snapshot: &ProxySnapshot) {
    info!(
        nameservers = snapshot.upstream.attempts(),
        overwrites = snapshot.policy.overwrite_count(),
        blacklisted = snapshot.policy.blacklist_count(),
        "Active configuration"
    );
    for (position, server) in snapshot.upstream.nameservers.iter().enumerate() {
        info!(
            position,
            server = %server,
            timeout_ms = snapshot.upstream.attempt_timeout(position).as_millis() as u64,
            "Upstream nameserver"
        );
    }
    for overwrite in snapshot.policy.overwrites() {
        info!(
            "{} is overwritten by {} {} (ttl {})",
            overwrite.name, overwrite.kind, overwrite.data, overwrite.ttl
        );
    }
}
