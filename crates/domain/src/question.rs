use super::CacheKey;
use std::sync::Arc;

/// The first question of an inbound query, as used for policy and caching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Domain name without the trailing root dot. Case is kept as received.
    pub name: Arc<str>,
    pub record_type: u16,
    pub class: u16,
}

impl Question {
    pub fn new(name: impl Into<Arc<str>>, record_type: u16, class: u16) -> Self {
        Self {
            name: name.into(),
            record_type,
            class,
        }
    }

    /// Build from a wire-format name such as `example.com.`.
    pub fn from_fqdn(fqdn: &str, record_type: u16, class: u16) -> Self {
        let name = if fqdn.len() > 1 {
            fqdn.strip_suffix('.').unwrap_or(fqdn)
        } else {
            fqdn
        };
        Self::new(name, record_type, class)
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.record_type, self.class, Arc::clone(&self.name))
    }
}
