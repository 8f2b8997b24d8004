use std::fmt;
use std::sync::Arc;

/// Identity of a question for caching and for pending upstream forwards.
///
/// Two queries with the same `(type, class, name)` are interchangeable,
/// whoever sent them and whatever their transaction ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub record_type: u16,
    pub class: u16,
    pub name: Arc<str>,
}

impl CacheKey {
    pub fn new(record_type: u16, class: u16, name: impl Into<Arc<str>>) -> Self {
        Self {
            record_type,
            class,
            name: name.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}::{}", self.record_type, self.class, self.name)
    }
}
