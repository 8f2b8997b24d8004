mod dns_codec;
mod response_cache;
mod upstream_forwarder;

pub use dns_codec::{DnsCodec, MAX_MESSAGE_SIZE};
pub use response_cache::{CacheMetricsSnapshot, CachedResponse, ResponseCachePort};
pub use upstream_forwarder::{ForwardOutcome, UpstreamForwarder};
