use super::{a_response, decode, encode};
use async_trait::async_trait;
use hickory_proto::op::Message;
use lechr_dns_application::ports::{
    CacheMetricsSnapshot, CachedResponse, DnsCodec, ForwardOutcome, ResponseCachePort,
    UpstreamForwarder,
};
use lechr_dns_domain::{CacheKey, DomainError, UpstreamPlan};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Wire codec with no size limit, enough for pipeline tests.
pub struct TestCodec;

impl DnsCodec for TestCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Message, DomainError> {
        Message::from_vec(bytes).map_err(|e| DomainError::InvalidDnsMessage(e.to_string()))
    }

    fn encode(&self, message: &Message) -> Result<Vec<u8>, DomainError> {
        Ok(encode(message))
    }
}

#[derive(Clone)]
enum Script {
    Answer { addrs: Vec<Ipv4Addr>, ttl: u32 },
    Fail,
}

/// Upstream stand-in that answers from a per-domain script.
///
/// Replies always carry id `UPSTREAM_ID` so tests can observe the id rewrite.
pub struct MockForwarder {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Arc<AtomicUsize>,
    delay: Duration,
}

impl MockForwarder {
    pub const UPSTREAM_ID: u16 = 0xBEEF;

    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            calls: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn answer(&self, domain: &str, addrs: &[Ipv4Addr], ttl: u32) {
        self.scripts.lock().unwrap().insert(
            domain.to_string(),
            Script::Answer {
                addrs: addrs.to_vec(),
                ttl,
            },
        );
    }

    pub fn fail(&self, domain: &str) {
        self.scripts
            .lock()
            .unwrap()
            .insert(domain.to_string(), Script::Fail);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamForwarder for MockForwarder {
    async fn forward(
        &self,
        query: &[u8],
        plan: &UpstreamPlan,
    ) -> Result<ForwardOutcome, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let message = decode(query);
        let domain = message.queries()[0].name().to_ascii();
        let domain = domain.trim_end_matches('.').to_string();
        let script = self.scripts.lock().unwrap().get(&domain).cloned();

        match script {
            Some(Script::Answer { addrs, ttl }) => {
                let mut response = a_response(&message, &addrs, ttl);
                response.set_id(Self::UPSTREAM_ID);
                Ok(ForwardOutcome {
                    bytes: encode(&response),
                    server: plan.nameservers[0],
                    attempts: 1,
                })
            }
            Some(Script::Fail) | None => Err(DomainError::UpstreamExhausted {
                attempts: plan.attempts(),
            }),
        }
    }
}

/// Map-backed cache that honours deadlines on read but runs no timers.
pub struct MockResponseCache {
    entries: Mutex<HashMap<CacheKey, CachedResponse>>,
    puts: AtomicUsize,
}

impl MockResponseCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            puts: AtomicUsize::new(0),
        }
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }
}

impl ResponseCachePort for MockResponseCache {
    fn get(&self, key: &CacheKey) -> Option<CachedResponse> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .cloned()
    }

    fn put(&self, key: CacheKey, response: Arc<Message>, ttl_secs: u32) {
        self.puts.fetch_add(1, Ordering::SeqCst);
        let now = Instant::now();
        self.entries.lock().unwrap().insert(
            key,
            CachedResponse {
                response,
                stored_at: now,
                expires_at: now + Duration::from_secs(u64::from(ttl_secs)),
            },
        );
    }

    fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries.lock().unwrap().remove(key).is_some()
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            entries: self.len(),
            insertions: self.put_count() as u64,
            ..Default::default()
        }
    }
}
