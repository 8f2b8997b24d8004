use crate::ports::{CachedResponse, DnsCodec, ResponseCachePort, UpstreamForwarder};
use crate::services::ActiveConfig;
use dashmap::DashMap;
use hickory_proto::op::{Message, MessageType};
use hickory_proto::rr::rdata::{A, AAAA, CNAME, NS, PTR, TXT};
use hickory_proto::rr::{Name, RData, Record};
use lechr_dns_domain::{
    CacheKey, DomainError, OverwriteData, PolicyOverwrite, ProxySnapshot, Question, RecordKind,
};
use rustc_hash::FxBuildHasher;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Which branch of the pipeline produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Overwrite,
    Blacklist,
    Cache,
    /// Shared the result of another query's in-flight forward.
    Coalesced,
    Upstream,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::Blacklist => "blacklist",
            Self::Cache => "cache",
            Self::Coalesced => "coalesced",
            Self::Upstream => "upstream",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DnsReply {
    pub bytes: Vec<u8>,
    pub source: ReplySource,
}

type InflightSender = Arc<watch::Sender<Option<Arc<Message>>>>;
type InflightMap = DashMap<CacheKey, InflightSender, FxBuildHasher>;

enum InflightRole {
    Leader(InflightLeaderGuard),
    Follower(watch::Receiver<Option<Arc<Message>>>),
}

/// Owns a pending forward. Followers are released with `None` unless the
/// leader publishes a response first.
struct InflightLeaderGuard {
    inflight: Arc<InflightMap>,
    key: CacheKey,
    tx: InflightSender,
    published: bool,
}

impl InflightLeaderGuard {
    fn publish(mut self, response: Arc<Message>) {
        self.release();
        let _ = self.tx.send(Some(response));
        self.published = true;
    }

    // Only our own entry; a newer leader for the same key may own the slot.
    fn release(&self) {
        self.inflight
            .remove_if(&self.key, |_, tx| Arc::ptr_eq(tx, &self.tx));
    }
}

impl Drop for InflightLeaderGuard {
    fn drop(&mut self) {
        if !self.published {
            self.release();
            let _ = self.tx.send(None);
        }
    }
}

/// Per-datagram resolution pipeline:
/// overwrite → blacklist → cache → forward (and cache).
pub struct ResolveQueryUseCase {
    config: Arc<ActiveConfig>,
    cache: Arc<dyn ResponseCachePort>,
    forwarder: Arc<dyn UpstreamForwarder>,
    codec: Arc<dyn DnsCodec>,
    inflight: Arc<InflightMap>,
}

impl ResolveQueryUseCase {
    pub fn new(
        config: Arc<ActiveConfig>,
        cache: Arc<dyn ResponseCachePort>,
        forwarder: Arc<dyn UpstreamForwarder>,
        codec: Arc<dyn DnsCodec>,
    ) -> Self {
        Self {
            config,
            cache,
            forwarder,
            codec,
            inflight: Arc::new(DashMap::with_hasher(FxBuildHasher)),
        }
    }

    /// Resolve one inbound datagram. `None` means no reply is sent: the
    /// query was malformed, or forwarding failed.
    pub async fn handle(&self, raw: &[u8], sender: SocketAddr) -> Option<DnsReply> {
        let query = match self.codec.decode(raw) {
            Ok(query) => query,
            Err(e) => {
                debug!(client = %sender, error = %e, "Dropping undecodable query");
                return None;
            }
        };

        let Some(question) = first_question(&query) else {
            debug!(client = %sender, "Dropping query without question");
            return None;
        };

        let snapshot = self.config.load();
        let record_type = RecordKind::label(question.record_type);

        if let Some(overwrite) = snapshot.policy.lookup_overwrite(&question.name) {
            if overwrite.matches_type(question.record_type) {
                info!(
                    client = %sender,
                    record_type = %record_type,
                    domain = %question.name,
                    answer = %overwrite.data,
                    "(OVERWRITE) query answered from policy"
                );
                return self.reply_overwrite(query, overwrite);
            }
            debug!(
                domain = %question.name,
                requested = %record_type,
                overwrite = %overwrite.kind,
                "Overwrite type mismatch, resolving normally"
            );
        }

        if snapshot.policy.is_blacklisted(&question.name) {
            info!(
                client = %sender,
                record_type = %record_type,
                domain = %question.name,
                reason = snapshot.policy.blacklist_reason(&question.name).unwrap_or("-"),
                "(BLACKLIST) query suppressed"
            );
            return self.reply_blacklisted(query);
        }

        let key = question.cache_key();

        if let Some(cached) = self.cache.get(&key) {
            info!(
                client = %sender,
                record_type = %record_type,
                domain = %question.name,
                key = %key,
                "(CACHE) query answered from cache"
            );
            return self.reply_cached(query.id(), &cached);
        }

        self.forward(&query, raw, key, &snapshot, sender, &record_type)
            .await
    }

    fn reply_overwrite(&self, mut query: Message, overwrite: &PolicyOverwrite) -> Option<DnsReply> {
        let name = query.queries().first()?.name().clone();
        let record = match overwrite_record(name, overwrite) {
            Ok(record) => record,
            Err(e) => {
                warn!(domain = %overwrite.name, error = %e, "Overwrite cannot be encoded");
                return None;
            }
        };

        mark_as_reply(&mut query);
        query.add_answer(record);
        self.encode_reply(&query, ReplySource::Overwrite)
    }

    fn reply_blacklisted(&self, mut query: Message) -> Option<DnsReply> {
        mark_as_reply(&mut query);
        self.encode_reply(&query, ReplySource::Blacklist)
    }

    fn reply_cached(&self, id: u16, cached: &CachedResponse) -> Option<DnsReply> {
        let mut response = (*cached.response).clone();
        response.set_id(id);

        let remaining = cached.remaining_ttl(Instant::now());
        let answers = response
            .take_answers()
            .into_iter()
            .map(|mut record| {
                if record.ttl() > remaining {
                    record.set_ttl(remaining);
                }
                record
            })
            .collect();
        response.insert_answers(answers);

        self.encode_reply(&response, ReplySource::Cache)
    }

    async fn forward(
        &self,
        query: &Message,
        raw: &[u8],
        key: CacheKey,
        snapshot: &ProxySnapshot,
        sender: SocketAddr,
        record_type: &str,
    ) -> Option<DnsReply> {
        let guard = match self.register_or_join_inflight(&key) {
            InflightRole::Leader(guard) => guard,
            InflightRole::Follower(rx) => {
                return self.reply_as_follower(query.id(), &key, rx).await;
            }
        };

        let outcome = match self.forwarder.forward(raw, &snapshot.upstream).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    client = %sender,
                    record_type = %record_type,
                    domain = %key.name,
                    error = %e,
                    "Forwarding failed, query dropped"
                );
                return None;
            }
        };

        let mut response = match self.codec.decode(&outcome.bytes) {
            Ok(response) => response,
            Err(e) => {
                warn!(server = %outcome.server, error = %e, "Undecodable upstream reply");
                return None;
            }
        };
        response.set_id(query.id());
        let response = Arc::new(response);

        match cacheable_ttl(&response) {
            Some(ttl) => self.cache.put(key.clone(), Arc::clone(&response), ttl),
            None => debug!(key = %key, "Upstream reply not cached"),
        }

        guard.publish(Arc::clone(&response));

        info!(
            client = %sender,
            record_type = %record_type,
            domain = %key.name,
            server = %outcome.server,
            attempts = outcome.attempts,
            answers = response.answers().len(),
            "(FETCHED) query answered by upstream"
        );

        self.encode_reply(&response, ReplySource::Upstream)
    }

    fn register_or_join_inflight(&self, key: &CacheKey) -> InflightRole {
        match self.inflight.entry(key.clone()) {
            dashmap::Entry::Occupied(e) => InflightRole::Follower(e.get().subscribe()),
            dashmap::Entry::Vacant(e) => {
                let tx = Arc::new(watch::channel(None::<Arc<Message>>).0);
                e.insert(Arc::clone(&tx));
                InflightRole::Leader(InflightLeaderGuard {
                    inflight: Arc::clone(&self.inflight),
                    key: key.clone(),
                    tx,
                    published: false,
                })
            }
        }
    }

    async fn reply_as_follower(
        &self,
        id: u16,
        key: &CacheKey,
        mut rx: watch::Receiver<Option<Arc<Message>>>,
    ) -> Option<DnsReply> {
        debug!(key = %key, "Joining in-flight forward");

        // An Err here means the leader dropped without publishing; the
        // borrowed value is then still None.
        let _ = rx.changed().await;
        let shared = rx.borrow().clone();

        let Some(shared) = shared else {
            debug!(key = %key, "In-flight forward failed, query dropped");
            return None;
        };

        let mut response = (*shared).clone();
        response.set_id(id);
        self.encode_reply(&response, ReplySource::Coalesced)
    }

    fn encode_reply(&self, message: &Message, source: ReplySource) -> Option<DnsReply> {
        match self.codec.encode(message) {
            Ok(bytes) => Some(DnsReply { bytes, source }),
            Err(e) => {
                warn!(source = source.as_str(), error = %e, "Failed to encode reply");
                None
            }
        }
    }
}

fn first_question(message: &Message) -> Option<Question> {
    let query = message.queries().first()?;
    Some(Question::from_fqdn(
        &query.name().to_ascii(),
        u16::from(query.query_type()),
        u16::from(query.query_class()),
    ))
}

fn mark_as_reply(message: &mut Message) {
    message.set_message_type(MessageType::Response);
    message.set_recursion_desired(true);
    message.set_recursion_available(true);
}

/// TTL of the first answer, when the reply is worth caching at all.
fn cacheable_ttl(response: &Message) -> Option<u32> {
    response
        .answers()
        .first()
        .map(|record| record.ttl())
        .filter(|ttl| *ttl > 0)
}

fn overwrite_record(name: Name, overwrite: &PolicyOverwrite) -> Result<Record, DomainError> {
    let rdata = match &overwrite.data {
        OverwriteData::Ipv4(ip) => RData::A(A(*ip)),
        OverwriteData::Ipv6(ip) => RData::AAAA(AAAA(*ip)),
        OverwriteData::Name(target) => {
            let mut target = Name::from_ascii(target).map_err(|e| {
                DomainError::InvalidDnsMessage(format!("Invalid target '{}': {}", target, e))
            })?;
            target.set_fqdn(true);
            match overwrite.kind {
                RecordKind::NS => RData::NS(NS(target)),
                RecordKind::PTR => RData::PTR(PTR(target)),
                _ => RData::CNAME(CNAME(target)),
            }
        }
        OverwriteData::Text(text) => RData::TXT(TXT::new(vec![text.clone()])),
    };

    Ok(Record::from_rdata(name, overwrite.ttl, rdata))
}
