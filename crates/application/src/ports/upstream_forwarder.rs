use async_trait::async_trait;
use lechr_dns_domain::{DomainError, UpstreamPlan};
use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct ForwardOutcome {
    /// Raw reply datagram.
    pub bytes: Vec<u8>,
    /// Nameserver the reply came from.
    pub server: SocketAddr,
    /// Attempts started before the reply arrived, including the answering one.
    pub attempts: usize,
}

#[async_trait]
pub trait UpstreamForwarder: Send + Sync {
    /// Relay `query` to the plan's nameservers one at a time, in order,
    /// until one replies or every attempt has timed out.
    async fn forward(&self, query: &[u8], plan: &UpstreamPlan)
        -> Result<ForwardOutcome, DomainError>;
}
