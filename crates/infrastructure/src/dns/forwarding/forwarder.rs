use super::state::AttemptStateMachine;
use async_trait::async_trait;
use lechr_dns_application::ports::{ForwardOutcome, UpstreamForwarder, MAX_MESSAGE_SIZE};
use lechr_dns_domain::{DomainError, UpstreamPlan};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV6};
use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Forwards raw queries over UDP, one nameserver at a time.
///
/// Each forward owns a fresh ephemeral socket that is closed when the
/// forward finishes. Attempt `i` waits `plan.attempt_timeout(i)` before the
/// next nameserver is tried.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpForwarder;

impl UdpForwarder {
    pub fn new() -> Self {
        Self
    }

    async fn await_reply(
        socket: &UpstreamSocket,
        contacted: &[SocketAddr],
        query_id: u16,
        deadline: Instant,
        buf: &mut [u8],
    ) -> io::Result<Option<(usize, SocketAddr)>> {
        loop {
            let received = tokio::time::timeout_at(deadline, socket.recv_from(buf)).await;
            let (len, from) = match received {
                Err(_) => return Ok(None),
                Ok(result) => result?,
            };

            if !contacted.contains(&from) {
                debug!(source = %from, "Ignoring datagram from unexpected source");
                continue;
            }
            if len < 2 || u16::from_be_bytes([buf[0], buf[1]]) != query_id {
                debug!(source = %from, "Ignoring reply with mismatched id");
                continue;
            }
            return Ok(Some((len, from)));
        }
    }
}

#[async_trait]
impl UpstreamForwarder for UdpForwarder {
    async fn forward(
        &self,
        query: &[u8],
        plan: &UpstreamPlan,
    ) -> Result<ForwardOutcome, DomainError> {
        if plan.nameservers.is_empty() {
            return Err(DomainError::NoNameservers);
        }
        if query.len() < 2 {
            return Err(DomainError::InvalidDnsMessage(
                "Query shorter than its id".to_string(),
            ));
        }
        let query_id = u16::from_be_bytes([query[0], query[1]]);

        let socket = UpstreamSocket::bind(&plan.nameservers).map_err(|e| {
            DomainError::UpstreamTransport {
                server: "local".to_string(),
                reason: format!("Failed to bind UDP socket: {}", e),
            }
        })?;

        let mut machine = AttemptStateMachine::new(plan.attempts());
        let mut next = machine.start();
        let mut buf = vec![0u8; MAX_MESSAGE_SIZE + 1];

        while let Some(index) = next {
            let server = plan.nameservers[index];
            let timeout = plan.attempt_timeout(index);

            if let Err(e) = socket.send_to(query, server).await {
                machine.fail();
                warn!(server = %server, attempt = index, error = %e, "Upstream send failed");
                return Err(DomainError::UpstreamTransport {
                    server: server.to_string(),
                    reason: e.to_string(),
                });
            }
            debug!(
                server = %server,
                attempt = index,
                timeout_ms = timeout.as_millis() as u64,
                "Query sent upstream"
            );

            let deadline = Instant::now() + timeout;
            let contacted = &plan.nameservers[..=index];
            match Self::await_reply(&socket, contacted, query_id, deadline, &mut buf).await {
                Ok(Some((len, from))) => {
                    machine.succeed();
                    buf.truncate(len);
                    return Ok(ForwardOutcome {
                        bytes: buf,
                        server: from,
                        attempts: machine.attempts_made(),
                    });
                }
                Ok(None) => {
                    debug!(server = %server, attempt = index, "Upstream attempt timed out");
                    next = machine.timed_out();
                }
                Err(e) => {
                    machine.fail();
                    warn!(
                        server = %server,
                        attempt = index,
                        error = %e,
                        "Upstream receive failed"
                    );
                    return Err(DomainError::UpstreamTransport {
                        server: server.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(DomainError::UpstreamExhausted {
            attempts: machine.attempts_made(),
        })
    }
}

/// Ephemeral socket able to reach every nameserver of a plan.
///
/// A plan with any IPv6 server gets a dual-stack socket; IPv4 servers are
/// then addressed through their v4-mapped form.
struct UpstreamSocket {
    socket: UdpSocket,
    dual_stack: bool,
}

impl UpstreamSocket {
    fn bind(servers: &[SocketAddr]) -> io::Result<Self> {
        let dual_stack = servers.iter().any(SocketAddr::is_ipv6);
        let (domain, local): (Domain, SocketAddr) = if dual_stack {
            (Domain::IPV6, (Ipv6Addr::UNSPECIFIED, 0).into())
        } else {
            (Domain::IPV4, (Ipv4Addr::UNSPECIFIED, 0).into())
        };

        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
        if dual_stack {
            socket.set_only_v6(false)?;
        }
        socket.bind(&local.into())?;
        socket.set_nonblocking(true)?;

        Ok(Self {
            socket: UdpSocket::from_std(socket.into())?,
            dual_stack,
        })
    }

    async fn send_to(&self, bytes: &[u8], server: SocketAddr) -> io::Result<usize> {
        let target = match server {
            SocketAddr::V4(v4) if self.dual_stack => {
                SocketAddr::V6(SocketAddrV6::new(v4.ip().to_ipv6_mapped(), v4.port(), 0, 0))
            }
            other => other,
        };
        self.socket.send_to(bytes, target).await
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        let (len, from) = self.socket.recv_from(buf).await?;
        Ok((len, SocketAddr::new(from.ip().to_canonical(), from.port())))
    }
}
