use lechr_dns_application::ports::MAX_MESSAGE_SIZE;
use lechr_dns_application::use_cases::ResolveQueryUseCase;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Receives client datagrams and answers each one from its own task.
///
/// The socket is bound once by the caller. Configuration changes go through
/// the pipeline's active snapshot, never through the listener.
pub struct UdpDnsListener {
    socket: Arc<UdpSocket>,
    pipeline: Arc<ResolveQueryUseCase>,
    shutdown: CancellationToken,
}

impl UdpDnsListener {
    pub fn new(socket: Arc<UdpSocket>, pipeline: Arc<ResolveQueryUseCase>) -> Self {
        Self {
            socket,
            pipeline,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub async fn run(self) {
        // Spare byte: an oversized datagram must reach the codec whole enough
        // to be rejected, never truncated into a decodable one.
        let mut recv_buf = [0u8; MAX_MESSAGE_SIZE + 1];

        match self.socket.local_addr() {
            Ok(addr) => info!(bind_address = %addr, "DNS listener ready"),
            Err(e) => warn!(error = %e, "DNS listener ready on unknown address"),
        }

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("UdpDnsListener: shutting down");
                    break;
                }
                received = self.socket.recv_from(&mut recv_buf) => {
                    match received {
                        Ok((len, from)) => self.dispatch(&recv_buf[..len], from),
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => error!(error = %e, "UDP recv error"),
                    }
                }
            }
        }
    }

    fn dispatch(&self, datagram: &[u8], from: SocketAddr) {
        let pipeline = Arc::clone(&self.pipeline);
        let socket = Arc::clone(&self.socket);
        let owned: Arc<[u8]> = Arc::from(datagram);

        tokio::spawn(async move {
            let Some(reply) = pipeline.handle(&owned, from).await else {
                return;
            };
            match socket.send_to(&reply.bytes, from).await {
                Ok(_) => debug!(
                    client = %from,
                    bytes = reply.bytes.len(),
                    source = reply.source.as_str(),
                    "Reply sent"
                ),
                Err(e) => warn!(client = %from, error = %e, "Failed to send reply"),
            }
        });
    }
}
