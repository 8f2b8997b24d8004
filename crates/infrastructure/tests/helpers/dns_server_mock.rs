#![allow(dead_code)]
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy)]
pub enum MockBehavior {
    /// One A record per reply.
    Answer { addr: Ipv4Addr, ttl: u32 },
    /// NOERROR with zero answers.
    Empty,
    /// Reply with a transaction id that does not match the query.
    WrongId,
    /// Receive but never reply.
    Silent,
}

pub struct MockDnsServer {
    addr: SocketAddr,
    received: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(behavior: MockBehavior) -> Result<Self, std::io::Error> {
        Self::start_with_delay(behavior, Duration::ZERO).await
    }

    pub async fn start_with_delay(
        behavior: MockBehavior,
        delay: Duration,
    ) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let local_addr = socket.local_addr()?;
        let socket = Arc::new(socket);
        let received = Arc::new(AtomicUsize::new(0));

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let counter = Arc::clone(&received);

        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        counter.fetch_add(1, Ordering::SeqCst);

                        let Some(response) = Self::build_mock_response(&buf[..len], behavior) else {
                            continue;
                        };
                        let socket = Arc::clone(&socket);
                        tokio::spawn(async move {
                            if !delay.is_zero() {
                                tokio::time::sleep(delay).await;
                            }
                            let _ = socket.send_to(&response, peer).await;
                        });
                    }
                }
            }
        });

        Ok(Self {
            addr: local_addr,
            received,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn received(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }

    fn build_mock_response(query: &[u8], behavior: MockBehavior) -> Option<Vec<u8>> {
        if query.len() < 12 {
            return None;
        }

        let (answer, id) = match behavior {
            MockBehavior::Silent => return None,
            MockBehavior::Answer { addr, ttl } => (Some((addr, ttl)), [query[0], query[1]]),
            MockBehavior::Empty => (None, [query[0], query[1]]),
            MockBehavior::WrongId => (None, [query[0] ^ 0xFF, query[1]]),
        };

        let mut response = Vec::with_capacity(512);

        response.extend_from_slice(&id);

        // QR + RD, RA
        response.push(0x81);
        response.push(0x80);

        // QDCOUNT, ANCOUNT, NSCOUNT, ARCOUNT
        response.extend_from_slice(&query[4..6]);
        response.extend_from_slice(&[0x00, if answer.is_some() { 0x01 } else { 0x00 }]);
        response.extend_from_slice(&[0x00, 0x00]);
        response.extend_from_slice(&[0x00, 0x00]);

        response.extend_from_slice(&query[12..]);

        if let Some((addr, ttl)) = answer {
            response.extend_from_slice(&[0xc0, 0x0c, 0x00, 0x01, 0x00, 0x01]);
            response.extend_from_slice(&ttl.to_be_bytes());
            response.extend_from_slice(&[0x00, 0x04]);
            response.extend_from_slice(&addr.octets());
        }

        Some(response)
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
