use lechr_dns_application::use_cases::ResolveQueryUseCase;
use lechr_dns_infrastructure::dns::UdpDnsListener;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Bind the client-facing socket and serve until `shutdown` is cancelled.
pub async fn start_dns_server(
    socket_addr: SocketAddr,
    pipeline: Arc<ResolveQueryUseCase>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    info!(bind_address = %socket_addr, "Starting DNS server");

    let socket = Arc::new(create_udp_socket(socket_addr)?);
    UdpDnsListener::new(socket, pipeline)
        .with_cancellation(shutdown)
        .run()
        .await;

    Ok(())
}

fn create_udp_socket(socket_addr: SocketAddr) -> anyhow::Result<UdpSocket> {
    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_reuse_address(true)?;
    socket.set_recv_buffer_size(512 * 1024)?;
    socket.set_send_buffer_size(512 * 1024)?;
    socket.bind(&socket_addr.into())?;
    socket.set_nonblocking(true)?;

    let std_socket: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(std_socket)?)
}
