//! Datagram transport collaborator and the standard UDP implementation.
//!
//! A [`Transport`] moves single datagrams for a synchronization exchange:
//! resolve the server, send one query, wait a bounded time for one reply.
//! [`UdpTransport`] is the std implementation; tests inject mocks.

use log::debug;

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

/// Select the appropriate bind address based on the target address family.
///
/// Returns `0.0.0.0:0` for IPv4 targets and `[::]:0` for IPv6 targets.
pub(crate) fn bind_addr_for(target: &SocketAddr) -> SocketAddr {
    match target {
        SocketAddr::V4(_) => SocketAddr::from(([0, 0, 0, 0], 0)),
        SocketAddr::V6(_) => SocketAddr::from(([0u16; 8], 0)),
    }
}

/// Collaborator that moves the datagrams of one exchange.
pub trait Transport {
    /// Resolve a host name and port to a concrete socket address.
    fn resolve(&mut self, host: &str, port: u16) -> io::Result<SocketAddr>;

    /// Send one datagram to the resolved address.
    fn send(&mut self, addr: SocketAddr, payload: &[u8]) -> io::Result<()>;

    /// Wait up to `timeout` for one inbound datagram.
    ///
    /// Returns the number of bytes received. A timeout surfaces as an error
    /// of kind [`io::ErrorKind::TimedOut`] or [`io::ErrorKind::WouldBlock`],
    /// depending on the platform.
    fn recv(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize>;
}

/// UDP transport: one fresh socket per exchange, connected to the server so
/// the OS discards datagrams from any other source.
#[derive(Debug, Default)]
pub struct UdpTransport {
    sock: Option<UdpSocket>,
}

impl UdpTransport {
    /// Create a transport with no socket open.
    pub fn new() -> Self {
        UdpTransport { sock: None }
    }
}

impl Transport for UdpTransport {
    fn resolve(&mut self, host: &str, port: u16) -> io::Result<SocketAddr> {
        (host, port).to_socket_addrs()?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("address resolved to no socket addresses: {host}"),
            )
        })
    }

    fn send(&mut self, addr: SocketAddr, payload: &[u8]) -> io::Result<()> {
        let sock = UdpSocket::bind(bind_addr_for(&addr))?;
        sock.connect(addr)?;
        let sz = sock.send(payload)?;
        debug!("{:?}", sock.local_addr());
        debug!("sent: {} bytes to {}", sz, addr);
        self.sock = Some(sock);
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8], timeout: Duration) -> io::Result<usize> {
        let sock = self.sock.take().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "no query datagram in flight")
        })?;
        sock.set_read_timeout(Some(timeout))?;
        let recv_len = sock.recv(buf)?;
        debug!("recv: {} bytes", recv_len);
        Ok(recv_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_addr_matches_family() {
        let v4: SocketAddr = "192.0.2.1:123".parse().unwrap();
        assert_eq!(bind_addr_for(&v4), "0.0.0.0:0".parse().unwrap());

        let v6: SocketAddr = "[2001:db8::1]:123".parse().unwrap();
        assert_eq!(bind_addr_for(&v6), "[::]:0".parse().unwrap());
    }

    #[test]
    fn test_resolve_literal_address() {
        let mut transport = UdpTransport::new();
        let addr = transport.resolve("127.0.0.1", 123).unwrap();
        assert_eq!(addr, "127.0.0.1:123".parse().unwrap());
    }

    #[test]
    fn test_recv_without_send_is_not_connected() {
        let mut transport = UdpTransport::new();
        let mut buf = [0u8; 48];
        let err = transport
            .recv(&mut buf, Duration::from_millis(10))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
    }

    #[test]
    fn test_send_then_recv_times_out_on_silent_peer() {
        // A bound socket that never replies.
        let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = silent.local_addr().unwrap();

        let mut transport = UdpTransport::new();
        transport.send(addr, &[0u8; 48]).unwrap();
        let mut buf = [0u8; 48];
        let err = transport
            .recv(&mut buf, Duration::from_millis(50))
            .unwrap_err();
        assert!(
            err.kind() == io::ErrorKind::TimedOut || err.kind() == io::ErrorKind::WouldBlock,
            "unexpected kind: {:?}",
            err.kind()
        );
    }
}
