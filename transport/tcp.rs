// TCP transport: listening endpoint plus accepted or connected streams
use crate::traits::{Transport, TransportListener};
use nix::sys::socket::{
    bind, listen, setsockopt, socket, sockopt, AddressFamily, Backlog, SockFlag, SockType,
    SockaddrIn,
};
use std::io::{Read, Result, Write};
use std::net::{Shutdown, SocketAddr, SocketAddrV4, TcpListener, TcpStream};
use std::os::unix::io::{AsFd, AsRawFd, BorrowedFd};
use std::time::Duration;
use tracing::debug;

/// Pending-connection queue length; equals the daemon's connection cap.
pub const LISTEN_BACKLOG: i32 = 10;

pub struct StreamListener {
    listener: TcpListener,
}

impl StreamListener {
    /// Create an IPv4 stream socket with `SO_REUSEADDR`, bind it and start listening.
    pub fn bind(address: SocketAddrV4) -> Result<Self> {
        let fd = socket(
            AddressFamily::Inet,
            SockType::Stream,
            SockFlag::empty(),
            None,
        )?;
        setsockopt(&fd, sockopt::ReuseAddr, &true)?;
        bind(fd.as_raw_fd(), &SockaddrIn::from(address))?;
        listen(&fd, Backlog::new(LISTEN_BACKLOG)?)?;

        let listener = TcpListener::from(fd);
        debug!(local = %listener.local_addr()?, "stream listener bound");
        Ok(StreamListener { listener })
    }
}

impl TransportListener for StreamListener {
    type Connection = StreamConnection;

    fn accept(&mut self) -> Result<StreamConnection> {
        let (stream, peer) = self.listener.accept()?;
        Ok(StreamConnection { stream, peer })
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl AsFd for StreamListener {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.listener.as_fd()
    }
}

pub struct StreamConnection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl StreamConnection {
    pub fn connect(address: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(address)?;
        Ok(StreamConnection {
            stream,
            peer: address,
        })
    }

    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.stream.set_read_timeout(timeout)
    }
}

impl Transport for StreamConnection {
    fn send(&mut self, data: &[u8]) -> Result<usize> {
        self.stream.write_all(data)?;
        Ok(data.len())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.stream.read(buf)
    }

    fn disconnect(&mut self) -> Result<()> {
        self.stream.shutdown(Shutdown::Both)
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

impl AsFd for StreamConnection {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.stream.as_fd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::socket::getsockopt;
    use std::net::Ipv4Addr;

    fn loopback() -> SocketAddrV4 {
        SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0)
    }

    #[test]
    fn listener_reuses_address() {
        let listener = StreamListener::bind(loopback()).unwrap();
        assert!(getsockopt(&listener, sockopt::ReuseAddr).unwrap());
    }

    #[test]
    fn accepted_connection_exchanges_bytes() {
        let mut listener = StreamListener::bind(loopback()).unwrap();
        let address = listener.local_addr().unwrap();

        let mut client = StreamConnection::connect(address).unwrap();
        let mut server = listener.accept().unwrap();
        assert_eq!(server.peer_addr().ip(), address.ip());

        client.send(b"HELLO\n").unwrap();
        let mut buf = [0u8; 16];
        let n = server.receive(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"HELLO\n");

        server.disconnect().unwrap();
        assert_eq!(client.receive(&mut buf).unwrap(), 0);
    }
}
