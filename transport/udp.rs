// UDP transport: a single datagram endpoint, one frame per datagram
use std::io::Result;
use std::net::{SocketAddr, SocketAddrV4, UdpSocket};
use std::os::unix::io::{AsFd, BorrowedFd};
use std::time::Duration;
use tracing::debug;

pub struct DatagramEndpoint {
    socket: UdpSocket,
}

impl DatagramEndpoint {
    pub fn bind(address: SocketAddrV4) -> Result<Self> {
        let socket = UdpSocket::bind(address)?;
        debug!(local = %socket.local_addr()?, "datagram endpoint bound");
        Ok(DatagramEndpoint { socket })
    }

    pub fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        self.socket.recv_from(buf)
    }

    pub fn send_to(&self, data: &[u8], peer: SocketAddr) -> Result<usize> {
        self.socket.send_to(data, peer)
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        self.socket.set_read_timeout(timeout)
    }
}

impl AsFd for DatagramEndpoint {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.socket.as_fd()
    }
}
