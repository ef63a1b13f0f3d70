// Transport abstraction - keeps the dispatch loop independent of socket types
use std::io::Result;
use std::net::SocketAddr;

pub trait Transport: Send {
    fn send(&mut self, data: &[u8]) -> Result<usize>;
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize>;
    fn disconnect(&mut self) -> Result<()>;
    fn peer_addr(&self) -> SocketAddr;
}

pub trait TransportListener: Send {
    type Connection: Transport;

    fn accept(&mut self) -> Result<Self::Connection>;
    fn local_addr(&self) -> Result<SocketAddr>;
}
