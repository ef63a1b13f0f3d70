// Shared harness: run a server on an ephemeral loopback port in a background thread
#![allow(dead_code)]

use ipkcpd::{DatagramServer, ShutdownToken, StreamServer};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpStream, UdpSocket};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const TIMEOUT: Option<Duration> = Some(Duration::from_secs(5));

#[derive(Clone, Copy)]
enum Binding {
    Stream,
    Datagram,
}

pub struct RunningServer {
    pub address: SocketAddr,
    binding: Binding,
    shutdown: ShutdownToken,
    handle: Option<JoinHandle<ipkcpd::Result<()>>>,
}

fn loopback() -> SocketAddrV4 {
    SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0)
}

pub fn start_stream_server() -> RunningServer {
    let shutdown = ShutdownToken::new();
    let server = StreamServer::bind(loopback(), shutdown.clone()).expect("bind stream server");
    let address = server.local_addr().expect("local address");
    RunningServer {
        address,
        binding: Binding::Stream,
        shutdown,
        handle: Some(thread::spawn(move || server.run())),
    }
}

pub fn start_datagram_server() -> RunningServer {
    let shutdown = ShutdownToken::new();
    let server = DatagramServer::bind(loopback(), shutdown.clone()).expect("bind datagram server");
    let address = server.local_addr().expect("local address");
    RunningServer {
        address,
        binding: Binding::Datagram,
        shutdown,
        handle: Some(thread::spawn(move || server.run())),
    }
}

impl RunningServer {
    /// Trigger shutdown, wake the loop out of poll and wait for it to finish.
    pub fn stop(mut self) -> ipkcpd::Result<()> {
        self.shutdown_and_join().expect("server thread already joined")
    }

    fn shutdown_and_join(&mut self) -> Option<ipkcpd::Result<()>> {
        let handle = self.handle.take()?;
        self.shutdown.trigger();
        match self.binding {
            Binding::Stream => {
                let _ = TcpStream::connect(self.address);
            }
            Binding::Datagram => {
                if let Ok(socket) = UdpSocket::bind(loopback()) {
                    let _ = socket.send_to(&[0xff], self.address);
                }
            }
        }
        Some(handle.join().expect("server thread panicked"))
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        let _ = self.shutdown_and_join();
    }
}
