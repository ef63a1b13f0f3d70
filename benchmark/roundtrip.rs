// roundtrip.rs - End-to-end request/response throughput against an in-process daemon
use crate::report::ThroughputResult;
use ipkcp_client::{DatagramClient, StreamClient};
use ipkcp_core::text::TextResponse;
use ipkcpd::{DatagramServer, ShutdownToken, StreamServer};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpStream, UdpSocket};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const EXPRESSION: &str = "(* (+ 1 2 3) (- 10 4) 2)";
const RECEIVE_TIMEOUT: Option<Duration> = Some(Duration::from_secs(2));

struct LocalServer {
    address: SocketAddr,
    shutdown: ShutdownToken,
    handle: JoinHandle<ipkcpd::Result<()>>,
}

fn loopback() -> SocketAddrV4 {
    SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0)
}

fn start_stream() -> ipkcpd::Result<LocalServer> {
    let shutdown = ShutdownToken::new();
    let server = StreamServer::bind(loopback(), shutdown.clone())?;
    let address = server.local_addr()?;
    let handle = thread::spawn(move || server.run());
    Ok(LocalServer { address, shutdown, handle })
}

fn start_datagram() -> ipkcpd::Result<LocalServer> {
    let shutdown = ShutdownToken::new();
    let server = DatagramServer::bind(loopback(), shutdown.clone())?;
    let address = server.local_addr()?;
    let handle = thread::spawn(move || server.run());
    Ok(LocalServer { address, shutdown, handle })
}

impl LocalServer {
    // The loops block in poll with no timeout; poke them after raising the flag.
    fn stop(self, datagram: bool) {
        self.shutdown.trigger();
        if datagram {
            if let Ok(socket) = UdpSocket::bind(loopback()) {
                let _ = socket.send_to(&[0xff], self.address);
            }
        } else {
            let _ = TcpStream::connect(self.address);
        }
        match self.handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => eprintln!("Server error: {}", e),
            Err(_) => eprintln!("Server thread panicked"),
        }
    }
}

pub fn bench_datagram_roundtrip(requests: usize) -> ThroughputResult {
    println!("\n=== Benchmarking UDP Round Trip ({} requests) ===", requests);

    let server = match start_datagram() {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Error: cannot start datagram server: {}", e);
            return ThroughputResult::new("UDP round trip", 0, 1, Duration::ZERO);
        }
    };

    let mut issued = 0u64;
    let mut failures = 0u64;
    let start = Instant::now();
    match DatagramClient::new(server.address) {
        Ok(mut client) => {
            let _ = client.set_timeout(RECEIVE_TIMEOUT);
            for _ in 0..requests {
                issued += 1;
                match client.solve(EXPRESSION) {
                    Ok(response) if response.is_ok() => {}
                    _ => failures += 1,
                }
            }
        }
        Err(e) => {
            eprintln!("Error: cannot create client: {}", e);
            failures = 1;
        }
    }
    let duration = start.elapsed();

    server.stop(true);
    ThroughputResult::new("UDP round trip", issued, failures, duration)
}

pub fn bench_stream_roundtrip(requests: usize) -> ThroughputResult {
    println!("\n=== Benchmarking TCP Round Trip ({} requests) ===", requests);

    let server = match start_stream() {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Error: cannot start stream server: {}", e);
            return ThroughputResult::new("TCP round trip", 0, 1, Duration::ZERO);
        }
    };

    // A failed SOLVE ends the session, so the run stops at the first one.
    let mut issued = 0u64;
    let mut failures = 0u64;
    let start = Instant::now();
    match StreamClient::connect(server.address) {
        Ok(mut client) => {
            let _ = client.set_timeout(RECEIVE_TIMEOUT);
            if !matches!(client.hello(), Ok(TextResponse::Hello)) {
                failures = 1;
            } else {
                for _ in 0..requests {
                    issued += 1;
                    match client.solve(EXPRESSION) {
                        Ok(TextResponse::Result(_)) => {}
                        _ => {
                            failures += 1;
                            break;
                        }
                    }
                }
            }
        }
        Err(e) => {
            eprintln!("Error: cannot connect: {}", e);
            failures = 1;
        }
    }
    let duration = start.elapsed();

    server.stop(false);
    ThroughputResult::new("TCP round trip", issued, failures, duration)
}
