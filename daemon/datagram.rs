// Datagram loop: receive, evaluate, reply; no state survives between datagrams
use crate::error::{DaemonError, Result};
use crate::shutdown::ShutdownToken;
use ipkcp_core::binary::{decode_request, encode_response, BinaryResponse};
use ipkcp_core::{evaluate, FrameError};
use ipkcp_transport::DatagramEndpoint;
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use std::net::{SocketAddr, SocketAddrV4};
use std::os::unix::io::AsFd;
use tracing::{debug, info, warn};

pub const DATAGRAM_BUFFER_SIZE: usize = 1024;

pub struct DatagramServer {
    endpoint: DatagramEndpoint,
    shutdown: ShutdownToken,
}

impl DatagramServer {
    pub fn new(endpoint: DatagramEndpoint, shutdown: ShutdownToken) -> Self {
        DatagramServer { endpoint, shutdown }
    }

    pub fn bind(address: SocketAddrV4, shutdown: ShutdownToken) -> Result<Self> {
        let endpoint = DatagramEndpoint::bind(address)
            .map_err(|source| DaemonError::Bind { address, source })?;
        Ok(Self::new(endpoint, shutdown))
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.endpoint.local_addr()?)
    }

    /// Serve datagrams one at a time until the shutdown token fires.
    pub fn run(self) -> Result<()> {
        info!(local = %self.local_addr()?, "serving binary protocol");

        let mut buf = [0u8; DATAGRAM_BUFFER_SIZE];
        while !self.shutdown.is_triggered() {
            if !self.wait()? || self.shutdown.is_triggered() {
                continue;
            }
            self.service(&mut buf);
        }

        info!("closing datagram endpoint");
        Ok(())
    }

    // Blocks with no timeout; false when interrupted by a signal.
    fn wait(&self) -> Result<bool> {
        let mut fds = [PollFd::new(self.endpoint.as_fd(), PollFlags::POLLIN)];
        match poll(&mut fds, PollTimeout::NONE) {
            Ok(_) => Ok(true),
            Err(Errno::EINTR) => Ok(false),
            Err(e) => Err(DaemonError::Poll(e)),
        }
    }

    fn service(&self, buf: &mut [u8]) {
        let (len, peer) = match self.endpoint.recv_from(buf) {
            Ok(received) => received,
            Err(e) => {
                warn!(error = %e, "recv_from failed");
                return;
            }
        };
        debug!(%peer, bytes = len, "datagram received");

        let response = match respond(&buf[..len]) {
            Ok(response) => response,
            Err(e) => {
                warn!(%peer, error = %e, "dropping undecodable datagram");
                return;
            }
        };

        if let Err(e) = self.endpoint.send_to(&response, peer) {
            warn!(%peer, error = %e, "send_to failed");
        }
    }
}

// Evaluation failures become error responses; only bad framing is an Err.
fn respond(datagram: &[u8]) -> std::result::Result<Vec<u8>, FrameError> {
    let request = decode_request(datagram)?;
    let outcome = evaluate(&request.expression);
    if let Err(e) = &outcome {
        debug!(error = %e, "expression rejected");
    }
    encode_response(&BinaryResponse::from_outcome(outcome))
}
