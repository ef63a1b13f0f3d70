// Stream dispatch loop: one thread multiplexing the listener and up to
// MAX_CONNECTIONS clients with poll(2)
use crate::error::{DaemonError, Result};
use crate::shutdown::ShutdownToken;
use crate::table::ConnectionTable;
use ipkcp_core::text::{encode_response, TextResponse};
use ipkcp_core::Action;
use ipkcp_transport::{StreamConnection, StreamListener, Transport, TransportListener};
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use std::io::ErrorKind;
use std::net::{SocketAddr, SocketAddrV4};
use std::os::unix::io::AsFd;
use tracing::{debug, info, warn};

/// One read is one frame; nothing is buffered across reads.
pub const RECV_BUFFER_SIZE: usize = 1024;

/// Sources that became readable in one wait.
struct Readiness {
    listener: bool,
    slots: Vec<usize>,
}

pub struct StreamServer {
    listener: StreamListener,
    table: ConnectionTable<StreamConnection>,
    shutdown: ShutdownToken,
}

impl StreamServer {
    pub fn new(listener: StreamListener, shutdown: ShutdownToken) -> Self {
        StreamServer {
            listener,
            table: ConnectionTable::new(),
            shutdown,
        }
    }

    pub fn bind(address: SocketAddrV4, shutdown: ShutdownToken) -> Result<Self> {
        let listener = StreamListener::bind(address)
            .map_err(|source| DaemonError::Bind { address, source })?;
        Ok(Self::new(listener, shutdown))
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the shutdown token fires, then say `BYE` to every client.
    pub fn run(mut self) -> Result<()> {
        info!(local = %self.local_addr()?, "serving textual protocol");

        while !self.shutdown.is_triggered() {
            let ready = match self.wait()? {
                Some(ready) => ready,
                None => continue,
            };
            if self.shutdown.is_triggered() {
                break;
            }

            // Slots first: a peer that hung up frees its slot for a pending connect.
            for slot in ready.slots {
                self.service(slot);
            }
            if ready.listener {
                self.accept_one();
            }
        }

        self.close_all();
        Ok(())
    }

    // Blocks with no timeout. `None` means the wait was interrupted by a signal.
    fn wait(&self) -> Result<Option<Readiness>> {
        let mut slots = Vec::with_capacity(self.table.capacity());
        let mut fds = Vec::with_capacity(self.table.capacity() + 1);
        fds.push(PollFd::new(self.listener.as_fd(), PollFlags::POLLIN));
        for (slot, client) in self.table.iter() {
            slots.push(slot);
            fds.push(PollFd::new(client.connection.as_fd(), PollFlags::POLLIN));
        }

        match poll(&mut fds, PollTimeout::NONE) {
            Ok(_) => {}
            Err(Errno::EINTR) => return Ok(None),
            Err(e) => return Err(DaemonError::Poll(e)),
        }

        let listener = is_readable(&fds[0]);
        let slots = slots
            .into_iter()
            .zip(&fds[1..])
            .filter(|(_, fd)| is_readable(fd))
            .map(|(slot, _)| slot)
            .collect();
        Ok(Some(Readiness { listener, slots }))
    }

    fn accept_one(&mut self) {
        let connection = match self.listener.accept() {
            Ok(connection) => connection,
            Err(e) => {
                warn!(error = %e, "accept failed");
                return;
            }
        };

        let peer = connection.peer_addr();
        match self.table.insert(connection) {
            Ok(slot) => info!(%peer, slot, "client connected"),
            Err(mut rejected) => {
                warn!(%peer, capacity = self.table.capacity(), "connection table full, rejecting client");
                terminate(&mut rejected);
            }
        }
    }

    // Exactly one read, one state machine step and at most one write.
    fn service(&mut self, slot: usize) {
        let Some(client) = self.table.get_mut(slot) else {
            return;
        };
        let peer = client.connection.peer_addr();

        let mut buf = [0u8; RECV_BUFFER_SIZE];
        let frame: &[u8] = match client.connection.receive(&mut buf) {
            Ok(0) => {
                warn!(%peer, slot, "read returned no data");
                &[]
            }
            Ok(n) => {
                debug!(%peer, slot, bytes = n, "frame received");
                &buf[..n]
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => {
                debug!(%peer, slot, error = %e, "read abandoned");
                return;
            }
            Err(e) => {
                warn!(%peer, slot, error = %e, "read failed");
                &[]
            }
        };

        match client.session.handle_frame(frame) {
            Action::Reply(response) => {
                if let Err(e) = client.connection.send(&encode_response(&response)) {
                    warn!(%peer, slot, error = %e, "write failed");
                }
            }
            Action::Terminate(violation) => {
                warn!(%peer, slot, reason = %violation, "closing connection");
                if let Some(mut client) = self.table.remove(slot) {
                    terminate(&mut client.connection);
                }
            }
        }
    }

    fn close_all(&mut self) {
        info!(clients = self.table.len(), "shutting down stream server");
        for (slot, mut client) in self.table.drain() {
            client.session.close();
            debug!(peer = %client.connection.peer_addr(), slot, "notifying client of shutdown");
            terminate(&mut client.connection);
        }
    }
}

fn is_readable(fd: &PollFd) -> bool {
    fd.revents().is_some_and(|revents| {
        revents.intersects(PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR)
    })
}

// Send BYE, then shut the connection down. Failures are only logged.
fn terminate<T: Transport>(connection: &mut T) {
    let peer = connection.peer_addr();
    if let Err(e) = connection.send(&encode_response(&TextResponse::Bye)) {
        warn!(%peer, error = %e, "failed to send BYE");
    }
    if let Err(e) = connection.disconnect() {
        debug!(%peer, error = %e, "shutdown failed");
    }
}
