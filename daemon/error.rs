// Error types for the daemon
use std::net::SocketAddrV4;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddrV4,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("poll failed: {0}")]
    Poll(#[source] nix::errno::Errno),

    #[error("failed to install signal handler: {0}")]
    Signal(#[source] nix::errno::Errno),
}

pub type Result<T> = std::result::Result<T, DaemonError>;
