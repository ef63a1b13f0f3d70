// daemon: IPKCP server - dispatch loops for the textual (TCP) and binary (UDP) bindings
pub mod config;
pub mod error;
pub mod shutdown;
pub mod table;
pub mod stream;
pub mod datagram;

pub use config::{Mode, ServerConfig};
pub use datagram::DatagramServer;
pub use error::{DaemonError, Result};
pub use shutdown::{install_signal_handlers, ShutdownToken};
pub use stream::StreamServer;
pub use table::{ConnectionTable, MAX_CONNECTIONS};

/// Bind the endpoint for the configured mode and serve until shutdown.
pub fn serve(config: &ServerConfig, shutdown: ShutdownToken) -> Result<()> {
    match config.mode {
        Mode::Tcp => StreamServer::bind(config.address, shutdown)?.run(),
        Mode::Udp => DatagramServer::bind(config.address, shutdown)?.run(),
    }
}
