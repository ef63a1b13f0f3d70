// ipkcpd: IPK Calculator Protocol server (textual over TCP, binary over UDP)
use ipkcpd::config;
use ipkcpd::{install_signal_handlers, serve, ShutdownToken};
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const EXIT_OK: i32 = 0;
const EXIT_FAILURE: i32 = 1;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let config = match config::parse_args(std::env::args_os()) {
        Ok(config) => config,
        Err(e) => {
            // --help and --version land here as well
            let code = if e.use_stderr() { EXIT_FAILURE } else { EXIT_OK };
            let _ = e.print();
            process::exit(code);
        }
    };

    init_logging();

    let shutdown = ShutdownToken::new();
    if let Err(e) = install_signal_handlers(&shutdown) {
        error!(error = %e, "startup failed");
        process::exit(EXIT_FAILURE);
    }

    info!(address = %config.address, mode = %config.mode, "starting ipkcpd");
    if let Err(e) = serve(&config, shutdown) {
        error!(error = %e, "server stopped with an error");
        process::exit(EXIT_FAILURE);
    }
    info!("ipkcpd stopped");
}
