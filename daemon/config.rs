// Command line configuration for ipkcpd
use clap::{ArgAction, Parser, ValueEnum};
use std::ffi::OsString;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};

/// Transport binding the server is exposed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Textual protocol over TCP
    Tcp,
    /// Binary protocol over UDP
    Udp,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mode::Tcp => write!(f, "tcp"),
            Mode::Udp => write!(f, "udp"),
        }
    }
}

// `-h` belongs to the host, so clap's short help flag is replaced by `--help`.
#[derive(Debug, Parser)]
#[command(name = "ipkcpd")]
#[command(about = "Server for the IPK Calculator Protocol", long_about = None)]
#[command(version, disable_help_flag = true)]
pub struct Cli {
    /// IPv4 address to listen on
    #[arg(short = 'h', long = "host", value_name = "HOST")]
    pub host: Ipv4Addr,

    /// Port to listen on
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    pub port: u16,

    /// Protocol binding to serve
    #[arg(short = 'm', long = "mode", value_name = "MODE", value_enum)]
    pub mode: Mode,

    /// Print help
    #[arg(long = "help", action = ArgAction::Help)]
    #[allow(dead_code)]
    help: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub address: SocketAddrV4,
    pub mode: Mode,
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        ServerConfig {
            address: SocketAddrV4::new(cli.host, cli.port),
            mode: cli.mode,
        }
    }
}

/// Parse the argument list (program name first).
///
/// Help and version requests come back as errors too; callers tell them
/// apart with `clap::Error::use_stderr`.
pub fn parse_args<I, T>(args: I) -> Result<ServerConfig, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map(ServerConfig::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn parses_short_options_in_any_order() {
        let config = parse_args(["ipkcpd", "-m", "udp", "-p", "2023", "-h", "127.0.0.1"]).unwrap();
        assert_eq!(config.address, SocketAddrV4::new(Ipv4Addr::LOCALHOST, 2023));
        assert_eq!(config.mode, Mode::Udp);
    }

    #[test]
    fn parses_long_options() {
        let config =
            parse_args(["ipkcpd", "--host", "0.0.0.0", "--port", "10002", "--mode", "tcp"]).unwrap();
        assert_eq!(config.address.port(), 10002);
        assert_eq!(config.mode, Mode::Tcp);
    }

    #[test]
    fn all_options_are_required() {
        let err = parse_args(["ipkcpd", "-h", "127.0.0.1", "-p", "2023"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.use_stderr());
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(parse_args(["ipkcpd", "-h", "localhost", "-p", "1", "-m", "tcp"]).is_err());
        assert!(parse_args(["ipkcpd", "-h", "1.2.3", "-p", "1", "-m", "tcp"]).is_err());
        assert!(parse_args(["ipkcpd", "-h", "1.2.3.4", "-p", "65536", "-m", "tcp"]).is_err());
        assert!(parse_args(["ipkcpd", "-h", "1.2.3.4", "-p", "1", "-m", "sctp"]).is_err());
    }

    #[test]
    fn help_is_not_a_failure() {
        let err = parse_args(["ipkcpd", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(!err.use_stderr());
    }
}
