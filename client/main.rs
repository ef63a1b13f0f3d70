// ipkcpc: line-oriented client for an ipkcpd server
use clap::{ArgAction, Parser, ValueEnum};
use ipkcp_client::{ClientError, DatagramClient, StreamClient};
use ipkcp_core::text::{encode_response, TextResponse};
use std::io::{self, BufRead};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::process;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Tcp,
    Udp,
}

#[derive(Parser)]
#[command(name = "ipkcpc")]
#[command(about = "Reads expressions from stdin and prints the server's answers", long_about = None)]
#[command(version, disable_help_flag = true)]
struct Cli {
    /// Server IPv4 address
    #[arg(short = 'h', long = "host", value_name = "HOST")]
    host: Ipv4Addr,

    /// Server port
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    port: u16,

    /// Protocol binding
    #[arg(short = 'm', long = "mode", value_name = "MODE", value_enum)]
    mode: Mode,

    /// Print help
    #[arg(long = "help", action = ArgAction::Help)]
    #[allow(dead_code)]
    help: Option<bool>,
}

fn print_text(response: &TextResponse) {
    print!("{}", String::from_utf8_lossy(&encode_response(response)));
}

fn run_stream(server: SocketAddr) -> Result<(), ClientError> {
    let mut client = StreamClient::connect(server)?;
    let greeting = client.hello()?;
    print_text(&greeting);
    if greeting == TextResponse::Bye {
        return Ok(());
    }

    for line in io::stdin().lock().lines() {
        let response = client.solve(line?.trim_end())?;
        print_text(&response);
        if response == TextResponse::Bye {
            return Ok(());
        }
    }
    client.close()
}

fn run_datagram(server: SocketAddr) -> Result<(), ClientError> {
    let mut client = DatagramClient::new(server)?;
    for line in io::stdin().lock().lines() {
        let response = client.solve(line?.trim_end())?;
        println!("{}:{}", response.status, response.payload_text());
    }
    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };

    let server = SocketAddr::V4(SocketAddrV4::new(cli.host, cli.port));
    let result = match cli.mode {
        Mode::Tcp => run_stream(server),
        Mode::Udp => run_datagram(server),
    };

    if let Err(e) = result {
        eprintln!("ERR: {}", e);
        process::exit(1);
    }
}
