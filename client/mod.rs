// client: IPKCP client library for both bindings (used by ipkcpc, benchmarks and tests)
use ipkcp_core::binary::{self, BinaryRequest, BinaryResponse, MAX_RESPONSE_LEN};
use ipkcp_core::text::{self, TextRequest, TextResponse};
use ipkcp_core::FrameError;
use ipkcp_transport::{DatagramEndpoint, StreamConnection, Transport};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid frame: {0}")]
    Frame(#[from] FrameError),

    #[error("connection closed by server")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Textual binding client. Responses are read line by line.
pub struct StreamClient {
    connection: StreamConnection,
    buffer: Vec<u8>,
    pending_data: Vec<u8>,
}

impl StreamClient {
    pub fn connect(address: SocketAddr) -> Result<Self> {
        Ok(StreamClient {
            connection: StreamConnection::connect(address)?,
            buffer: vec![0u8; 1024],
            pending_data: Vec::new(),
        })
    }

    pub fn set_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        Ok(self.connection.set_read_timeout(timeout)?)
    }

    pub fn hello(&mut self) -> Result<TextResponse> {
        self.send_raw(&text::encode_request(&TextRequest::Hello))
    }

    /// Send `SOLVE <expression>\n`.
    pub fn solve(&mut self, expression: &str) -> Result<TextResponse> {
        let mut line = expression.as_bytes().to_vec();
        line.push(b'\n');
        self.send_raw(&text::encode_request(&TextRequest::Solve(line)))
    }

    /// Write `frame` as-is and wait for the next response line.
    pub fn send_raw(&mut self, frame: &[u8]) -> Result<TextResponse> {
        self.connection.send(frame)?;
        self.read_response()
    }

    pub fn read_response(&mut self) -> Result<TextResponse> {
        loop {
            if let Some(end) = self.pending_data.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.pending_data.drain(..=end).collect();
                return Ok(text::decode_response(&line)?);
            }

            match self.connection.receive(&mut self.buffer)? {
                0 => return Err(ClientError::ConnectionClosed),
                n => self.pending_data.extend_from_slice(&self.buffer[..n]),
            }
        }
    }

    pub fn close(mut self) -> Result<()> {
        Ok(self.connection.disconnect()?)
    }
}

/// Binary binding client talking to a single server.
pub struct DatagramClient {
    endpoint: DatagramEndpoint,
    server: SocketAddr,
    buffer: Vec<u8>,
}

impl DatagramClient {
    pub fn new(server: SocketAddr) -> Result<Self> {
        let endpoint = DatagramEndpoint::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))?;
        Ok(DatagramClient {
            endpoint,
            server,
            buffer: vec![0u8; MAX_RESPONSE_LEN],
        })
    }

    pub fn set_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        Ok(self.endpoint.set_read_timeout(timeout)?)
    }

    pub fn solve(&mut self, expression: &str) -> Result<BinaryResponse> {
        let request = binary::encode_request(&BinaryRequest::new(expression.as_bytes()))?;
        self.send_raw(&request)?;
        let frame = self.receive_raw()?;
        Ok(binary::decode_response(&frame)?)
    }

    pub fn send_raw(&self, datagram: &[u8]) -> Result<()> {
        self.endpoint.send_to(datagram, self.server)?;
        Ok(())
    }

    /// Next datagram from the configured server; others are skipped.
    pub fn receive_raw(&mut self) -> Result<Vec<u8>> {
        loop {
            let (n, from) = self.endpoint.recv_from(&mut self.buffer)?;
            if from == self.server {
                return Ok(self.buffer[..n].to_vec());
            }
        }
    }
}
