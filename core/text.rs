// Textual binding: newline-terminated ASCII lines over a stream connection
use crate::error::FrameError;
use crate::types::wire_magnitude;

pub const HELLO: &[u8] = b"HELLO\n";
pub const BYE: &[u8] = b"BYE\n";
pub const SOLVE_PREFIX: &[u8] = b"SOLVE ";
pub const RESULT_PREFIX: &[u8] = b"RESULT ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextRequest {
    Hello,
    /// Expression bytes exactly as received, including the line terminator.
    Solve(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextResponse {
    Hello,
    /// Magnitude of the evaluated value; see [`TextResponse::result`].
    Result(u32),
    Bye,
}

impl TextResponse {
    /// Build a `RESULT` response. The sign of negative values is not transmitted.
    pub fn result(value: i32) -> Self {
        TextResponse::Result(wire_magnitude(value))
    }
}

pub fn decode_request(frame: &[u8]) -> Result<TextRequest, FrameError> {
    if frame == HELLO {
        Ok(TextRequest::Hello)
    } else if let Some(expression) = frame.strip_prefix(SOLVE_PREFIX) {
        Ok(TextRequest::Solve(expression.to_vec()))
    } else {
        Err(FrameError::MalformedLine)
    }
}

pub fn encode_request(request: &TextRequest) -> Vec<u8> {
    match request {
        TextRequest::Hello => HELLO.to_vec(),
        TextRequest::Solve(expression) => {
            let mut bytes = Vec::with_capacity(SOLVE_PREFIX.len() + expression.len());
            bytes.extend_from_slice(SOLVE_PREFIX);
            bytes.extend_from_slice(expression);
            bytes
        }
    }
}

pub fn encode_response(response: &TextResponse) -> Vec<u8> {
    match response {
        TextResponse::Hello => HELLO.to_vec(),
        TextResponse::Bye => BYE.to_vec(),
        TextResponse::Result(magnitude) => format!("RESULT {}\n", magnitude).into_bytes(),
    }
}

pub fn decode_response(frame: &[u8]) -> Result<TextResponse, FrameError> {
    if frame == HELLO {
        return Ok(TextResponse::Hello);
    }
    if frame == BYE {
        return Ok(TextResponse::Bye);
    }

    let digits = frame
        .strip_prefix(RESULT_PREFIX)
        .and_then(|rest| rest.strip_suffix(b"\n"))
        .ok_or(FrameError::MalformedLine)?;
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(FrameError::MalformedLine);
    }

    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .map(TextResponse::Result)
        .ok_or(FrameError::MalformedLine)
}
