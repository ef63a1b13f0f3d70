// Binary binding: opcode/status/length-prefixed frames, one per datagram
//
// Request:  [0x00][len][expression ...]
// Response: [0x01][status][len][payload ...]
use crate::error::{FrameError, ParseError};
use crate::types::{wire_magnitude, Opcode, Status};

pub const REQUEST_HEADER_LEN: usize = 2;
pub const RESPONSE_HEADER_LEN: usize = 3;
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize;
pub const MAX_REQUEST_LEN: usize = REQUEST_HEADER_LEN + MAX_PAYLOAD_LEN;
pub const MAX_RESPONSE_LEN: usize = RESPONSE_HEADER_LEN + MAX_PAYLOAD_LEN;

/// Diagnostic carried by every error response.
pub const PARSE_ERROR_MESSAGE: &[u8] = b"Could not parse the message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryRequest {
    /// Expression bytes; no terminator is implied.
    pub expression: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryResponse {
    pub status: Status,
    pub payload: Vec<u8>,
}

impl BinaryRequest {
    pub fn new(expression: impl Into<Vec<u8>>) -> Self {
        BinaryRequest {
            expression: expression.into(),
        }
    }
}

impl BinaryResponse {
    /// Success carries the decimal magnitude of the value, failure the fixed diagnostic.
    pub fn from_outcome(outcome: Result<i32, ParseError>) -> Self {
        match outcome {
            Ok(value) => BinaryResponse {
                status: Status::Ok,
                payload: wire_magnitude(value).to_string().into_bytes(),
            },
            Err(_) => BinaryResponse {
                status: Status::Error,
                payload: PARSE_ERROR_MESSAGE.to_vec(),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    pub fn payload_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

fn payload_len(payload: &[u8]) -> Result<u8, FrameError> {
    u8::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLong(payload.len()))
}

fn ensure_len(frame: &[u8], needed: usize) -> Result<(), FrameError> {
    if frame.len() < needed {
        Err(FrameError::Truncated {
            needed,
            actual: frame.len(),
        })
    } else {
        Ok(())
    }
}

pub fn encode_request(request: &BinaryRequest) -> Result<Vec<u8>, FrameError> {
    let len = payload_len(&request.expression)?;
    let mut bytes = Vec::with_capacity(REQUEST_HEADER_LEN + request.expression.len());
    bytes.push(Opcode::Request as u8);
    bytes.push(len);
    bytes.extend_from_slice(&request.expression);
    Ok(bytes)
}

/// Bytes past the declared payload length are ignored.
pub fn decode_request(frame: &[u8]) -> Result<BinaryRequest, FrameError> {
    ensure_len(frame, REQUEST_HEADER_LEN)?;
    if frame[0] != Opcode::Request as u8 {
        return Err(FrameError::UnexpectedOpcode(frame[0]));
    }

    let end = REQUEST_HEADER_LEN + frame[1] as usize;
    ensure_len(frame, end)?;
    Ok(BinaryRequest::new(&frame[REQUEST_HEADER_LEN..end]))
}

pub fn encode_response(response: &BinaryResponse) -> Result<Vec<u8>, FrameError> {
    let len = payload_len(&response.payload)?;
    let mut bytes = Vec::with_capacity(RESPONSE_HEADER_LEN + response.payload.len());
    bytes.push(Opcode::Response as u8);
    bytes.push(response.status as u8);
    bytes.push(len);
    bytes.extend_from_slice(&response.payload);
    Ok(bytes)
}

pub fn decode_response(frame: &[u8]) -> Result<BinaryResponse, FrameError> {
    ensure_len(frame, RESPONSE_HEADER_LEN)?;
    if frame[0] != Opcode::Response as u8 {
        return Err(FrameError::UnexpectedOpcode(frame[0]));
    }
    let status = Status::from_u8(frame[1]).ok_or(FrameError::UnknownStatus(frame[1]))?;

    let end = RESPONSE_HEADER_LEN + frame[2] as usize;
    ensure_len(frame, end)?;
    Ok(BinaryResponse {
        status,
        payload: frame[RESPONSE_HEADER_LEN..end].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::evaluate;

    fn respond(frame: &[u8]) -> Vec<u8> {
        let request = decode_request(frame).unwrap();
        encode_response(&BinaryResponse::from_outcome(evaluate(&request.expression))).unwrap()
    }

    #[test]
    fn evaluates_request_frame() {
        let frame = [0x00, 0x07, b'(', b'+', b' ', b'1', b' ', b'2', b')'];
        assert_eq!(respond(&frame), vec![0x01, 0x00, 0x01, b'3']);
    }

    #[test]
    fn unparsable_expression_yields_error_frame() {
        let request = encode_request(&BinaryRequest::new(&b"(+ 1)"[..])).unwrap();
        let response = respond(&request);

        assert_eq!(&response[..3], &[0x01, 0x01, 0x1B]);
        assert_eq!(&response[3..], PARSE_ERROR_MESSAGE);
        assert_eq!(response.len(), RESPONSE_HEADER_LEN + 27);
    }

    #[test]
    fn negative_results_lose_their_sign() {
        let request = encode_request(&BinaryRequest::new(&b"(- 1 10)"[..])).unwrap();
        assert_eq!(respond(&request), vec![0x01, 0x00, 0x01, b'9']);
    }

    #[test]
    fn request_without_implicit_terminator() {
        let request = decode_request(&[0x00, 0x03, b'1', b'2', b'3', b'x', b'y']).unwrap();
        assert_eq!(request.expression, b"123");
    }

    #[test]
    fn rejects_wrong_opcode_and_short_frames() {
        assert_eq!(
            decode_request(&[0x01, 0x01, b'1']),
            Err(FrameError::UnexpectedOpcode(0x01))
        );
        assert_eq!(
            decode_request(&[0x00]),
            Err(FrameError::Truncated { needed: 2, actual: 1 })
        );
        assert_eq!(
            decode_request(&[0x00, 0x05, b'1']),
            Err(FrameError::Truncated { needed: 7, actual: 3 })
        );
        assert_eq!(
            decode_response(&[0x01, 0x02, 0x00]),
            Err(FrameError::UnknownStatus(0x02))
        );
    }

    #[test]
    fn payload_limit_is_enforced() {
        let request = BinaryRequest::new(vec![b'1'; MAX_PAYLOAD_LEN + 1]);
        assert_eq!(
            encode_request(&request),
            Err(FrameError::PayloadTooLong(MAX_PAYLOAD_LEN + 1))
        );

        let request = BinaryRequest::new(vec![b'1'; MAX_PAYLOAD_LEN]);
        assert_eq!(encode_request(&request).unwrap().len(), MAX_REQUEST_LEN);
    }

    #[test]
    fn responses_round_trip_byte_for_byte() {
        let ok = vec![0x01, 0x00, 0x02, b'4', b'2'];
        let mut err = vec![0x01, 0x01, PARSE_ERROR_MESSAGE.len() as u8];
        err.extend_from_slice(PARSE_ERROR_MESSAGE);

        for frame in [ok, err] {
            let decoded = decode_response(&frame).unwrap();
            assert_eq!(encode_response(&decoded).unwrap(), frame);
        }
    }
}
