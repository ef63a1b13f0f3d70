// Error types for evaluation and frame decoding
use thiserror::Error;

/// Why an expression could not be evaluated.
///
/// Both bindings collapse every variant into one failure category on the
/// wire; the detail is only for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected byte 0x{found:02x} at offset {offset}")]
    UnexpectedByte { offset: usize, found: u8 },

    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEnd { offset: usize },

    #[error("integer literal at offset {offset} does not fit in 32 bits")]
    LiteralOutOfRange { offset: usize },

    #[error("division by zero")]
    DivisionByZero,

    #[error("trailing input after expression at offset {offset}")]
    TrailingInput { offset: usize },
}

/// Frame that does not follow either binding's wire format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame truncated: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },

    #[error("unexpected opcode 0x{0:02x}")]
    UnexpectedOpcode(u8),

    #[error("unknown status 0x{0:02x}")]
    UnknownStatus(u8),

    #[error("payload of {0} bytes exceeds the 255 byte limit")]
    PayloadTooLong(usize),

    #[error("malformed text message")]
    MalformedLine,
}
