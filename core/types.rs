// Core types shared by both IPKCP bindings
use std::fmt;

/// Opcode byte that starts every binary frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Request = 0x00,
    Response = 0x01,
}

impl Opcode {
    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            0x00 => Some(Opcode::Request),
            0x01 => Some(Opcode::Response),
            _ => None,
        }
    }
}

/// Status byte of a binary response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    Error = 0x01,
}

impl Status {
    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            0x00 => Some(Status::Ok),
            0x01 => Some(Status::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::Error => write!(f, "ERR"),
        }
    }
}

/// Value as it travels on the wire: both bindings transmit the magnitude
/// only, so `-7` is sent as `7` and `i32::MIN` as `2147483648`.
pub fn wire_magnitude(value: i32) -> u32 {
    value.unsigned_abs()
}
