// Core module: evaluator, wire codecs and connection state machine (NO I/O dependencies)
pub mod types;
pub mod error;
pub mod expr;
pub mod text;
pub mod binary;
pub mod session;

pub use types::*;
pub use error::*;
pub use expr::{evaluate, Operator};
pub use session::{Action, Session, SessionState, Violation};
