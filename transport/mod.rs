// Transport module: listening endpoints and connections for both bindings
pub mod traits;
pub mod tcp;
pub mod udp;

pub use traits::*;
pub use tcp::*;
pub use udp::*;
