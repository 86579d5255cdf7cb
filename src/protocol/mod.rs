//! Wire protocol: message types, text codec, and blocking TCP exchanges.

pub mod message;
pub mod transport;

pub use message::{Message, ProtocolError};
