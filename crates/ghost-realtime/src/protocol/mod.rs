//! Wire protocol definitions
//!
//! JSON text frames discriminated by their `type` field.

mod error;
mod frames;

pub use error::CodecError;
pub use frames::{InboundFrame, OutboundFrame};
