//! Value objects - immutable types that represent domain concepts

mod handle;
mod presence_status;

pub use handle::{Handle, HandleParseError};
pub use presence_status::PresenceStatus;
