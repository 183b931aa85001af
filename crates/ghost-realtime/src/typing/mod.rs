//! Typing indicators
//!
//! Outbound throttling and idle expiry, plus the inbound typing set.

mod coordinator;
mod typing_set;

pub use coordinator::TypingCoordinator;
pub use typing_set::TypingSet;
