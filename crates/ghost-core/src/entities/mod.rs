//! Domain entities - core business objects

mod conversation;
mod message;

pub use conversation::Conversation;
pub use message::{normalize_text, Message};
