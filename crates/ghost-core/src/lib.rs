//! # ghost-core
//!
//! Domain layer containing handles, ephemeral messages, and collaborator traits.
//! This crate has zero dependencies on infrastructure (network, runtime, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{normalize_text, Conversation, Message};
pub use error::DomainError;
pub use traits::{PortResult, SnapshotSource, StaticSnapshot};
pub use value_objects::{Handle, HandleParseError, PresenceStatus};
