//! # ghost-realtime
//!
//! Realtime session layer: one persistent connection to the relay carrying
//! chat messages, typing indicators, and presence.

pub mod cli;
pub mod connection;
pub mod dispatch;
pub mod presence;
pub mod protocol;
pub mod session;
pub mod typing;

pub use connection::{ConnectionState, Connector, WebSocketConnector};
pub use session::{Session, SessionEvent, SessionHandle, SessionView};
