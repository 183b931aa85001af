//! Connection management
//!
//! Owns the persistent connection to the relay, its heartbeat, and reconnects.

mod heartbeat;
mod manager;
mod state;
pub(crate) mod transport;

pub use heartbeat::HeartbeatMonitor;
pub use manager::{ConnectionEvent, ConnectionManager};
pub use state::ConnectionState;
pub use transport::{Connector, TransportError, TransportLink, WebSocketConnector};
