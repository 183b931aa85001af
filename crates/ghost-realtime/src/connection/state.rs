//! Connection lifecycle state

use serde::Serialize;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ConnectionState {
    /// No connection and none wanted (initial state, or after teardown)
    #[default]
    Disconnected,
    /// A connect attempt is in flight
    Connecting,
    /// Transport is open; frames can be written
    Connected,
    /// Transport was lost; a reconnect is scheduled
    ReconnectPending,
}

impl ConnectionState {
    /// Check if frames can be written
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Get the name of this state
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::ReconnectPending => "ReconnectPending",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
