//! Events published to UI subscribers

use ghost_core::{Handle, Message, PresenceStatus};
use serde::Serialize;

/// Session event, delivered in the order the session produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Connection to the relay is open
    Connected,
    /// Connection lost; live features are unavailable until it reopens
    Disconnected,
    /// Message from the peer of the open chat, appended to the conversation
    MessageReceived { message: Message },
    /// Message from a peer whose chat is not open
    Notification { message: Message },
    /// A peer started or stopped typing
    TypingChanged { peer: Handle, is_typing: bool },
    /// A peer's presence changed
    PresenceChanged { handle: Handle, status: PresenceStatus },
    /// The online snapshot was applied
    PresenceSynced { online: Vec<Handle> },
}

impl SessionEvent {
    /// Event name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::MessageReceived { .. } => "message_received",
            Self::Notification { .. } => "notification",
            Self::TypingChanged { .. } => "typing_changed",
            Self::PresenceChanged { .. } => "presence_changed",
            Self::PresenceSynced { .. } => "presence_synced",
        }
    }
}
