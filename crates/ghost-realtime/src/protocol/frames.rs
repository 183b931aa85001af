//! Frame format
//!
//! Every frame is a JSON object whose `type` field selects the variant.

use chrono::{DateTime, Utc};
use ghost_core::{Handle, PresenceStatus};
use serde::{Deserialize, Serialize};

use super::CodecError;

/// Frames the client writes to the relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    /// Liveness check; the relay answers with `pong`
    Ping,
    /// Chat message for a peer
    Message { recipient_id: Handle, text: String },
    /// Typing indicator for a peer
    Typing { recipient_id: Handle, is_typing: bool },
}

impl OutboundFrame {
    /// Create a message frame
    #[must_use]
    pub fn message(recipient_id: Handle, text: impl Into<String>) -> Self {
        Self::Message {
            recipient_id,
            text: text.into(),
        }
    }

    /// Create a typing frame
    #[must_use]
    pub fn typing(recipient_id: Handle, is_typing: bool) -> Self {
        Self::Typing {
            recipient_id,
            is_typing,
        }
    }

    /// Frame kind as it appears in the `type` field
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::Message { .. } => "message",
            Self::Typing { .. } => "typing",
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, CodecError> {
        serde_json::to_string(self).map_err(CodecError::Encode)
    }
}

/// Frames the relay delivers to the client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    /// Answer to `ping`
    Pong,
    /// Chat message from a peer
    Message {
        sender_id: Handle,
        text: String,
        timestamp: DateTime<Utc>,
    },
    /// Typing indicator from a peer
    Typing {
        sender_id: Handle,
        #[serde(default = "default_is_typing")]
        is_typing: bool,
    },
    /// Presence delta
    Status {
        user_id: Handle,
        status: PresenceStatus,
    },
    /// Relay acknowledgement of an outbound message
    MessageSent {
        recipient_id: Handle,
        delivered: bool,
        timestamp: DateTime<Utc>,
    },
    /// Any frame kind this client does not know
    #[serde(other)]
    Unknown,
}

fn default_is_typing() -> bool {
    true
}

impl InboundFrame {
    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        serde_json::from_str(json).map_err(CodecError::Malformed)
    }

    /// Frame kind as it appears in the `type` field
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Pong => "pong",
            Self::Message { .. } => "message",
            Self::Typing { .. } => "typing",
            Self::Status { .. } => "status",
            Self::MessageSent { .. } => "message_sent",
            Self::Unknown => "unknown",
        }
    }

    /// Check if the frame carries messages, typing, or presence
    #[must_use]
    pub const fn is_session_data(&self) -> bool {
        matches!(self, Self::Message { .. } | Self::Typing { .. } | Self::Status { .. })
    }
}

impl std::fmt::Display for OutboundFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ping => write!(f, "Frame(ping)"),
            Self::Message { recipient_id, .. } => write!(f, "Frame(message -> {recipient_id})"),
            Self::Typing {
                recipient_id,
                is_typing,
            } => write!(f, "Frame(typing={is_typing} -> {recipient_id})"),
        }
    }
}
