//! Message entity - an ephemeral chat message
//!
//! Messages exist only in the buffer of the currently open conversation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::DomainError;
use crate::value_objects::Handle;

/// Ephemeral message entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub sender: Handle,
    pub timestamp: DateTime<Utc>,
    pub is_mine: bool,
}

impl Message {
    /// Create a message received from a peer
    pub fn incoming(sender: Handle, text: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            sender,
            timestamp,
            is_mine: false,
        }
    }

    /// Create a message sent by the local user
    pub fn outgoing(sender: Handle, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            sender,
            timestamp: Utc::now(),
            is_mine: true,
        }
    }

    /// Get a truncated preview of the message (for notifications)
    pub fn preview(&self, max_len: usize) -> &str {
        if self.text.len() <= max_len {
            &self.text
        } else {
            let mut end = max_len;
            while !self.text.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &self.text[..end]
        }
    }
}

/// Trim outbound message text, rejecting text that is empty after trimming
pub fn normalize_text(text: &str) -> Result<String, DomainError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DomainError::EmptyMessage);
    }
    Ok(trimmed.to_string())
}
