//! Conversation buffer for the currently open chat

use serde::Serialize;

use super::Message;
use crate::value_objects::Handle;

/// In-memory message buffer of one open chat
///
/// Dropped as soon as the chat is left; there is no cross-chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversation {
    peer: Handle,
    messages: Vec<Message>,
}

impl Conversation {
    /// Open an empty conversation with a peer
    pub fn new(peer: Handle) -> Self {
        Self {
            peer,
            messages: Vec::new(),
        }
    }

    /// The peer this conversation is with
    pub fn peer(&self) -> &Handle {
        &self.peer
    }

    /// Check whether a sender belongs to this conversation
    pub fn is_with(&self, handle: &Handle) -> bool {
        &self.peer == handle
    }

    /// Append a message in arrival order
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Messages in arrival order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
