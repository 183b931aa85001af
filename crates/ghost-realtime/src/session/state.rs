//! Mutable session state
//!
//! Owned by the session task; nothing else holds a reference to it.

use crate::presence::PresenceTracker;
use crate::typing::{TypingCoordinator, TypingSet};
use ghost_common::RealtimeConfig;
use ghost_core::{Conversation, Handle};

/// Everything the realtime layer mutates
#[derive(Debug)]
pub struct SessionState {
    identity: Handle,
    pub(crate) presence: PresenceTracker,
    pub(crate) inbound_typing: TypingSet,
    pub(crate) outbound_typing: TypingCoordinator,
    pub(crate) conversation: Option<Conversation>,
}

impl SessionState {
    #[must_use]
    pub fn new(identity: Handle, config: &RealtimeConfig) -> Self {
        Self {
            presence: PresenceTracker::new(identity.clone()),
            inbound_typing: TypingSet::new(config.typing_expiry),
            outbound_typing: TypingCoordinator::new(config.typing_throttle, config.typing_idle),
            conversation: None,
            identity,
        }
    }

    /// Local identity
    #[must_use]
    pub fn identity(&self) -> &Handle {
        &self.identity
    }

    /// Presence tracker
    #[must_use]
    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    /// Inbound typing set
    #[must_use]
    pub fn inbound_typing(&self) -> &TypingSet {
        &self.inbound_typing
    }

    /// Open conversation, if any
    #[must_use]
    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    /// Peer of the open conversation
    #[must_use]
    pub fn open_peer(&self) -> Option<&Handle> {
        self.conversation.as_ref().map(Conversation::peer)
    }
}
