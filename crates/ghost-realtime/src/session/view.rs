//! Read-only session view for UI consumers

use super::SessionState;
use crate::connection::ConnectionState;
use crate::typing::TypingSet;
use ghost_core::{Conversation, Handle};
use tokio::time::Instant;

/// Copy of the session state as of the last change
///
/// Typing is stored as the raw set and evaluated against the clock when read.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub identity: Handle,
    pub connection: ConnectionState,
    pub online: Vec<Handle>,
    pub presence_synced: bool,
    pub conversation: Option<Conversation>,
    /// Bumped each time the session publishes a new view
    pub revision: u64,
    typing: TypingSet,
}

impl SessionView {
    pub(crate) fn new(state: &SessionState, connection: ConnectionState, revision: u64) -> Self {
        Self {
            identity: state.identity().clone(),
            connection,
            online: state.presence().online_handles(),
            presence_synced: state.presence().is_bootstrapped(),
            conversation: state.conversation().cloned(),
            revision,
            typing: state.inbound_typing().clone(),
        }
    }

    /// Check if a peer is online
    #[must_use]
    pub fn is_online(&self, handle: &Handle) -> bool {
        self.online.contains(handle)
    }

    /// Check if a peer is typing right now
    #[must_use]
    pub fn is_typing(&self, peer: &Handle) -> bool {
        self.typing.is_typing(peer, Instant::now())
    }

    /// Peers typing right now
    #[must_use]
    pub fn typing_peers(&self) -> Vec<Handle> {
        self.typing.typing_peers(Instant::now())
    }

    /// Peer of the open chat
    #[must_use]
    pub fn open_peer(&self) -> Option<&Handle> {
        self.conversation.as_ref().map(Conversation::peer)
    }
}
