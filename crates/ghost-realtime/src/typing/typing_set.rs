//! Inbound typing indicators
//!
//! Peer handle to expiry instant. A peer is typing while present and
//! `now < expiry`; reads evaluate that directly, so stale entries are harmless.

use ghost_core::Handle;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Peers currently typing to the local user
#[derive(Debug, Clone)]
pub struct TypingSet {
    expiry: Duration,
    entries: HashMap<Handle, Instant>,
}

impl TypingSet {
    /// Create an empty set; `typing:true` holds for `expiry`
    #[must_use]
    pub fn new(expiry: Duration) -> Self {
        Self {
            expiry,
            entries: HashMap::new(),
        }
    }

    /// Apply an inbound typing frame
    ///
    /// Returns true if the peer's visible typing state flipped.
    pub fn apply(&mut self, sender: Handle, is_typing: bool, now: Instant) -> bool {
        let was_typing = self.is_typing(&sender, now);

        if is_typing {
            self.entries.insert(sender, now + self.expiry);
        } else {
            self.entries.remove(&sender);
        }

        was_typing != is_typing
    }

    /// Check if a peer is typing at `now`
    #[must_use]
    pub fn is_typing(&self, peer: &Handle, now: Instant) -> bool {
        self.entries.get(peer).is_some_and(|expiry| now < *expiry)
    }

    /// Peers typing at `now`, sorted
    #[must_use]
    pub fn typing_peers(&self, now: Instant) -> Vec<Handle> {
        let mut peers: Vec<Handle> = self
            .entries
            .iter()
            .filter(|(_, expiry)| now < **expiry)
            .map(|(peer, _)| peer.clone())
            .collect();
        peers.sort();
        peers
    }

    /// Earliest expiry still in the set
    #[must_use]
    pub fn next_expiry(&self) -> Option<Instant> {
        self.entries.values().min().copied()
    }

    /// Drop expired entries, returning the peers that stopped typing
    pub fn sweep(&mut self, now: Instant) -> Vec<Handle> {
        let mut expired = Vec::new();
        self.entries.retain(|peer, expiry| {
            let live = now < *expiry;
            if !live {
                expired.push(peer.clone());
            }
            live
        });
        expired.sort();
        expired
    }
}
