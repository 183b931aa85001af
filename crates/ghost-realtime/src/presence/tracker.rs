//! Presence tracker
//!
//! Folds the one-shot online snapshot and the stream of status deltas into a
//! single online set. Deltas that arrive before the snapshot are queued and
//! replayed right after it, in receipt order, so a late snapshot never
//! overrides newer information.

use ghost_core::{Handle, PresenceStatus};
use std::collections::BTreeSet;

/// Online set for every peer except the local identity
#[derive(Debug, Clone)]
pub struct PresenceTracker {
    local: Handle,
    online: BTreeSet<Handle>,
    bootstrapped: bool,
    pending: Vec<(Handle, PresenceStatus)>,
}

impl PresenceTracker {
    /// Create an empty, not yet bootstrapped tracker
    #[must_use]
    pub fn new(local: Handle) -> Self {
        Self {
            local,
            online: BTreeSet::new(),
            bootstrapped: false,
            pending: Vec::new(),
        }
    }

    /// Install the snapshot, then replay queued deltas
    ///
    /// A later call replaces the set wholesale with the new snapshot.
    pub fn bootstrap<I>(&mut self, snapshot: I)
    where
        I: IntoIterator<Item = Handle>,
    {
        self.online = snapshot
            .into_iter()
            .filter(|handle| *handle != self.local)
            .collect();
        self.bootstrapped = true;

        let pending = std::mem::take(&mut self.pending);
        let replayed = pending.len();
        for (handle, status) in pending {
            self.apply(handle, status);
        }

        tracing::debug!(
            online = self.online.len(),
            replayed,
            "Presence bootstrapped"
        );
    }

    /// Apply one status delta
    ///
    /// Returns the new status when the set actually changed. Before bootstrap
    /// the delta is queued and `None` is returned.
    pub fn apply_delta(&mut self, handle: Handle, status: PresenceStatus) -> Option<PresenceStatus> {
        if handle == self.local {
            return None;
        }

        if !self.bootstrapped {
            tracing::trace!(handle = %handle, status = %status, "Queueing presence delta until bootstrap");
            self.pending.push((handle, status));
            return None;
        }

        self.apply(handle, status).then_some(status)
    }

    fn apply(&mut self, handle: Handle, status: PresenceStatus) -> bool {
        if status.is_online() {
            self.online.insert(handle)
        } else {
            self.online.remove(&handle)
        }
    }

    /// Check if a peer is online
    #[must_use]
    pub fn is_online(&self, handle: &Handle) -> bool {
        self.online.contains(handle)
    }

    /// Status of a peer
    #[must_use]
    pub fn status(&self, handle: &Handle) -> PresenceStatus {
        PresenceStatus::from_online(self.is_online(handle))
    }

    /// Online peers in handle order
    #[must_use]
    pub fn online_handles(&self) -> Vec<Handle> {
        self.online.iter().cloned().collect()
    }

    /// Check if the snapshot has been applied
    #[must_use]
    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    /// Number of deltas waiting for the snapshot
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
