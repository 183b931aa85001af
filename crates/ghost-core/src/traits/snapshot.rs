//! Collaborator traits (ports) - what the realtime layer needs from the outside
//!
//! The domain layer defines the interface; the REST client crate provides
//! the implementation.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::value_objects::Handle;

/// Result type for collaborator calls
pub type PortResult<T> = Result<T, DomainError>;

// ============================================================================
// Online Snapshot
// ============================================================================

/// One-shot source of the handles currently online
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the handles that are online right now
    async fn online_snapshot(&self) -> PortResult<Vec<Handle>>;
}

/// Fixed snapshot, used where no REST collaborator is available
#[derive(Debug, Clone, Default)]
pub struct StaticSnapshot(pub Vec<Handle>);

#[async_trait]
impl SnapshotSource for StaticSnapshot {
    async fn online_snapshot(&self) -> PortResult<Vec<Handle>> {
        Ok(self.0.clone())
    }
}
