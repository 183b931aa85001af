//! Port traits implemented outside the domain layer

mod snapshot;

pub use snapshot::{PortResult, SnapshotSource, StaticSnapshot};
