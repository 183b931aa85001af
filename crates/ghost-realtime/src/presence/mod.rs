//! Presence tracking

mod tracker;

pub use tracker::PresenceTracker;
