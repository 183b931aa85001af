//! Integration test utilities for the ghostchat client
//!
//! This crate provides an in-process relay and helpers for running
//! end-to-end tests of the realtime session layer over real WebSockets.

pub mod helpers;
pub mod relay;

pub use helpers::*;
pub use relay::TestRelay;
