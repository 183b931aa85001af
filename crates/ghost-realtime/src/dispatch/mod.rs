//! Inbound frame routing

mod dispatcher;

pub use dispatcher::InboundDispatcher;
