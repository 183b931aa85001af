//! Session facade
//!
//! Wires the connection, dispatcher, presence, and typing together behind a
//! command handle, an event stream, and a read-only view.

mod events;
mod session;
mod state;
mod view;

pub use events::SessionEvent;
pub use session::{Session, SessionHandle};
pub use state::SessionState;
pub use view::SessionView;
