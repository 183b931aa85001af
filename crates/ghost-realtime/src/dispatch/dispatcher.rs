//! Inbound frame dispatcher
//!
//! Routes each decoded frame to presence, typing, or the open conversation.
//! Frames are handled one at a time, in the order the transport delivered
//! them.

use crate::protocol::InboundFrame;
use crate::session::{SessionEvent, SessionState};
use ghost_core::Message;
use tokio::time::Instant;

/// Dispatch inbound frames to the session state
pub struct InboundDispatcher;

impl InboundDispatcher {
    /// Decode a raw text frame and dispatch it
    ///
    /// Malformed frames are logged and dropped.
    pub fn dispatch_text(state: &mut SessionState, text: &str, now: Instant) -> Option<SessionEvent> {
        Self::decode(text).and_then(|frame| Self::dispatch(state, frame, now))
    }

    /// Decode a raw text frame, logging and dropping malformed ones
    pub fn decode(text: &str) -> Option<InboundFrame> {
        match InboundFrame::from_json(text) {
            Ok(frame) => Some(frame),
            Err(e) => {
                tracing::warn!(error = %e, frame = %text, "Ignoring malformed frame");
                None
            }
        }
    }

    /// Handle a decoded frame
    pub fn dispatch(state: &mut SessionState, frame: InboundFrame, now: Instant) -> Option<SessionEvent> {
        match frame {
            InboundFrame::Message {
                sender_id,
                text,
                timestamp,
            } => {
                let message = Message::incoming(sender_id, text, timestamp);

                match state.conversation.as_mut() {
                    Some(conversation) if conversation.is_with(&message.sender) => {
                        conversation.push(message.clone());
                        tracing::debug!(peer = %message.sender, "Message appended to open chat");
                        Some(SessionEvent::MessageReceived { message })
                    }
                    _ => {
                        tracing::debug!(peer = %message.sender, "Message for a chat that is not open");
                        Some(SessionEvent::Notification { message })
                    }
                }
            }
            InboundFrame::Typing {
                sender_id,
                is_typing,
            } => {
                let changed = state.inbound_typing.apply(sender_id.clone(), is_typing, now);
                changed.then_some(SessionEvent::TypingChanged {
                    peer: sender_id,
                    is_typing,
                })
            }
            InboundFrame::Status { user_id, status } => state
                .presence
                .apply_delta(user_id.clone(), status)
                .map(|status| SessionEvent::PresenceChanged {
                    handle: user_id,
                    status,
                }),
            InboundFrame::Pong => {
                tracing::trace!("Heartbeat acknowledged");
                None
            }
            InboundFrame::MessageSent {
                recipient_id,
                delivered,
                ..
            } => {
                tracing::trace!(peer = %recipient_id, delivered, "Relay acknowledged message");
                None
            }
            InboundFrame::Unknown => {
                tracing::debug!("Ignoring frame of unknown kind");
                None
            }
        }
    }
}
