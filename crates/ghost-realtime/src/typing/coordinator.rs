//! Outbound typing coordinator
//!
//! A state machine over explicit instants: the caller passes `now` in and
//! arms its own timer from [`TypingCoordinator::idle_deadline`]. Throttle and
//! idle windows are tracked independently.

use crate::protocol::OutboundFrame;
use ghost_core::Handle;
use std::time::Duration;
use tokio::time::Instant;

/// Throttles outbound `typing:true` and ends it after an idle window
#[derive(Debug, Clone)]
pub struct TypingCoordinator {
    throttle: Duration,
    idle: Duration,
    peer: Option<Handle>,
    last_sent_at: Option<Instant>,
    idle_deadline: Option<Instant>,
    /// A `typing:true` went out and no `typing:false` followed it yet
    outstanding: bool,
}

impl TypingCoordinator {
    #[must_use]
    pub fn new(throttle: Duration, idle: Duration) -> Self {
        Self {
            throttle,
            idle,
            peer: None,
            last_sent_at: None,
            idle_deadline: None,
            outstanding: false,
        }
    }

    /// Local text input changed while chatting with `peer`
    ///
    /// Re-arms the idle window and returns `typing:true` unless one was sent
    /// to this peer within the throttle window.
    pub fn on_input(&mut self, now: Instant, peer: &Handle) -> Option<OutboundFrame> {
        if self.peer.as_ref() != Some(peer) {
            self.peer = Some(peer.clone());
            self.last_sent_at = None;
            self.outstanding = false;
        }

        self.idle_deadline = Some(now + self.idle);

        let throttled = self
            .last_sent_at
            .is_some_and(|sent| now.duration_since(sent) <= self.throttle);
        if throttled {
            return None;
        }

        self.last_sent_at = Some(now);
        self.outstanding = true;
        Some(OutboundFrame::typing(peer.clone(), true))
    }

    /// The idle timer fired
    ///
    /// Returns `typing:false` once if the deadline has passed and a
    /// `typing:true` is outstanding.
    pub fn on_idle_expired(&mut self, now: Instant) -> Option<OutboundFrame> {
        match self.idle_deadline {
            Some(deadline) if now >= deadline => {
                self.idle_deadline = None;
                self.finish()
            }
            _ => None,
        }
    }

    /// A message was sent; typing stops immediately
    pub fn on_send(&mut self) -> Option<OutboundFrame> {
        self.idle_deadline = None;
        self.last_sent_at = None;
        self.finish()
    }

    /// The chat was left; typing stops for the peer being left
    pub fn on_leave(&mut self) -> Option<OutboundFrame> {
        self.idle_deadline = None;
        self.last_sent_at = None;
        let frame = self.finish();
        self.peer = None;
        frame
    }

    fn finish(&mut self) -> Option<OutboundFrame> {
        if !std::mem::take(&mut self.outstanding) {
            return None;
        }
        self.peer
            .as_ref()
            .map(|peer| OutboundFrame::typing(peer.clone(), false))
    }

    /// When the idle timer should fire, if armed
    #[must_use]
    pub fn idle_deadline(&self) -> Option<Instant> {
        self.idle_deadline
    }

    /// When the last `typing:true` was emitted
    #[must_use]
    pub fn last_sent_at(&self) -> Option<Instant> {
        self.last_sent_at
    }

    /// Check if a `typing:true` is outstanding
    #[must_use]
    pub fn is_outstanding(&self) -> bool {
        self.outstanding
    }
}
