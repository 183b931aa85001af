//! Connection manager
//!
//! Owns the single transport to the relay: opens it, notices when it goes
//! away, and schedules exactly one fixed-delay reconnect at a time.

use super::{Connector, ConnectionState, HeartbeatMonitor, TransportError, TransportLink};
use crate::protocol::OutboundFrame;
use ghost_common::RealtimeConfig;
use ghost_core::Handle;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

/// Lifecycle and data events surfaced by the connection manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Transport is open
    Opened,
    /// Transport closed or a connect attempt failed; a reconnect is scheduled
    Closed,
    /// Reconnect timer fired and a new attempt is in flight
    Reconnecting,
    /// Raw text frame received
    Frame(String),
}

/// Result of a spawned connect attempt
struct AttemptOutcome {
    generation: u64,
    result: Result<TransportLink, TransportError>,
}

/// What woke the manager up
enum Wake {
    Attempt(AttemptOutcome),
    Inbound(Option<String>),
    Heartbeat,
    Reconnect,
}

/// Owns the connection to the relay
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    config: RealtimeConfig,
    identity: Option<Handle>,
    state: ConnectionState,
    /// False once torn down; nothing reconnects after that
    desired: bool,
    /// Bumped on every attempt and on teardown; stale attempts are discarded
    generation: u64,
    link: Option<TransportLink>,
    reconnect_at: Option<Instant>,
    reconnects: u64,
    heartbeat: HeartbeatMonitor,
    attempts_tx: mpsc::UnboundedSender<AttemptOutcome>,
    attempts_rx: mpsc::UnboundedReceiver<AttemptOutcome>,
}

impl ConnectionManager {
    /// Create a disconnected manager
    pub fn new(connector: Arc<dyn Connector>, config: RealtimeConfig) -> Self {
        let (attempts_tx, attempts_rx) = mpsc::unbounded_channel();
        let heartbeat = HeartbeatMonitor::new(config.heartbeat_interval);

        Self {
            connector,
            config,
            identity: None,
            state: ConnectionState::Disconnected,
            desired: false,
            generation: 0,
            link: None,
            reconnect_at: None,
            reconnects: 0,
            heartbeat,
            attempts_tx,
            attempts_rx,
        }
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Identity the connection was opened for
    pub fn identity(&self) -> Option<&Handle> {
        self.identity.as_ref()
    }

    /// Check if a reconnect timer is outstanding
    pub fn has_pending_reconnect(&self) -> bool {
        self.reconnect_at.is_some()
    }

    /// Number of reconnect timers that have fired
    pub fn reconnects(&self) -> u64 {
        self.reconnects
    }

    /// Heartbeat monitor (read-only)
    pub fn heartbeat(&self) -> &HeartbeatMonitor {
        &self.heartbeat
    }

    /// Start connecting for an identity
    ///
    /// No-op unless the manager is `Disconnected`.
    pub fn open(&mut self, identity: Handle) {
        if self.state != ConnectionState::Disconnected {
            tracing::warn!(state = %self.state, "Open requested while not disconnected");
            return;
        }

        self.identity = Some(identity);
        self.desired = true;
        self.begin_attempt();
    }

    /// Tear the connection down; nothing reconnects afterwards
    pub fn close(&mut self) {
        self.desired = false;
        self.generation += 1;
        self.reconnect_at = None;
        self.heartbeat.stop();

        // Dropping the link closes the transport
        if self.link.take().is_some() {
            tracing::info!(identity = ?self.identity, "Connection closed");
        }
        self.state = ConnectionState::Disconnected;
    }

    /// Write a frame if connected; otherwise it is dropped
    ///
    /// Returns whether the frame was handed to the transport.
    pub fn send(&mut self, frame: &OutboundFrame) -> bool {
        let Some(link) = self.link.as_ref().filter(|_| self.state.is_connected()) else {
            tracing::debug!(frame = %frame, state = %self.state, "Dropping frame while not connected");
            return false;
        };

        let text = match frame.to_json() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(frame = %frame, error = %e, "Failed to encode frame");
                return false;
            }
        };

        // A failed write means the transport task is gone; the closed inbound
        // channel reports that on the next poll.
        if link.outbound.send(text).is_err() {
            tracing::debug!(frame = %frame, "Transport gone, frame dropped");
            return false;
        }

        tracing::trace!(frame = %frame, "Frame sent");
        true
    }

    /// Wait for the next connection event
    ///
    /// Heartbeats are handled internally. Cancel safe:
    /// every await point only completes by consuming an event that is then
    /// processed synchronously.
    pub async fn next_event(&mut self) -> ConnectionEvent {
        loop {
            let wake = tokio::select! {
                Some(outcome) = self.attempts_rx.recv() => Wake::Attempt(outcome),
                frame = recv_link(&mut self.link) => Wake::Inbound(frame),
                () = self.heartbeat.tick() => Wake::Heartbeat,
                () = sleep_until_opt(self.reconnect_at) => Wake::Reconnect,
            };

            match wake {
                Wake::Attempt(outcome) => {
                    if let Some(event) = self.on_attempt(outcome) {
                        return event;
                    }
                }
                Wake::Inbound(Some(text)) => return ConnectionEvent::Frame(text),
                Wake::Inbound(None) => {
                    tracing::info!(identity = ?self.identity, "Transport closed");
                    self.on_transport_lost();
                    return ConnectionEvent::Closed;
                }
                Wake::Heartbeat => self.send_ping(),
                Wake::Reconnect => {
                    self.reconnect_at = None;
                    self.reconnects += 1;
                    tracing::info!(identity = ?self.identity, "Reconnecting");
                    self.begin_attempt();
                    return ConnectionEvent::Reconnecting;
                }
            }
        }
    }

    fn begin_attempt(&mut self) {
        let Some(identity) = self.identity.as_ref() else {
            return;
        };

        self.generation += 1;
        self.state = ConnectionState::Connecting;

        let generation = self.generation;
        let endpoint = self.config.endpoint(identity);
        let connector = Arc::clone(&self.connector);
        let attempts_tx = self.attempts_tx.clone();

        tracing::debug!(endpoint = %endpoint, generation, "Connecting");

        tokio::spawn(async move {
            let result = connector.connect(&endpoint).await;
            // Receiver only goes away with the manager itself
            let _ = attempts_tx.send(AttemptOutcome { generation, result });
        });
    }

    fn on_attempt(&mut self, outcome: AttemptOutcome) -> Option<ConnectionEvent> {
        if outcome.generation != self.generation || !self.desired {
            // Dropping a stale link closes it
            tracing::debug!(
                generation = outcome.generation,
                current = self.generation,
                "Discarding stale connect attempt"
            );
            return None;
        }

        match outcome.result {
            Ok(link) => {
                self.link = Some(link);
                self.state = ConnectionState::Connected;
                self.heartbeat.start();
                tracing::info!(identity = ?self.identity, "Connected");
                Some(ConnectionEvent::Opened)
            }
            Err(e) => {
                tracing::warn!(identity = ?self.identity, error = %e, "Connect attempt failed");
                self.on_transport_lost();
                Some(ConnectionEvent::Closed)
            }
        }
    }

    fn on_transport_lost(&mut self) {
        self.link = None;
        self.heartbeat.stop();

        if !self.desired {
            self.state = ConnectionState::Disconnected;
            return;
        }

        self.state = ConnectionState::ReconnectPending;
        if self.reconnect_at.is_none() {
            self.reconnect_at = Some(Instant::now() + self.config.reconnect_delay);
            tracing::debug!(
                delay_ms = duration_ms(self.config.reconnect_delay),
                "Reconnect scheduled"
            );
        }
    }

    fn send_ping(&mut self) {
        if self.send(&OutboundFrame::Ping) {
            self.heartbeat.record_sent(Instant::now());
            tracing::trace!(sent = self.heartbeat.sent(), "Heartbeat sent");
        }
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("identity", &self.identity)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("reconnect_at", &self.reconnect_at)
            .finish()
    }
}

async fn recv_link(link: &mut Option<TransportLink>) -> Option<String> {
    match link {
        Some(link) => link.inbound.recv().await,
        None => std::future::pending().await,
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn duration_ms(d: Duration) -> u64 {
    d.as_millis() as u64
}
