//! Test helpers for integration tests
//!
//! Builds client configuration pointed at a [`TestRelay`] and starts real
//! sessions over WebSocket.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use ghost_api::ApiClient;
use ghost_common::{ApiConfig, RealtimeConfig};
use ghost_core::Handle;
use ghost_realtime::{Session, SessionEvent, SessionHandle, WebSocketConnector};
use tokio::sync::broadcast;

use crate::relay::TestRelay;

/// How long to wait for an expected event
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Parse a handle, panicking on bad test input
pub fn handle(s: &str) -> Handle {
    Handle::parse(s).expect("valid test handle")
}

/// Realtime config with short timers, pointed at the relay
pub fn realtime_config(relay: &TestRelay) -> RealtimeConfig {
    RealtimeConfig {
        ws_url: relay.ws_url(),
        reconnect_delay: Duration::from_millis(200),
        ..RealtimeConfig::default()
    }
}

/// REST config pointed at the relay
pub fn api_config(relay: &TestRelay) -> ApiConfig {
    ApiConfig {
        base_url: relay.api_url(),
        timeout: Duration::from_secs(5),
    }
}

/// A running session plus its event stream
pub struct TestClient {
    pub identity: Handle,
    pub session: SessionHandle,
    pub events: broadcast::Receiver<SessionEvent>,
}

impl TestClient {
    /// Start a session for `identity` using the relay's REST snapshot
    pub async fn connect(relay: &TestRelay, identity: &str) -> Result<Self> {
        let api = Arc::new(ApiClient::new(&api_config(relay))?);
        let identity = handle(identity);

        let (session, events) = Session::start(
            realtime_config(relay),
            identity.clone(),
            Arc::new(WebSocketConnector),
            api,
        );

        let mut client = Self {
            identity,
            session,
            events,
        };
        // Connect and snapshot race each other
        let (mut connected, mut synced) = (false, false);
        while !(connected && synced) {
            match client
                .expect(|e| matches!(e, SessionEvent::Connected | SessionEvent::PresenceSynced { .. }))
                .await?
            {
                SessionEvent::Connected => connected = true,
                _ => synced = true,
            }
        }
        Ok(client)
    }

    /// Wait for an event matching `pred`, skipping others
    pub async fn expect<F>(&mut self, pred: F) -> Result<SessionEvent>
    where
        F: Fn(&SessionEvent) -> bool,
    {
        let events = &mut self.events;
        let wait = async {
            loop {
                let event = events.recv().await?;
                if pred(&event) {
                    return Ok::<_, broadcast::error::RecvError>(event);
                }
            }
        };

        match tokio::time::timeout(EVENT_TIMEOUT, wait).await {
            Ok(event) => Ok(event?),
            Err(_) => anyhow::bail!("{} did not see the expected event", self.identity),
        }
    }
}
