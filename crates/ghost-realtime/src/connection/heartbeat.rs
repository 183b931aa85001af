//! Heartbeat monitor
//!
//! Emits a liveness tick every interval while the connection is open. It never
//! decides the connection is dead; that is left to the transport reporting closure.

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Periodic liveness timer, armed only while connected
#[derive(Debug)]
pub struct HeartbeatMonitor {
    period: Duration,
    ticker: Option<Interval>,
    last_sent_at: Option<Instant>,
    sent: u64,
}

impl HeartbeatMonitor {
    /// Create a stopped monitor
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            ticker: None,
            last_sent_at: None,
            sent: 0,
        }
    }

    /// Arm the timer; the first tick fires one full period from now
    ///
    /// A zero period leaves the monitor stopped.
    pub fn start(&mut self) {
        if self.period.is_zero() {
            tracing::warn!("Heartbeat period is zero, heartbeat disabled");
            return;
        }
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.ticker = Some(ticker);
    }

    /// Disarm the timer
    pub fn stop(&mut self) {
        self.ticker = None;
    }

    /// Check if the timer is armed
    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Wait for the next tick; pending forever while stopped
    ///
    /// Cancel safe.
    pub async fn tick(&mut self) {
        match self.ticker.as_mut() {
            Some(ticker) => {
                ticker.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }

    /// Record that a ping was written
    pub fn record_sent(&mut self, at: Instant) {
        self.last_sent_at = Some(at);
        self.sent += 1;
    }

    /// When the last ping was written
    pub fn last_sent_at(&self) -> Option<Instant> {
        self.last_sent_at
    }

    /// Number of pings written over the monitor's lifetime
    pub fn sent(&self) -> u64 {
        self.sent
    }
}
