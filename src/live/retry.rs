// src/live/retry.rs
use std::time::Duration;

/// Connection state of the live channel, published to the controller so
/// the view can show degraded mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Terminal: the attempt budget ran out. Polling is the only update
    /// source for the rest of the page's lifetime.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    /// Budget of failed connection attempts, the initial one included.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy {
            base_delay: Duration::from_secs(1),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnect attempt `attempt` (1-based):
    /// `base * 2^(attempt - 1)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// The channel's reconnect state machine, kept free of sockets and
/// timers so transitions can be tested directly.
#[derive(Debug)]
pub struct ChannelLifecycle {
    policy: ReconnectPolicy,
    state: ConnectionState,
    failed_attempts: u32,
    closed: bool,
}

impl ChannelLifecycle {
    pub fn new(policy: ReconnectPolicy) -> Self {
        ChannelLifecycle {
            policy,
            state: ConnectionState::Disconnected,
            failed_attempts: 0,
            closed: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn has_failed(&self) -> bool {
        self.state == ConnectionState::Failed
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn on_connecting(&mut self) {
        if !self.closed && self.state != ConnectionState::Failed {
            self.state = ConnectionState::Connecting;
        }
    }

    /// A connection was established; the failure budget starts over.
    pub fn on_open(&mut self) {
        if self.closed || self.state == ConnectionState::Failed {
            return;
        }
        self.state = ConnectionState::Connected;
        self.failed_attempts = 0;
    }

    /// The connection dropped (or never came up). Returns the delay
    /// before the next reconnect, or `None` when nothing further may be
    /// scheduled: after an explicit close, or once the budget is spent
    /// and the channel is `Failed`.
    pub fn on_close(&mut self) -> Option<Duration> {
        if self.closed || self.state == ConnectionState::Failed {
            return None;
        }

        self.failed_attempts += 1;
        if self.failed_attempts >= self.policy.max_attempts {
            self.state = ConnectionState::Failed;
            return None;
        }

        self.state = ConnectionState::Disconnected;
        Some(self.policy.delay_for(self.failed_attempts))
    }

    /// Navigation away from the page. Terminal; suppresses any further
    /// scheduling.
    pub fn on_explicit_close(&mut self) {
        self.closed = true;
        if self.state != ConnectionState::Failed {
            self.state = ConnectionState::Disconnected;
        }
    }
}
