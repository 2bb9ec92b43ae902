//! # Reconnect Policy and Connection State Machine
//!
//! A small, synchronous state machine tracking one agent connection:
//!
//! ```text
//! Disconnected --begin_connect--> Connecting --on_connected--> Connected
//!      ^                            |    ^                         |
//!      |       GiveUp               |    |   RetryAfter            |
//!      +----------------------------+    +------on_connection_lost-+
//! ```
//!
//! ## Backoff
//!
//! Linear: retry `n` (1-based) waits `base_delay × n`. With the defaults
//! (5 retries, 2s base) the agent waits 2s, 4s, 6s, 8s, 10s and then gives up.
//! A successful connection resets the retry budget.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::shared::config::{AgentConfig, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};

/// Bounded linear backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Retries allowed after the initial attempt
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay)
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// What to do after a failed attempt or a dropped connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter { attempt: u32, delay: Duration },
    GiveUp,
}

#[derive(Debug, Clone)]
pub struct ConnectionMachine {
    policy: ReconnectPolicy,
    state: ConnectionState,
    attempts: u32,
    connected_since: Option<DateTime<Utc>>,
}

impl ConnectionMachine {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            state: ConnectionState::Disconnected,
            attempts: 0,
            connected_since: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Retries used since the last successful connection
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    pub fn connected_since(&self) -> Option<DateTime<Utc>> {
        self.connected_since
    }

    pub fn begin_connect(&mut self) {
        self.state = ConnectionState::Connecting;
    }

    pub fn on_connected(&mut self) {
        self.state = ConnectionState::Connected;
        self.attempts = 0;
        self.connected_since = Some(Utc::now());
    }

    pub fn on_connect_failed(&mut self) -> RetryDecision {
        self.next_retry()
    }

    pub fn on_connection_lost(&mut self) -> RetryDecision {
        self.connected_since = None;
        self.next_retry()
    }

    /// Back to `Disconnected` with a fresh retry budget
    pub fn reset(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.attempts = 0;
        self.connected_since = None;
    }

    fn next_retry(&mut self) -> RetryDecision {
        if self.attempts >= self.policy.max_attempts {
            self.state = ConnectionState::Disconnected;
            return RetryDecision::GiveUp;
        }
        self.attempts += 1;
        self.state = ConnectionState::Connecting;
        RetryDecision::RetryAfter {
            attempt: self.attempts,
            delay: self.policy.delay_for(self.attempts),
        }
    }
}
