//! Client agent configuration
//!
//! Settings for the Client Realtime Agent: where the relay lives and how hard
//! to try reconnecting to it.

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

/// Default relay address used by local development builds
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
/// Reconnect attempts before the agent gives up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Base delay multiplied by the attempt number
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(2000);
/// Outbound frames buffered while the socket writer catches up
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 64;

/// Client agent configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Relay base URL (`http(s)://` or `ws(s)://`)
    pub server_url: String,
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub outbound_capacity: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }
}

impl AgentConfig {
    /// Create a new AgentConfigBuilder
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_url("probe")?;
        if self.outbound_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "outbound_capacity",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// WebSocket URL for the relay, carrying `user_id` as connection identity
    pub fn socket_url(&self, user_id: &str) -> Result<Url, ConfigError> {
        let mut url = Url::parse(&self.server_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.server_url, e)))?;

        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(ConfigError::InvalidUrl(format!(
                    "unsupported scheme '{}' in {}",
                    other, self.server_url
                )))
            }
        };
        url.set_scheme(scheme)
            .map_err(|_| ConfigError::InvalidUrl(self.server_url.clone()))?;

        let path = format!("{}/socket", url.path().trim_end_matches('/'));
        url.set_path(&path);
        url.query_pairs_mut().clear().append_pair("userId", user_id);
        Ok(url)
    }
}

/// Builder for AgentConfig
#[derive(Debug, Default)]
pub struct AgentConfigBuilder {
    server_url: Option<String>,
    max_attempts: Option<u32>,
    base_delay: Option<Duration>,
    outbound_capacity: Option<usize>,
}

impl AgentConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = Some(delay);
        self
    }

    pub fn outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = Some(capacity);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AgentConfig, ConfigError> {
        let defaults = AgentConfig::default();
        let config = AgentConfig {
            server_url: self.server_url.unwrap_or(defaults.server_url),
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            base_delay: self.base_delay.unwrap_or(defaults.base_delay),
            outbound_capacity: self.outbound_capacity.unwrap_or(defaults.outbound_capacity),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
    #[error("failed to read config file {path}: {message}")]
    File { path: String, message: String },
}
