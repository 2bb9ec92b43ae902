/**
 * Server Configuration
 *
 * This module handles loading and validation of the relay process settings.
 *
 * # Configuration Sources
 *
 * 1. Built-in defaults suitable for local development
 * 2. An optional TOML file named by `CHATWIRE_CONFIG`
 * 3. Environment variables (after `.env` is loaded), which win
 *
 * # Optional Services
 *
 * SMTP, the push gateway and the profile directory are optional. A missing
 * setting is logged as a warning and the matching feature is disabled; the
 * relay itself always starts.
 */

use reqwest::Url;
use serde::Deserialize;

use crate::shared::ConfigError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CLIENT_URL: &str = "http://localhost:5173";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 64;

/// Environment variable naming the optional TOML file
pub const CONFIG_FILE_VAR: &str = "CHATWIRE_CONFIG";

/// Relay process settings
///
/// TOML keys are the field names:
///
/// ```toml
/// port = 3000
/// client_url = "https://chat.example.com"
/// push_gateway_url = "http://127.0.0.1:8787/send"
/// smtp_user = "relay@example.com"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Browser app origin, used for CORS and notification deep links
    pub client_url: String,
    pub push_gateway_url: Option<String>,
    pub vapid_public_key: Option<String>,
    pub smtp_host: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    /// Per-connection outbound queue size
    pub outbound_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            client_url: DEFAULT_CLIENT_URL.to_string(),
            push_gateway_url: None,
            vapid_public_key: None,
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_user: None,
            smtp_password: None,
            smtp_from: None,
            supabase_url: None,
            supabase_anon_key: None,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }
}

/// Authenticated SMTP relay settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub username: String,
    pub password: String,
    /// Sender address, defaults to `username`
    pub from: Option<String>,
}

/// Persistent Store REST endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
}

impl ServerConfig {
    /// Load configuration from the optional file and the process environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the file cannot be read or parsed, or when a
    /// value is malformed (bad port, bad URL, zero capacity).
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_FILE_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        tracing::info!("[Server] Loaded configuration file {}", path);
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::File { message, .. } => ConfigError::File {
                path: path.to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::File {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Overlay values from a key lookup (the environment in production)
    ///
    /// Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(port) = get("PORT").or_else(|| get("SERVER_PORT")) {
            self.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                message: format!("'{}' is not a port number", port),
            })?;
        }
        if let Some(capacity) = get("RELAY_OUTBOUND_CAPACITY") {
            self.outbound_capacity = capacity.parse().map_err(|_| ConfigError::InvalidValue {
                key: "RELAY_OUTBOUND_CAPACITY",
                message: format!("'{}' is not a number", capacity),
            })?;
        }
        if let Some(url) = get("CLIENT_URL") {
            self.client_url = url;
        }
        if let Some(host) = get("SMTP_HOST") {
            self.smtp_host = host;
        }

        let optional = [
            (&mut self.push_gateway_url, "PUSH_GATEWAY_URL", None),
            (&mut self.vapid_public_key, "VAPID_PUBLIC_KEY", None),
            (&mut self.smtp_user, "SMTP_USER", Some("GMAIL_USER")),
            (&mut self.smtp_password, "SMTP_PASSWORD", Some("GMAIL_APP_PASSWORD")),
            (&mut self.smtp_from, "SMTP_FROM", None),
            (&mut self.supabase_url, "SUPABASE_URL", None),
            (&mut self.supabase_anon_key, "SUPABASE_ANON_KEY", None),
        ];
        for (slot, key, legacy) in optional {
            if let Some(value) = get(key).or_else(|| legacy.and_then(|legacy| get(legacy))) {
                *slot = Some(value);
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("CLIENT_URL", &self.client_url)?;
        if let Some(url) = &self.push_gateway_url {
            check_url("PUSH_GATEWAY_URL", url)?;
        }
        if let Some(url) = &self.supabase_url {
            check_url("SUPABASE_URL", url)?;
        }
        if self.outbound_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RELAY_OUTBOUND_CAPACITY",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// SMTP settings when both user and password are present
    pub fn smtp(&self) -> Option<SmtpSettings> {
        match (&self.smtp_user, &self.smtp_password) {
            (Some(username), Some(password)) => Some(SmtpSettings {
                host: self.smtp_host.clone(),
                username: username.clone(),
                password: password.clone(),
                from: self.smtp_from.clone(),
            }),
            _ => None,
        }
    }

    /// Profile directory settings when both URL and key are present
    pub fn supabase(&self) -> Option<SupabaseSettings> {
        match (&self.supabase_url, &self.supabase_anon_key) {
            (Some(url), Some(anon_key)) => Some(SupabaseSettings {
                url: url.clone(),
                anon_key: anon_key.clone(),
            }),
            _ => None,
        }
    }

    /// Warn about every optional service that will be disabled
    pub fn log_disabled_features(&self) {
        if self.push_gateway_url.is_none() {
            tracing::warn!("PUSH_GATEWAY_URL not set. Push notifications will be disabled.");
        }
        if self.vapid_public_key.is_none() {
            tracing::warn!("VAPID_PUBLIC_KEY not set. Browsers cannot subscribe to push.");
        }
        if self.smtp().is_none() {
            tracing::warn!("SMTP_USER/SMTP_PASSWORD not set. Email codes will be disabled.");
        }
        if self.supabase().is_none() {
            tracing::warn!("SUPABASE_URL/SUPABASE_ANON_KEY not set. Profile lookups will be disabled.");
        }
    }
}

fn check_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidValue {
        key,
        message: format!("'{}': {}", value, e),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidValue {
            key,
            message: format!("unsupported scheme '{}'", other),
        }),
    }
}
