/**
 * Backend Error Types
 *
 * Errors raised by the relay process's HTTP handlers and its collaborators.
 * Socket event handling never surfaces these to the client; they are logged
 * and the offending event is dropped.
 *
 * # Error Categories
 *
 * ## Handler Errors
 *
 * Bad request bodies, missing identities, unconfigured features.
 *
 * ## Upstream Errors
 *
 * The Persistent Store or push gateway answered badly or not at all.
 *
 * ## Dispatch Errors
 *
 * Notification delivery failures bubbled up from an HTTP route (email codes).
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::notify::dispatcher::DispatchError;
use crate::shared::{ConfigError, SharedError};

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use chatwire::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::BAD_REQUEST, "userId is required");
/// let err = BackendError::upstream("profiles", "connection refused");
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g. invalid request body)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// A collaborator service failed
    #[error("Upstream error from {service}: {message}")]
    UpstreamError {
        service: &'static str,
        message: String,
    },

    #[error(transparent)]
    ConfigError(#[from] ConfigError),

    #[error(transparent)]
    DispatchError(#[from] DispatchError),

    #[error(transparent)]
    SharedError(#[from] SharedError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Create a new upstream error
    pub fn upstream(service: &'static str, message: impl Into<String>) -> Self {
        Self::UpstreamError {
            service,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `UpstreamError` - 502 Bad Gateway
    /// - `ConfigError` - 500 Internal Server Error
    /// - `DispatchError` - 400 for bad addresses, 503 when unconfigured, else 500
    /// - `SharedError` - 400 Bad Request
    /// - `SerializationError` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::UpstreamError { .. } => StatusCode::BAD_GATEWAY,
            Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::DispatchError(err) => match err {
                DispatchError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
                DispatchError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::SharedError(_) => StatusCode::BAD_REQUEST,
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
