/**
 * Notification HTTP Handlers
 *
 * Routes the browser client calls outside the socket:
 *
 * - `POST /api/push/subscribe` - register the Web Push subscription of a user
 * - `GET /api/push/vapid-public-key` - application server key for `subscribe()`
 * - `POST /api/email/send-otp` - email a verification code
 *
 * Request bodies are read as raw bytes and decoded here so malformed JSON
 * yields the same error body as every other failure.
 */

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::backend::error::BackendError;
use crate::backend::notify::dispatcher::DispatchError;
use crate::backend::notify::email::EmailCodeSender;
use crate::backend::notify::push::{PushSubscription, SubscriptionStore};
use crate::backend::server::config::ServerConfig;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscribeRequest {
    subscription: PushSubscription,
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct SendOtpRequest {
    email: String,
}

fn parse_body<'a, T: Deserialize<'a>>(body: &'a [u8]) -> Result<T, BackendError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!("[Server] Failed to parse request body: {}", e);
        BackendError::handler(StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e))
    })
}

/// Register a push subscription (POST /api/push/subscribe)
///
/// # Example Request
///
/// ```http
/// POST /api/push/subscribe HTTP/1.1
/// Content-Type: application/json
///
/// {"userId":"b","subscription":{"endpoint":"https://...","keys":{"p256dh":"...","auth":"..."}}}
/// ```
///
/// # Returns
///
/// `201 Created` with `{"message": "Subscription added successfully"}`
pub async fn subscribe(
    State(subscriptions): State<SubscriptionStore>,
    body: Bytes,
) -> Result<impl IntoResponse, BackendError> {
    let request: SubscribeRequest = parse_body(&body)?;
    let user_id = request.user_id.trim();
    if user_id.is_empty() {
        return Err(BackendError::handler(
            StatusCode::BAD_REQUEST,
            "userId is required",
        ));
    }

    subscriptions.upsert(user_id, request.subscription).await;
    tracing::info!("[Push] Subscription stored for {}", user_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Subscription added successfully" })),
    ))
}

/// Expose the VAPID public key (GET /api/push/vapid-public-key)
pub async fn vapid_public_key(State(config): State<Arc<ServerConfig>>) -> impl IntoResponse {
    Json(json!({ "key": config.vapid_public_key }))
}

/// Email a verification code (POST /api/email/send-otp)
///
/// # Errors
///
/// * `400 Bad Request` - body is not JSON or the address does not parse
/// * `503 Service Unavailable` - SMTP credentials are not configured
/// * `500 Internal Server Error` - the SMTP server refused the message
pub async fn send_otp(
    State(email): State<Option<EmailCodeSender>>,
    body: Bytes,
) -> Result<impl IntoResponse, BackendError> {
    let request: SendOtpRequest = parse_body(&body)?;
    let sender = email.ok_or(DispatchError::NotConfigured("SMTP"))?;

    let otp = sender.send_code(&request.email).await.map_err(|e| match e {
        DispatchError::Email(_) => {
            BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send OTP email")
        }
        other => other.into(),
    })?;

    Ok(Json(json!({ "otp": otp })))
}
