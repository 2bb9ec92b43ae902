/**
 * API Route Configuration
 *
 * # Routes
 *
 * ## Push
 * - `POST /api/push/subscribe` - Register a Web Push subscription
 * - `GET /api/push/vapid-public-key` - VAPID application server key
 *
 * ## Email
 * - `POST /api/email/send-otp` - Email a verification code
 */

use axum::{routing, Router};

use crate::backend::notify::handlers::{send_otp, subscribe, vapid_public_key};
use crate::backend::server::state::AppState;

/// Configure API routes
///
/// # Arguments
///
/// * `router` - The router to add routes to
///
/// # Returns
///
/// Router with API routes configured
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Push notification endpoints
        .route("/api/push/subscribe", routing::post(subscribe))
        .route("/api/push/vapid-public-key", routing::get(vapid_public_key))
        // Email verification endpoint
        .route("/api/email/send-otp", routing::post(send_otp))
}
