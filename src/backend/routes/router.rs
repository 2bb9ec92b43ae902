/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. Relay socket (`GET /socket`)
 * 2. API routes (push, email)
 * 3. Fallback handler (404)
 *
 * # Middleware
 *
 * - CORS restricted to `CLIENT_URL` for GET/POST
 * - `TraceLayer` request spans
 */

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    routing, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::realtime::socket::handle_socket_upgrade;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Route Details
///
/// - `GET /socket?userId=<id>` - WebSocket upgrade for the relay
/// - `POST /api/push/subscribe` - Push subscription registration
/// - `GET /api/push/vapid-public-key` - VAPID key
/// - `POST /api/email/send-otp` - Verification code email
///
/// Unknown routes return a JSON 404 in the same shape as handler errors.
pub fn create_router(app_state: AppState) -> Router<()> {
    let cors = cors_layer(&app_state.config.client_url);

    let router = Router::new().route("/socket", routing::get(handle_socket_upgrade));

    // Add API routes
    let router = configure_api_routes(router);

    // Fallback handler for 404
    let router = router.fallback(|| async {
        BackendError::handler(StatusCode::NOT_FOUND, "Route not found")
    });

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

fn cors_layer(client_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    match HeaderValue::from_str(client_url.trim_end_matches('/')) {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!("[Server] CLIENT_URL is not a valid origin ({}), CORS disabled", e);
            layer
        }
    }
}
