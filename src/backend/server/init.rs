/**
 * Server Initialization
 *
 * Builds the application state from the loaded configuration and assembles
 * the router.
 *
 * # Initialization Process
 *
 * 1. Validate the configuration
 * 2. Create the subscription table, push dispatcher and relay
 * 3. Attach optional services (profile directory, SMTP)
 * 4. Create and configure the router
 */

use axum::Router;

use crate::backend::error::BackendError;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::ServerConfig;
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
///
/// # Errors
///
/// Only an invalid configuration stops startup; missing optional services
/// are logged and disabled.
pub fn create_app(config: ServerConfig) -> Result<Router<()>, BackendError> {
    tracing::info!("Initializing chatwire relay");
    config.validate()?;

    let app_state = AppState::from_config(config);
    let app = create_router(app_state);

    tracing::info!("Router configured");
    Ok(app)
}
