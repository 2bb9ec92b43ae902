/**
 * Chatwire Relay Entry Point
 *
 * Loads configuration, initializes tracing and serves the relay socket and
 * notification routes.
 */

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use chatwire::backend::server::{create_app, ServerConfig};

    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    tracing::info!("[STARTUP] Server initialization started");

    let config = ServerConfig::load()?;
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = create_app(config)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("[STARTUP] Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(not(feature = "ssr"))]
fn main() {
    eprintln!("The relay requires the 'ssr' feature to be enabled.");
    eprintln!("Run with: cargo run --bin chatwire-relay --features ssr");
    std::process::exit(1);
}
