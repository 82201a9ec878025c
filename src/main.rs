//! API Key Gate - Demo Server Entry Point
//!
//! Serves a public health check and a couple of echo routes protected by the
//! API key gate.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Build the key gate
//! 3. Build HTTP router with routes and middleware
//! 4. Start server on configured port

use api_key_gate::config::Config;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let gate = config.key_gate();
    if gate.key_count() == 0 {
        tracing::warn!("No API keys configured; every gated request will be denied");
    }
    tracing::info!(
        keys = gate.key_count(),
        parameter = gate.parameter_name(),
        content_type = %gate.content_type(),
        "Key gate ready"
    );

    let app = api_key_gate::router(gate).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
