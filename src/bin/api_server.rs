// API Server Binary Entry Point
//
// Purpose: Serve recommendations and the plan catalog over HTTP
// Usage: cargo run --features api --bin api_server

use crop_planner::{create_router, AppState, EngineConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "crop_planner=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    // Configuration from environment variables
    let config = EngineConfig::from_env();
    config.log_summary();
    let port = config.port;

    // Initialize application state (loads predictor and catalog)
    tracing::info!("Initializing application state...");
    let state = tokio::task::spawn_blocking(move || AppState::load(config)).await??;
    tracing::info!(
        "Application state initialized successfully ({} crops)",
        state.service.catalog().len()
    );

    // Create router with all endpoints and middleware
    let app = create_router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting server on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await?;

    Ok(())
}
