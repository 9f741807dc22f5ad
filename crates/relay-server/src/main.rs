//! Feed relay - always-on announcement relay with adaptive outbound backoff

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use relay_server::api;
use relay_server::config::Config;
use relay_server::loops;
use relay_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("relay_server=debug".parse()?),
        )
        .init();

    tracing::info!("Starting feed relay...");

    let config = Config::from_env();
    let port = config.server_port;
    let state = Arc::new(AppState::new(&config));

    let (shutdown_tx, _) = broadcast::channel(1);

    // Start background loops
    tokio::spawn(loops::feed_sync_loop::run_feed_sync_loop(
        state.clone(),
        config,
        shutdown_tx.subscribe(),
    ));

    // Build the app
    let app = api::routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // Run server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
            let _ = shutdown_tx.send(());
        })
        .await?;

    Ok(())
}
