use std::sync::Arc;

use gemcost::env_config::{default_seed, init_rayon_threads, server_port};
use gemcost::logging::init_tracing;
use gemcost::server::{create_router, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    init_rayon_threads();
    tracing::info!("starting gemcost API server");

    let config = Arc::new(ServerConfig {
        default_seed: default_seed(),
    });
    let app = create_router(config);

    let port = server_port();
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!(port, "server is running, press Ctrl+C to stop");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("stopping server");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install CTRL+C signal handler");
    }
}
