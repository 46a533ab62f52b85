use anyhow::{Context, anyhow};
use dotenvy::dotenv;
use tracing::info;

use workhub::logging::{init_tracing, shutdown_tracer};
use workhub::metrics::init_metrics;
use workhub::router::init_router_with_metrics;
use workhub::state::init_app_state;
use workhub_config::{ServerConfig, StorageConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    init_tracing().context("Failed to initialize logging")?;

    let metrics = init_metrics().context("Failed to install metrics recorder")?;

    let storage = StorageConfig::from_env().map_err(|e| anyhow!(e))?;
    let state = init_app_state(&storage)
        .await
        .context("Failed to initialize role store")?;
    let app = init_router_with_metrics(state, metrics);

    let server = ServerConfig::from_env();
    let listener = tokio::net::TcpListener::bind(server.address())
        .await
        .with_context(|| format!("Failed to bind {}", server.address()))?;

    info!(address = %server.address(), "Server listening");
    println!("🚀 Server running on http://{}", server.address());
    println!("📚 Swagger UI available at http://{}/swagger-ui", server.address());
    println!("📖 Scalar UI available at http://{}/scalar", server.address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    shutdown_tracer();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}
