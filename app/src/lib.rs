//! XLend server application library

use std::future::Future;

use anyhow::Context;
use lending::ChainAdapter;
use xlend_api::AppState;
use xlend_core::AppConfig;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("xlend=debug,info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Resolve once `signal` fires. Never resolves if the signal cannot be
/// listened for.
async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Load configuration from the environment and serve the API until Ctrl-C
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting XLend");

    let config = AppConfig::from_env().context("Invalid configuration")?;
    let port = config.api_port;
    let state = AppState::new(config);

    // Pages work disconnected; the wallet can be connected later
    match state.chain().connect(None).await {
        Ok(account) => tracing::info!(%account, "Wallet connected"),
        Err(e) => tracing::warn!("Wallet not connected at startup: {}", e),
    }

    xlend_api::start_server(state, port, shutdown_on(tokio::signal::ctrl_c()))
        .await
        .with_context(|| format!("API server on port {} failed", port))?;

    Ok(())
}
