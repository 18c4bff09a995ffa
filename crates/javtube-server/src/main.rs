use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use javtube_core::JavtubeScraper;
use javtube_server::config::ServerArgs;
use javtube_server::{AppState, router};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = ServerArgs::parse();

    let tokens = Arc::new(args.token_cache());
    let scraper = JavtubeScraper::with_token_cache(args.client_config(), tokens)
        .context("failed to build HTTP client")?;

    let addr = args.addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(%addr, base_url = %args.base_url, "javtube server listening");

    axum::serve(listener, router(AppState::new(scraper)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
}
