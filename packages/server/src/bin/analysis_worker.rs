//! Analysis Worker
//!
//! Standalone queue consumer. Runs the same pipeline as the server's
//! in-process consumer; start several to scale processing horizontally.

use anyhow::{Context, Result};
use seo_audit_core::{kernel::jobs::AnalysisConsumer, server::connect_server_deps, Config};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,seo_audit_core=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting analysis worker");

    let config = Config::from_env().context("Failed to load configuration")?;
    let (deps, js) = connect_server_deps(&config).await?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
        tracing::info!("Shutdown signal received");
        signal.cancel();
    });

    AnalysisConsumer::new(deps.analysis_pipeline(), config.queue.clone())
        .run(js, shutdown)
        .await
}
