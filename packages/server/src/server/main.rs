// Main entry point for the intake API server

use anyhow::{Context, Result};
use seo_audit_core::{
    kernel::jobs::AnalysisConsumer,
    server::{build_app, connect_server_deps},
    Config,
};
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
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SEO Audit API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    let (deps, js) = connect_server_deps(&config).await?;
    let shutdown = CancellationToken::new();

    // In-process consumer (disable with RUN_CONSUMER=false when running analysis_worker separately)
    let consumer_handle = if config.run_consumer {
        let consumer = AnalysisConsumer::new(deps.analysis_pipeline(), config.queue.clone());
        let token = shutdown.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = consumer.run(js, token).await {
                tracing::error!(error = %e, "Analysis consumer exited with error");
            }
        }))
    } else {
        tracing::info!("RUN_CONSUMER=false, not consuming analysis requests");
        None
    };

    let app = build_app(&deps);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
            signal.cancel();
        })
        .await
        .context("Server error")?;

    shutdown.cancel();
    if let Some(handle) = consumer_handle {
        let _ = handle.await;
    }

    tracing::info!("Server stopped");
    Ok(())
}
