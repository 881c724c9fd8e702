//! Application setup and server configuration.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_nats::jetstream;
use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use openai_client::OpenAIClient;
use resend::{ResendOptions, ResendService};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::domains::intake::IntakeGate;
use crate::kernel::{
    connect_jetstream, ensure_stream, HttpPageFetcher, JetStreamQueue, OpenAIAdapter,
    RedisKvStore, ResendAdapter, ServerDeps, SystemClock,
};
use crate::server::routes::{health_handler, scrape_handler};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub intake: IntakeGate,
}

/// Connect to Redis and NATS and wire the production adapters.
///
/// Returns the JetStream context as well so the caller can start consumers.
pub async fn connect_server_deps(config: &Config) -> Result<(ServerDeps, jetstream::Context)> {
    tracing::info!("Connecting to Redis...");
    let kv = RedisKvStore::connect(&config.redis_url).await?;

    tracing::info!("Connecting to NATS...");
    let js = connect_jetstream(&config.nats_url).await?;
    ensure_stream(&js, &config.queue).await?;

    let openai = OpenAIClient::new(config.openai_api_key.clone())
        .with_base_url(config.openai_base_url.clone())
        .with_timeout(config.analysis.ai_timeout)
        .context("Failed to build OpenAI client")?;
    let ai = OpenAIAdapter::new(openai, config.openai_model.clone(), &config.analysis);

    let resend = Arc::new(ResendService::new(ResendOptions::new(
        config.resend_api_key.clone(),
    )));
    let email = ResendAdapter::new(resend, config.no_reply_email.clone());

    let fetcher = HttpPageFetcher::with_timeout(config.analysis.fetch_timeout)
        .context("Failed to build page fetcher")?;

    let deps = ServerDeps::new(
        Arc::new(kv),
        Arc::new(JetStreamQueue::new(js.clone(), config.queue.subject.clone())),
        Arc::new(ai),
        Arc::new(email),
        Arc::new(fetcher),
        Arc::new(SystemClock),
        config.intake.clone(),
        config.analysis.clone(),
    );

    Ok((deps, js))
}

/// Build the Axum application router
pub fn build_app(deps: &ServerDeps) -> Router {
    let app_state = AxumAppState {
        intake: deps.intake_gate(),
    };

    // CORS configuration - the intake form may be served from any origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/scrape", post(scrape_handler))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
