//! Server dependencies (using traits for testability)
//!
//! This module provides the central dependency container used by the intake
//! gate and the analysis pipeline. All external services sit behind `Base*`
//! traits so tests can swap in the fakes from `test_dependencies`.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use openai_client::{ChatRequest, Message, OpenAIClient};
use resend::{ResendService, SendEmailRequest};
use std::sync::Arc;
use tracing::debug;

use crate::config::{AnalysisConfig, IntakeConfig};
use crate::domains::analysis::{
    AnalysisPipeline, Notifier, PageExtractor, ResultStore, Summarizer,
};
use crate::domains::intake::IntakeGate;
use crate::kernel::{
    BaseAI, BaseClock, BaseEmailService, BaseKvStore, BasePageFetcher, BaseQueue,
};

// =============================================================================
// OpenAI Adapter (implements BaseAI trait)
// =============================================================================

/// Chat completions with a fixed model, temperature and output ceiling.
pub struct OpenAIAdapter {
    client: OpenAIClient,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIAdapter {
    pub fn new(client: OpenAIClient, model: impl Into<String>, config: &AnalysisConfig) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: config.ai_temperature,
            max_tokens: config.ai_max_tokens,
        }
    }
}

#[async_trait]
impl BaseAI for OpenAIAdapter {
    async fn chat(&self, system_prompt: &str, user_content: &str) -> Result<String> {
        let request = ChatRequest::new(&self.model)
            .message(Message::system(system_prompt))
            .message(Message::user(user_content))
            .temperature(self.temperature)
            .output_limit(self.max_tokens);

        // OpenAIError stays downcastable for SummarizeError::is_transient
        let response = self.client.chat_completion(request).await?;

        debug!(
            model = %self.model,
            finish_reason = ?response.finish_reason,
            "Chat completion finished"
        );
        Ok(response.content)
    }
}

// =============================================================================
// Resend Adapter (implements BaseEmailService trait)
// =============================================================================

/// Wrapper around ResendService that sends from the configured no-reply address
pub struct ResendAdapter {
    service: Arc<ResendService>,
    from: String,
}

impl ResendAdapter {
    pub fn new(service: Arc<ResendService>, from: impl Into<String>) -> Self {
        Self {
            service,
            from: from.into(),
        }
    }
}

#[async_trait]
impl BaseEmailService for ResendAdapter {
    async fn send_html(&self, to: &str, subject: &str, html: &str) -> Result<String> {
        let request = SendEmailRequest::html(&self.from, to, subject, html);
        let response = self
            .service
            .send_email(&request)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(response.id)
    }
}

// =============================================================================
// System clock
// =============================================================================

pub struct SystemClock;

impl BaseClock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Everything the intake gate and the analysis pipeline need.
#[derive(Clone)]
pub struct ServerDeps {
    pub kv: Arc<dyn BaseKvStore>,
    pub queue: Arc<dyn BaseQueue>,
    pub ai: Arc<dyn BaseAI>,
    pub email: Arc<dyn BaseEmailService>,
    pub fetcher: Arc<dyn BasePageFetcher>,
    pub clock: Arc<dyn BaseClock>,
    pub intake: IntakeConfig,
    pub analysis: AnalysisConfig,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kv: Arc<dyn BaseKvStore>,
        queue: Arc<dyn BaseQueue>,
        ai: Arc<dyn BaseAI>,
        email: Arc<dyn BaseEmailService>,
        fetcher: Arc<dyn BasePageFetcher>,
        clock: Arc<dyn BaseClock>,
        intake: IntakeConfig,
        analysis: AnalysisConfig,
    ) -> Self {
        Self {
            kv,
            queue,
            ai,
            email,
            fetcher,
            clock,
            intake,
            analysis,
        }
    }

    pub fn intake_gate(&self) -> IntakeGate {
        IntakeGate::new(
            self.kv.clone(),
            self.queue.clone(),
            self.clock.clone(),
            self.intake.clone(),
        )
    }

    pub fn analysis_pipeline(&self) -> AnalysisPipeline {
        AnalysisPipeline::new(
            PageExtractor::new(self.fetcher.clone()),
            Summarizer::new(self.ai.clone()),
            ResultStore::new(self.kv.clone(), self.analysis.result_ttl),
            Notifier::new(self.email.clone()),
            self.clock.clone(),
        )
    }
}
