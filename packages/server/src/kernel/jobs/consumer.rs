//! Analysis consumer - drains the JetStream work queue.
//!
//! Each message runs the full pipeline independently. Settlement:
//! - pipeline success: ack
//! - transient pipeline failure (network, 5xx, 429, store): nak, redelivered
//!   until the consumer's `max_deliver` is exhausted
//! - permanent pipeline failure (bad URL, 4xx page, rejected AI request) and
//!   payloads that are not an `AnalysisRequest`: term, never redelivered
//!
//! Up to `concurrency` messages are in flight at once and the client never
//! pulls more than that per batch, so nothing waits in a local buffer while
//! its `ack_wait` clock runs. On shutdown the message stream stops yielding
//! and in-flight messages finish.

use anyhow::{Context, Result};
use async_nats::jetstream::{
    self,
    consumer::{pull, AckPolicy, Consumer},
    AckKind,
};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::common::AnalysisRequest;
use crate::config::QueueConfig;
use crate::domains::analysis::AnalysisPipeline;
use crate::kernel::nats::ensure_stream;

/// How a message should be settled with the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    Ack,
    Retry,
    Reject,
}

#[derive(Clone)]
pub struct AnalysisConsumer {
    pipeline: AnalysisPipeline,
    config: QueueConfig,
}

impl AnalysisConsumer {
    pub fn new(pipeline: AnalysisPipeline, config: QueueConfig) -> Self {
        Self { pipeline, config }
    }

    /// Decode one payload and run the pipeline for it.
    pub async fn handle_payload(&self, payload: &[u8]) -> MessageOutcome {
        let request: AnalysisRequest = match serde_json::from_slice(payload) {
            Ok(request) => request,
            Err(e) => {
                error!(error = %e, bytes = payload.len(), "Dropping undecodable analysis message");
                return MessageOutcome::Reject;
            }
        };

        match self.pipeline.process(&request).await {
            Ok(outcome) => {
                info!(
                    url = %request.url,
                    key = %outcome.key,
                    score = outcome.score,
                    summary_origin = ?outcome.summary_origin,
                    email_sent = outcome.email_sent,
                    "Analysis complete"
                );
                MessageOutcome::Ack
            }
            Err(e) if e.is_transient() => {
                warn!(
                    url = %request.url,
                    stage = e.stage(),
                    error = %e,
                    "Analysis failed; message will be redelivered"
                );
                MessageOutcome::Retry
            }
            Err(e) => {
                error!(
                    url = %request.url,
                    stage = e.stage(),
                    error = %e,
                    "Analysis failed permanently; dropping message"
                );
                MessageOutcome::Reject
            }
        }
    }

    async fn handle_message(&self, message: jetstream::Message) {
        let delivered = message.info().map(|info| info.delivered).unwrap_or(1);
        if delivered > 1 {
            info!(delivered, "Redelivered analysis message");
        }

        let outcome = self.handle_payload(&message.payload).await;
        let settled = match outcome {
            MessageOutcome::Ack => message.ack().await,
            MessageOutcome::Retry => message.ack_with(AckKind::Nak(None)).await,
            MessageOutcome::Reject => message.ack_with(AckKind::Term).await,
        };

        if let Err(e) = settled {
            error!(error = %e, ?outcome, "Failed to settle analysis message");
        }
    }

    fn batch_size(&self) -> usize {
        self.config.concurrency.max(1)
    }

    /// Settings of the durable consumer.
    pub fn consumer_config(&self) -> pull::Config {
        pull::Config {
            durable_name: Some(self.config.consumer.clone()),
            ack_policy: AckPolicy::Explicit,
            ack_wait: self.config.ack_wait,
            max_deliver: self.config.max_deliver,
            ..Default::default()
        }
    }

    /// Durable pull consumer on the analysis stream, created if missing.
    pub async fn create_pull_consumer(
        &self,
        js: &jetstream::Context,
    ) -> Result<Consumer<pull::Config>> {
        let stream = ensure_stream(js, &self.config).await?;
        stream
            .get_or_create_consumer(&self.config.consumer, self.consumer_config())
            .await
            .with_context(|| format!("Failed to create consumer {}", self.config.consumer))
    }

    /// Process messages until `shutdown` is cancelled.
    pub async fn run(self, js: jetstream::Context, shutdown: CancellationToken) -> Result<()> {
        let consumer = self.create_pull_consumer(&js).await?;
        let messages = consumer
            .stream()
            .max_messages_per_batch(self.batch_size())
            .messages()
            .await
            .context("Failed to open message stream")?;

        info!(
            consumer = %self.config.consumer,
            concurrency = self.config.concurrency,
            max_deliver = self.config.max_deliver,
            ack_wait_secs = self.config.ack_wait.as_secs(),
            "Analysis consumer starting"
        );

        let worker = &self;
        messages
            .take_until(shutdown.cancelled())
            .for_each_concurrent(self.batch_size(), |message| async move {
                match message {
                    Ok(message) => worker.handle_message(message).await,
                    Err(e) => warn!(error = %e, "Error receiving analysis message"),
                }
            })
            .await;

        info!(consumer = %self.config.consumer, "Analysis consumer stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::TestDependencies;
    use std::time::Duration;

    fn consumer(config: QueueConfig) -> AnalysisConsumer {
        let deps = TestDependencies::new().into_server_deps();
        AnalysisConsumer::new(deps.analysis_pipeline(), config)
    }

    #[test]
    fn consumer_config_carries_ack_deadline() {
        let config = consumer(QueueConfig {
            ack_wait: Duration::from_secs(150),
            max_deliver: 3,
            ..QueueConfig::default()
        })
        .consumer_config();

        assert_eq!(config.durable_name.as_deref(), Some("seo-analysis-worker"));
        assert!(matches!(config.ack_policy, AckPolicy::Explicit));
        assert_eq!(config.ack_wait, Duration::from_secs(150));
        assert_eq!(config.max_deliver, 3);
    }

    #[test]
    fn batch_matches_concurrency() {
        let worker = consumer(QueueConfig {
            concurrency: 8,
            ..QueueConfig::default()
        });
        assert_eq!(worker.batch_size(), 8);

        let worker = consumer(QueueConfig {
            concurrency: 0,
            ..QueueConfig::default()
        });
        assert_eq!(worker.batch_size(), 1);
    }
}
