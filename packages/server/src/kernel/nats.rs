//! NATS JetStream work queue for analysis requests.
//!
//! One stream with work-queue retention holds the `{url, email}` messages.
//! The intake side publishes and waits for the stream's ack; consumers live
//! in `kernel::jobs`.

use anyhow::{Context, Result};
use async_nats::jetstream::{self, stream};
use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, info};

use super::BaseQueue;
use crate::common::AnalysisRequest;
use crate::config::QueueConfig;

/// Connect to NATS and open a JetStream context.
pub async fn connect_jetstream(nats_url: &str) -> Result<jetstream::Context> {
    let client = async_nats::connect(nats_url)
        .await
        .with_context(|| format!("Failed to connect to NATS at {}", nats_url))?;
    Ok(jetstream::new(client))
}

/// Create the analysis stream if it does not exist yet.
pub async fn ensure_stream(js: &jetstream::Context, config: &QueueConfig) -> Result<stream::Stream> {
    let stream = js
        .get_or_create_stream(stream::Config {
            name: config.stream.clone(),
            subjects: vec![config.subject.clone()],
            retention: stream::RetentionPolicy::WorkQueue,
            ..Default::default()
        })
        .await
        .with_context(|| format!("Failed to create stream {}", config.stream))?;

    info!(stream = %config.stream, subject = %config.subject, "JetStream stream ready");
    Ok(stream)
}

/// Queue message body: the request exactly as `{"url": ..., "email": ...}`.
pub fn encode_request(request: &AnalysisRequest) -> Result<Bytes> {
    let payload = serde_json::to_vec(request).context("Failed to serialize analysis request")?;
    Ok(Bytes::from(payload))
}

/// Producer side of the work queue.
pub struct JetStreamQueue {
    js: jetstream::Context,
    subject: String,
}

impl JetStreamQueue {
    pub fn new(js: jetstream::Context, subject: impl Into<String>) -> Self {
        Self {
            js,
            subject: subject.into(),
        }
    }
}

#[async_trait]
impl BaseQueue for JetStreamQueue {
    async fn send(&self, request: &AnalysisRequest) -> Result<()> {
        let payload = encode_request(request)?;

        let ack = self
            .js
            .publish(self.subject.clone(), payload)
            .await
            .context("Failed to publish analysis request")?
            .await
            .context("JetStream did not acknowledge analysis request")?;

        debug!(subject = %self.subject, sequence = ack.sequence, "Published analysis request");
        Ok(())
    }
}
