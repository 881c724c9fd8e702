//! Typed errors for the analysis pipeline.
//!
//! AI parse failures have no variant here: they are always converted into
//! the fallback summary.
//!
//! `is_transient` separates failures worth redelivering (network, 5xx, rate
//! limits) from ones that will fail the same way every time (bad URL, 404,
//! rejected API key).

use openai_client::OpenAIError;
use thiserror::Error;

/// The page could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::InvalidUrl { .. } => false,
            FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => matches!(status, 408 | 425 | 429 | 500..=599),
        }
    }
}

/// The completion service itself failed (network, auth, 5xx).
#[derive(Debug, Error)]
#[error("AI service error: {0}")]
pub struct SummarizeError(#[source] pub anyhow::Error);

impl SummarizeError {
    /// Errors that don't come from the completion API (connection resets in
    /// adapters, unknown failures) count as transient.
    pub fn is_transient(&self) -> bool {
        self.0
            .downcast_ref::<OpenAIError>()
            .map_or(true, OpenAIError::is_transient)
    }
}

/// The artifact could not be written.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

/// The report email could not be sent. Logged, never propagated.
#[derive(Debug, Error)]
#[error("failed to send report to {recipient}: {source}")]
pub struct NotificationError {
    pub recipient: String,
    #[source]
    pub source: anyhow::Error,
}

/// A stage failure that aborts processing of one message.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Summarize(#[from] SummarizeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// Stage name for logs.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Fetch(_) => "extract",
            PipelineError::Summarize(_) => "summarize",
            PipelineError::Store(_) => "store",
        }
    }

    /// Whether redelivering the message could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            PipelineError::Fetch(e) => e.is_transient(),
            PipelineError::Summarize(e) => e.is_transient(),
            PipelineError::Store(_) => true,
        }
    }
}
