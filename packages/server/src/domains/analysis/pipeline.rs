//! Per-message analysis pipeline.
//!
//! extract -> score -> prompts -> summarize -> store -> notify, strictly in
//! sequence. Any error before the store write fails the message so the queue
//! can redeliver it. The notification runs after the artifact is durable and
//! its failure is only logged.

use std::sync::Arc;

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use tracing::{debug, info, warn};

use super::errors::PipelineError;
use super::extractor::PageExtractor;
use super::notifier::Notifier;
use super::prompts::{build_system_prompt, build_user_content};
use super::result_store::ResultStore;
use super::scorer::score_breakdown;
use super::summarizer::Summarizer;
use super::summary::SummaryOrigin;
use crate::common::{AnalysisArtifact, AnalysisRequest};
use crate::kernel::BaseClock;

/// What one successful run produced.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub key: String,
    pub score: u8,
    pub summary_origin: SummaryOrigin,
    pub email_sent: bool,
}

#[derive(Clone)]
pub struct AnalysisPipeline {
    extractor: PageExtractor,
    summarizer: Summarizer,
    store: ResultStore,
    notifier: Notifier,
    clock: Arc<dyn BaseClock>,
}

impl AnalysisPipeline {
    pub fn new(
        extractor: PageExtractor,
        summarizer: Summarizer,
        store: ResultStore,
        notifier: Notifier,
        clock: Arc<dyn BaseClock>,
    ) -> Self {
        Self {
            extractor,
            summarizer,
            store,
            notifier,
            clock,
        }
    }

    pub async fn process(&self, request: &AnalysisRequest) -> Result<ProcessOutcome, PipelineError> {
        let AnalysisRequest { url, email } = request;

        let page = self.extractor.extract(url).await?;

        let breakdown = score_breakdown(&page);
        let score = breakdown.total();
        info!(url = %url, score, word_count = page.word_count, "Scored page");
        debug!(url = %url, ?breakdown, "Score breakdown");

        let system_prompt = build_system_prompt(score);
        let user_content = build_user_content(&page);
        let outcome = self.summarizer.summarize(&system_prompt, &user_content).await?;

        let timestamp = self.clock.now_millis();
        let artifact = AnalysisArtifact {
            url: url.clone(),
            scraped_at: format_timestamp(timestamp),
            raw_html: page.html.clone(),
            extracted: page,
            ai_summary: outcome.summary,
        };
        let key = self.store.store(email, timestamp, &artifact).await?;

        let year = timestamp_utc(timestamp).year();
        let email_sent = match self
            .notifier
            .notify(email, url, &artifact.ai_summary, year)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "Report email failed; artifact already stored");
                false
            }
        };

        Ok(ProcessOutcome {
            key,
            score,
            summary_origin: outcome.origin,
            email_sent,
        })
    }
}

/// RFC 3339 UTC with millisecond precision, e.g. `2026-03-01T12:00:00.000Z`.
pub fn format_timestamp(timestamp_ms: i64) -> String {
    timestamp_utc(timestamp_ms).to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn timestamp_utc(timestamp_ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_format() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00.000Z");
        assert_eq!(format_timestamp(1_700_000_000_123), "2023-11-14T22:13:20.123Z");
    }
}
