use std::sync::Arc;

use tracing::{debug, info};

use super::errors::SummarizeError;
use super::summary::{AiSummary, SummaryOrigin};
use crate::kernel::BaseAI;

/// A summary and how it was obtained.
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub summary: AiSummary,
    pub origin: SummaryOrigin,
}

/// Turns prompts into an [`AiSummary`].
///
/// Unparseable replies become the fallback summary. Only a failure of the
/// completion call itself is an error.
#[derive(Clone)]
pub struct Summarizer {
    ai: Arc<dyn BaseAI>,
}

impl Summarizer {
    pub fn new(ai: Arc<dyn BaseAI>) -> Self {
        Self { ai }
    }

    pub async fn summarize(
        &self,
        system_prompt: &str,
        user_content: &str,
    ) -> Result<SummaryOutcome, SummarizeError> {
        let reply = self
            .ai
            .chat(system_prompt, user_content)
            .await
            .map_err(SummarizeError)?;

        debug!(reply_len = reply.len(), "Received AI reply");

        let (summary, origin) = AiSummary::parse_or_fallback(&reply);
        if origin == SummaryOrigin::Parsed {
            info!(ai_score = ?summary.score, "Parsed AI summary");
        }

        Ok(SummaryOutcome { summary, origin })
    }
}
