//! The AI-written narrative attached to every artifact.

use std::collections::BTreeMap;

use openai_client::strip_code_blocks;
use serde::{Deserialize, Serialize};

/// Summary text used when the AI reply cannot be parsed.
pub const FALLBACK_SUMMARY_TEXT: &str = "Failed to parse AI response.";

/// Narrative summary of a page's SEO state.
///
/// Either parsed from the AI reply or the canonical fallback; both are
/// complete values of the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSummary {
    #[serde(default)]
    pub score: Option<f64>,
    pub summary: String,
    /// Signal name -> short observation
    #[serde(default)]
    pub observations: BTreeMap<String, String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub priority_actions: Vec<String>,
}

/// Where a summary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryOrigin {
    Parsed,
    Fallback,
}

impl AiSummary {
    /// The single substitute used whenever the AI output is unusable.
    pub fn fallback() -> Self {
        Self {
            score: None,
            summary: FALLBACK_SUMMARY_TEXT.to_string(),
            observations: BTreeMap::new(),
            recommendations: Vec::new(),
            priority_actions: Vec::new(),
        }
    }

    /// Parse the raw reply text. Markdown code fences around the JSON are tolerated.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(strip_code_blocks(raw))
    }

    /// Parse, substituting the fallback on any failure.
    pub fn parse_or_fallback(raw: &str) -> (Self, SummaryOrigin) {
        match Self::parse(raw) {
            Ok(summary) => (summary, SummaryOrigin::Parsed),
            Err(e) => {
                tracing::warn!(error = %e, reply_len = raw.len(), "AI reply was not a valid summary");
                (Self::fallback(), SummaryOrigin::Fallback)
            }
        }
    }

    /// Score for display: whole numbers without a decimal point, "N/A" when absent.
    pub fn display_score(&self) -> String {
        match self.score {
            Some(score) if score.fract() == 0.0 => format!("{}", score as i64),
            Some(score) => format!("{}", score),
            None => "N/A".to_string(),
        }
    }
}
