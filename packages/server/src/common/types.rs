// Common types used across multiple domains and layers
//
// These types are shared between the kernel and domain layers to avoid
// circular dependencies while maintaining type safety.

use serde::{Deserialize, Serialize};

use crate::domains::analysis::AiSummary;

/// A validated analysis request as it travels through the queue.
///
/// Serialized exactly as `{"url": ..., "email": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub url: String,
    pub email: String,
}

/// An `<img>` tag found on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: Option<String>,
    /// Empty when the attribute is absent
    pub alt: String,
}

/// An `<a>` tag found on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    pub href: Option<String>,
    /// Visible text, trimmed
    pub text: String,
}

/// SEO-relevant signals pulled from a single fetched page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedPage {
    pub title: String,
    pub meta_description: String,
    pub canonical: String,
    pub h1s: Vec<String>,
    pub h2s: Vec<String>,
    pub images: Vec<ImageRef>,
    pub links: Vec<LinkRef>,
    /// Raw text of each `application/ld+json` block
    pub structured_data: Vec<String>,
    pub word_count: usize,
    pub url: String,
    pub html: String,
}

/// The durable record of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisArtifact {
    pub url: String,
    /// RFC 3339, UTC, millisecond precision
    pub scraped_at: String,
    pub raw_html: String,
    pub extracted: ExtractedPage,
    pub ai_summary: AiSummary,
}
