//! Prompt rendering for the AI summary step.
//!
//! The reply shape requested here mirrors `AiSummary` field for field.

use crate::common::ExtractedPage;

/// System instructions: the score is final, reply with one JSON object.
pub fn build_system_prompt(score: u8) -> String {
    format!(
        r#"You are an expert SEO assistant. The score is already computed, you don't need to calculate it.

Respond strictly in the following JSON format:

{{
  "score": {score},
  "summary": "<1-2 sentence summary of overall SEO status>",
  "observations": {{
    "title": "<brief observation>",
    "metaDescription": "<brief observation>",
    "h1s": "<brief observation>",
    "h2s": "<brief observation>",
    "canonical": "<brief observation>",
    "wordCount": "<brief observation>",
    "links": "<brief observation>",
    "imageAltText": "<brief observation>",
    "structuredData": "<brief observation>"
  }},
  "recommendations": [
    "<actionable tip>",
    "<another improvement>",
    "<another one>"
  ],
  "priorityActions": [
    "<top fix 1>",
    "<top fix 2>",
    "<top fix 3>"
  ]
}}"#
    )
}

/// Compact digest of the page. This, not the markup, is what the model sees.
pub fn build_user_content(page: &ExtractedPage) -> String {
    let with_alt = page.images.iter().filter(|img| !img.alt.is_empty()).count();

    let lines = [
        "Analyze the following webpage:".to_string(),
        String::new(),
        format!("URL: {}", page.url),
        format!("Title: {}", page.title),
        format!("Meta Description: {}", page.meta_description),
        format!("Canonical: {}", page.canonical),
        format!("H1s: {}", page.h1s.join("; ")),
        format!("H2s: {}", page.h2s.join("; ")),
        format!("Word Count: {}", page.word_count),
        format!(
            "Image Alt Texts: {} images, {} with alt text",
            page.images.len(),
            with_alt
        ),
        format!("Links: {} total", page.links.len()),
        format!("Structured Data Blocks: {}", page.structured_data.len()),
    ];

    lines.join("\n").trim().to_string()
}
