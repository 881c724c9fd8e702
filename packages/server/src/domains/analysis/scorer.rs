//! Deterministic SEO score.
//!
//! Nine sub-scores in [0, 1], weighted, summed in a fixed order, scaled to
//! 0-100 and rounded. Historical artifacts were scored with exactly this
//! arithmetic, so the accumulation order, the f64 rounding and the UTF-16
//! length measure must not change.

use serde::Serialize;

use crate::common::ExtractedPage;

pub const TITLE_WEIGHT: f64 = 0.1;
pub const META_DESCRIPTION_WEIGHT: f64 = 0.1;
pub const H1_WEIGHT: f64 = 0.1;
pub const H2_WEIGHT: f64 = 0.05;
pub const CANONICAL_WEIGHT: f64 = 0.05;
pub const WORD_COUNT_WEIGHT: f64 = 0.15;
pub const IMAGE_ALT_WEIGHT: f64 = 0.15;
pub const LINKS_WEIGHT: f64 = 0.15;
pub const STRUCTURED_DATA_WEIGHT: f64 = 0.15;

/// Per-signal sub-scores, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub title: f64,
    pub meta_description: f64,
    pub h1s: f64,
    pub h2s: f64,
    pub canonical: f64,
    pub word_count: f64,
    pub image_alt_text: f64,
    pub links: f64,
    pub structured_data: f64,
}

impl ScoreBreakdown {
    /// (sub-score, weight) pairs in accumulation order.
    fn weighted(&self) -> [(f64, f64); 9] {
        [
            (self.title, TITLE_WEIGHT),
            (self.meta_description, META_DESCRIPTION_WEIGHT),
            (self.h1s, H1_WEIGHT),
            (self.h2s, H2_WEIGHT),
            (self.canonical, CANONICAL_WEIGHT),
            (self.word_count, WORD_COUNT_WEIGHT),
            (self.image_alt_text, IMAGE_ALT_WEIGHT),
            (self.links, LINKS_WEIGHT),
            (self.structured_data, STRUCTURED_DATA_WEIGHT),
        ]
    }

    /// Weighted total scaled to 0-100.
    pub fn total(&self) -> u8 {
        let total = self
            .weighted()
            .iter()
            .fold(0.0_f64, |acc, (score, weight)| acc + score * weight);
        (total * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Compute the sub-scores for a page.
pub fn score_breakdown(page: &ExtractedPage) -> ScoreBreakdown {
    ScoreBreakdown {
        title: if utf16_len(&page.title) > 20 { 1.0 } else { 0.5 },
        meta_description: if utf16_len(&page.meta_description) > 50 {
            1.0
        } else {
            0.0
        },
        h1s: presence(page.h1s.len()),
        h2s: presence(page.h2s.len()),
        canonical: if page.canonical.is_empty() { 0.0 } else { 1.0 },
        word_count: tiered(page.word_count, 800, 300),
        image_alt_text: alt_coverage(page),
        links: tiered(page.links.len(), 10, 3),
        structured_data: presence(page.structured_data.len()),
    }
}

/// SEO score in [0, 100].
pub fn score(page: &ExtractedPage) -> u8 {
    score_breakdown(page).total()
}

fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

fn presence(count: usize) -> f64 {
    if count > 0 {
        1.0
    } else {
        0.0
    }
}

fn tiered(value: usize, full_above: usize, half_above: usize) -> f64 {
    if value > full_above {
        1.0
    } else if value > half_above {
        0.5
    } else {
        0.0
    }
}

fn alt_coverage(page: &ExtractedPage) -> f64 {
    if page.images.is_empty() {
        return 1.0;
    }
    let with_alt = page
        .images
        .iter()
        .filter(|img| !img.alt.trim().is_empty())
        .count();
    with_alt as f64 / page.images.len() as f64
}
