//! Branded HTML body for the "report ready" email.

use super::summary::AiSummary;

pub const REPORT_SUBJECT: &str = "Your SEO Report is Ready";

const SCORE_GOOD_COLOR: &str = "#28a745";
const SCORE_WARN_COLOR: &str = "#ffc107";

/// Scores at or above this render green.
const GOOD_SCORE_THRESHOLD: f64 = 75.0;

/// Render the report email for `url`. `year` goes in the footer.
pub fn render_report_email(url: &str, summary: &AiSummary, year: i32) -> String {
    let score_color = match summary.score {
        Some(score) if score >= GOOD_SCORE_THRESHOLD => SCORE_GOOD_COLOR,
        _ => SCORE_WARN_COLOR,
    };

    let summary_text = if summary.summary.is_empty() {
        "No summary available."
    } else {
        summary.summary.as_str()
    };

    let recommendations = render_section("🔧 Recommendations", &summary.recommendations);
    let priority_actions = render_section("🚀 Priority Actions", &summary.priority_actions);

    format!(
        r#"<div style="font-family: Arial, sans-serif; padding: 20px; color: #333; background-color: #f9f9f9;">
  <div style="max-width: 600px; margin: auto; background: white; border-radius: 8px; overflow: hidden; box-shadow: 0 2px 8px rgba(0,0,0,0.05);">
    <div style="padding: 20px; border-bottom: 1px solid #eee;">
      <h2 style="margin: 0; color: #222;">🎯 Your SEO Report is Ready</h2>
      <p style="margin-top: 8px;">Here's a summary for: <strong>{url}</strong></p>
    </div>
    <div style="padding: 20px;">
      <p><strong>SEO Score:</strong> <span style="font-size: 18px; color: {score_color};">{score}</span></p>
      <h3 style="margin-top: 24px;">📝 Summary</h3>
      <p style="margin-top: 8px;">{summary_text}</p>
{recommendations}{priority_actions}
      <p style="margin-top: 30px; font-size: 12px; color: #888;">
        You’re receiving this email because you requested a free SEO analysis on our platform.
      </p>
    </div>
  </div>
  <div style="text-align: center; margin-top: 20px; font-size: 12px; color: #aaa;">
    © {year} BriefUGC · All rights reserved
  </div>
</div>"#,
        url = escape_html(url),
        score_color = score_color,
        score = escape_html(&summary.display_score()),
        summary_text = escape_html(summary_text),
        recommendations = recommendations,
        priority_actions = priority_actions,
        year = year,
    )
}

/// A heading plus bullet list, or nothing when `items` is empty.
fn render_section(heading: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let list = items
        .iter()
        .map(|item| format!("<li>{}</li>", escape_html(item)))
        .collect::<String>();
    format!(
        "      <h3 style=\"margin-top: 24px;\">{}</h3>\n      <ul>{}</ul>\n",
        heading, list
    )
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
