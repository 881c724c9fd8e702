//! Analysis domain - the asynchronous half of the service
//!
//! Pipeline stages, in order:
//! - `extractor`: one GET, markup to `ExtractedPage`
//! - `scorer`: deterministic 0-100 score
//! - `prompts`: system prompt and page digest for the model
//! - `summarizer`: chat completion parsed into `AiSummary` (fallback on junk)
//! - `result_store`: artifact written under `result:<email>:<ts>`
//! - `notifier`: best-effort report email

pub mod errors;
pub mod extractor;
pub mod notifier;
pub mod pipeline;
pub mod prompts;
pub mod report_email;
pub mod result_store;
pub mod scorer;
pub mod summarizer;
pub mod summary;

pub use errors::*;
pub use extractor::{parse_page, PageExtractor};
pub use notifier::Notifier;
pub use pipeline::{AnalysisPipeline, ProcessOutcome};
pub use prompts::{build_system_prompt, build_user_content};
pub use result_store::{result_key, ResultStore};
pub use scorer::{score, score_breakdown, ScoreBreakdown};
pub use summarizer::{SummaryOutcome, Summarizer};
pub use summary::{AiSummary, SummaryOrigin, FALLBACK_SUMMARY_TEXT};
