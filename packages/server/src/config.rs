use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub redis_url: String,
    pub nats_url: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub resend_api_key: String,
    pub no_reply_email: String,
    pub run_consumer: bool,
    pub intake: IntakeConfig,
    pub analysis: AnalysisConfig,
    pub queue: QueueConfig,
}

/// Settings for the synchronous intake gate.
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Lowercase domains refused for scraping (subdomains included)
    pub disallowed_domains: Vec<String>,
    /// Minimum gap between two accepted requests from one email
    pub rate_limit_interval: Duration,
    /// Lifetime of the `rate:<email>` record
    pub rate_limit_ttl: Duration,
}

/// Settings for the analysis pipeline.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub result_ttl: Duration,
    pub ai_temperature: f32,
    pub ai_max_tokens: u32,
    /// Whole-request timeout of the page GET (redirects included)
    pub fetch_timeout: Duration,
    /// Whole-request timeout of the chat completion call
    pub ai_timeout: Duration,
}

/// JetStream names and consumer tuning.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub stream: String,
    pub subject: String,
    pub consumer: String,
    pub concurrency: usize,
    pub max_deliver: i64,
    /// How long the broker waits for a settlement before redelivering.
    /// Must exceed the worst-case pipeline run.
    pub ack_wait: Duration,
}

pub const DEFAULT_DISALLOWED_DOMAINS: &[&str] = &["tiktok.com", "facebook.com", "instagram.com"];

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            disallowed_domains: DEFAULT_DISALLOWED_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
            rate_limit_interval: Duration::from_millis(3000),
            rate_limit_ttl: Duration::from_secs(60),
        }
    }
}

impl IntakeConfig {
    /// TTL for the `rate:<email>` record, never shorter than the interval
    /// (rounded up to whole seconds) so a live interval always has a record.
    pub fn rate_record_ttl(&self) -> Duration {
        let interval_secs = self.rate_limit_interval.as_millis().div_ceil(1000) as u64;
        self.rate_limit_ttl.max(Duration::from_secs(interval_secs))
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            result_ttl: Duration::from_secs(60 * 60 * 24 * 7),
            ai_temperature: 0.3,
            ai_max_tokens: 700,
            fetch_timeout: Duration::from_secs(30),
            ai_timeout: Duration::from_secs(60),
        }
    }
}

impl AnalysisConfig {
    /// Upper bound on one pipeline run: both network calls at their timeouts
    /// plus a margin for parsing, the store write and the report email.
    pub fn run_budget(&self) -> Duration {
        self.fetch_timeout + self.ai_timeout + Duration::from_secs(15)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            stream: "SEO_ANALYSIS".to_string(),
            subject: "seo.analysis.requests".to_string(),
            consumer: "seo-analysis-worker".to_string(),
            concurrency: 4,
            max_deliver: 5,
            ack_wait: Duration::from_secs(120),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let intake_defaults = IntakeConfig::default();
        let analysis_defaults = AnalysisConfig::default();
        let queue_defaults = QueueConfig::default();

        let disallowed_domains = match env::var("DISALLOWED_DOMAINS") {
            Ok(raw) => parse_domain_list(&raw),
            Err(_) => intake_defaults.disallowed_domains,
        };

        let analysis = AnalysisConfig {
            result_ttl: Duration::from_secs(parse_var(
                "RESULT_TTL_SECS",
                analysis_defaults.result_ttl.as_secs(),
            )?),
            ai_temperature: parse_var("AI_TEMPERATURE", analysis_defaults.ai_temperature)?,
            ai_max_tokens: parse_var("AI_MAX_TOKENS", analysis_defaults.ai_max_tokens)?,
            fetch_timeout: Duration::from_secs(parse_var(
                "FETCH_TIMEOUT_SECS",
                analysis_defaults.fetch_timeout.as_secs(),
            )?),
            ai_timeout: Duration::from_secs(parse_var(
                "AI_TIMEOUT_SECS",
                analysis_defaults.ai_timeout.as_secs(),
            )?),
        };
        let queue = QueueConfig {
            stream: env::var("ANALYSIS_STREAM").unwrap_or(queue_defaults.stream),
            subject: env::var("ANALYSIS_SUBJECT").unwrap_or(queue_defaults.subject),
            consumer: env::var("ANALYSIS_CONSUMER").unwrap_or(queue_defaults.consumer),
            concurrency: parse_var("ANALYSIS_CONCURRENCY", queue_defaults.concurrency)?,
            max_deliver: parse_var("ANALYSIS_MAX_DELIVER", queue_defaults.max_deliver)?,
            ack_wait: Duration::from_secs(parse_var(
                "ANALYSIS_ACK_WAIT_SECS",
                queue_defaults.ack_wait.as_secs(),
            )?),
        };
        check_ack_wait(&analysis, &queue)?;

        Ok(Self {
            port: parse_var("PORT", 8080)?,
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            nats_url: env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string()),
            openai_api_key: env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            resend_api_key: env::var("RESEND_API_KEY").context("RESEND_API_KEY must be set")?,
            no_reply_email: env::var("NO_REPLY_EMAIL").context("NO_REPLY_EMAIL must be set")?,
            run_consumer: parse_var("RUN_CONSUMER", true)?,
            intake: IntakeConfig {
                disallowed_domains,
                rate_limit_interval: Duration::from_millis(parse_var(
                    "RATE_LIMIT_INTERVAL_MS",
                    intake_defaults.rate_limit_interval.as_millis() as u64,
                )?),
                rate_limit_ttl: Duration::from_secs(parse_var(
                    "RATE_LIMIT_TTL_SECS",
                    intake_defaults.rate_limit_ttl.as_secs(),
                )?),
            },
            analysis,
            queue,
        })
    }
}

/// A message still being processed when `ack_wait` runs out is redelivered
/// and analysed twice, so the deadline has to cover a full run.
pub fn check_ack_wait(analysis: &AnalysisConfig, queue: &QueueConfig) -> Result<()> {
    anyhow::ensure!(
        queue.ack_wait > analysis.run_budget(),
        "ANALYSIS_ACK_WAIT_SECS ({}s) must exceed FETCH_TIMEOUT_SECS + AI_TIMEOUT_SECS + 15s ({}s)",
        queue.ack_wait.as_secs(),
        analysis.run_budget().as_secs()
    );
    Ok(())
}

/// Read an optional variable, falling back to `default` when unset.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid {}", name, std::any::type_name::<T>())),
        Err(_) => Ok(default),
    }
}

/// Comma-separated domain list, trimmed and lowercased, empties dropped.
pub fn parse_domain_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|d| d.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}
