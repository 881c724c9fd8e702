// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (scoring, prompting, rate limiting) lives in domain code that uses these traits.
//
// Naming convention: Base* for trait names (e.g., BaseAI, BaseKvStore)

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::common::AnalysisRequest;

// =============================================================================
// AI Trait (Infrastructure - chat completion)
// =============================================================================

#[async_trait]
pub trait BaseAI: Send + Sync {
    /// Run one chat completion with a system and a user message.
    /// Returns the raw reply text; parsing is the caller's job.
    async fn chat(&self, system_prompt: &str, user_content: &str) -> Result<String>;
}

// =============================================================================
// Key-Value Store Trait (Infrastructure - durable store with TTL)
// =============================================================================

#[async_trait]
pub trait BaseKvStore: Send + Sync {
    /// Read a value. Expired or missing keys return `None`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value that expires after `ttl`.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
}

// =============================================================================
// Queue Trait (Infrastructure - producer side)
// =============================================================================

#[async_trait]
pub trait BaseQueue: Send + Sync {
    /// Publish a request for asynchronous processing.
    async fn send(&self, request: &AnalysisRequest) -> Result<()>;
}

// =============================================================================
// Email Trait (Infrastructure - transactional email)
// =============================================================================

#[async_trait]
pub trait BaseEmailService: Send + Sync {
    /// Send one HTML email. Returns the provider's message id.
    async fn send_html(&self, to: &str, subject: &str, html: &str) -> Result<String>;
}

// =============================================================================
// Page Fetcher Trait (Infrastructure - single GET)
// =============================================================================

/// A fetched document.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects
    pub final_url: String,
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait BasePageFetcher: Send + Sync {
    /// Perform one GET request. Transport failures are errors; HTTP status
    /// codes are reported in the result for the caller to judge.
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

// =============================================================================
// Clock Trait (Infrastructure - wall clock)
// =============================================================================

pub trait BaseClock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}
