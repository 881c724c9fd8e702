// TestDependencies - mock implementations for testing
//
// Provides in-memory fakes for every Base* trait so the intake gate and the
// analysis pipeline can run without Redis, NATS, OpenAI or Resend.

use anyhow::Result;
use async_trait::async_trait;
use openai_client::OpenAIError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{
    BaseAI, BaseClock, BaseEmailService, BaseKvStore, BasePageFetcher, BaseQueue, FetchedPage,
    ServerDeps,
};
use crate::common::AnalysisRequest;
use crate::config::{AnalysisConfig, IntakeConfig};

// =============================================================================
// Manual Clock
// =============================================================================

/// Clock that only moves when told to
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl BaseClock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Mock Key-Value Store
// =============================================================================

/// A recorded `put` call
#[derive(Debug, Clone)]
pub struct PutRecord {
    pub key: String,
    pub value: String,
    pub ttl: Duration,
}

/// In-memory store whose entries expire against the injected clock
pub struct MockKvStore {
    clock: Arc<dyn BaseClock>,
    entries: Arc<Mutex<HashMap<String, (String, i64)>>>,
    puts: Arc<Mutex<Vec<PutRecord>>>,
    fail_writes: bool,
}

impl MockKvStore {
    pub fn new(clock: Arc<dyn BaseClock>) -> Self {
        Self {
            clock,
            entries: Arc::new(Mutex::new(HashMap::new())),
            puts: Arc::new(Mutex::new(Vec::new())),
            fail_writes: false,
        }
    }

    /// Make every `put` fail
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Insert an entry directly, without recording a put
    pub fn seed(&self, key: &str, value: &str, ttl: Duration) {
        let expires_at = self.clock.now_millis() + ttl.as_millis() as i64;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), expires_at));
    }

    /// All put calls in order
    pub fn puts(&self) -> Vec<PutRecord> {
        self.puts.lock().unwrap().clone()
    }

    /// Current (unexpired) value of a key
    pub fn value(&self, key: &str) -> Option<String> {
        let now = self.clock.now_millis();
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(value, _)| value.clone())
    }

    /// Unexpired keys starting with `prefix`, sorted
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let now = self.clock.now_millis();
        let mut keys: Vec<String> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, (_, expires_at))| key.starts_with(prefix) && *expires_at > now)
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl BaseKvStore for MockKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.value(key))
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        if self.fail_writes {
            anyhow::bail!("mock store write failure");
        }
        self.puts.lock().unwrap().push(PutRecord {
            key: key.to_string(),
            value: value.to_string(),
            ttl,
        });
        self.seed(key, value, ttl);
        Ok(())
    }
}

// =============================================================================
// Mock Queue
// =============================================================================

#[derive(Default)]
pub struct MockQueue {
    sent: Arc<Mutex<Vec<AnalysisRequest>>>,
    fail: bool,
}

impl MockQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Requests published so far
    pub fn sent(&self) -> Vec<AnalysisRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseQueue for MockQueue {
    async fn send(&self, request: &AnalysisRequest) -> Result<()> {
        if self.fail {
            anyhow::bail!("mock queue unavailable");
        }
        self.sent.lock().unwrap().push(request.clone());
        Ok(())
    }
}

// =============================================================================
// Mock AI
// =============================================================================

/// Reply used when no scripted responses are left
pub const DEFAULT_AI_REPLY: &str = r#"{
  "score": 50,
  "summary": "Mock summary.",
  "observations": {"title": "Mock observation"},
  "recommendations": ["Mock recommendation"],
  "priorityActions": ["Mock action"]
}"#;

enum MockAIFailure {
    Transport(String),
    Api(u16),
}

pub struct MockAI {
    responses: Arc<Mutex<Vec<String>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    failure: Option<MockAIFailure>,
}

impl MockAI {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            failure: None,
        }
    }

    /// Queue a raw reply; replies are returned in order
    pub fn with_response(self, reply: &str) -> Self {
        self.responses.lock().unwrap().push(reply.to_string());
        self
    }

    /// Make every call fail as a transport error would
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(MockAIFailure::Transport(message.to_string()));
        self
    }

    /// Make every call fail with an API error status
    pub fn rejecting(mut self, status: u16) -> Self {
        self.failure = Some(MockAIFailure::Api(status));
        self
    }

    /// (system prompt, user content) of every call
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockAI {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAI for MockAI {
    async fn chat(&self, system_prompt: &str, user_content: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_content.to_string()));

        match &self.failure {
            Some(MockAIFailure::Transport(message)) => anyhow::bail!("{}", message),
            Some(MockAIFailure::Api(status)) => {
                return Err(OpenAIError::Api {
                    status: *status,
                    message: "mock rejection".to_string(),
                }
                .into())
            }
            None => {}
        }

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(DEFAULT_AI_REPLY.to_string())
        } else {
            Ok(responses.remove(0))
        }
    }
}

// =============================================================================
// Mock Email Service
// =============================================================================

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Default)]
pub struct MockEmailService {
    sent: Arc<Mutex<Vec<SentEmail>>>,
    fail: bool,
}

impl MockEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseEmailService for MockEmailService {
    async fn send_html(&self, to: &str, subject: &str, html: &str) -> Result<String> {
        if self.fail {
            anyhow::bail!("mock email provider rejected the message");
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(format!("mock-email-{}", sent.len()))
    }
}

// =============================================================================
// Mock Page Fetcher
// =============================================================================

/// Serves canned pages by URL. Unknown URLs fail like a DNS error would.
#[derive(Default)]
pub struct MockPageFetcher {
    pages: Arc<Mutex<HashMap<String, FetchedPage>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockPageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` with status 200
    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.with_status(url, 200, html)
    }

    pub fn with_status(self, url: &str, status: u16, body: &str) -> Self {
        self.pages.lock().unwrap().insert(
            url.to_string(),
            FetchedPage {
                final_url: url.to_string(),
                status,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BasePageFetcher for MockPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        self.calls.lock().unwrap().push(url.to_string());
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("mock fetcher: could not resolve {}", url))
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Bundle of fakes, kept as concrete types so tests can inspect them
pub struct TestDependencies {
    pub kv: Arc<MockKvStore>,
    pub queue: Arc<MockQueue>,
    pub ai: Arc<MockAI>,
    pub email: Arc<MockEmailService>,
    pub fetcher: Arc<MockPageFetcher>,
    pub clock: Arc<ManualClock>,
}

/// Start time for test clocks: 2026-01-01T00:00:00Z
pub const TEST_EPOCH_MILLIS: i64 = 1_767_225_600_000;

impl TestDependencies {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(TEST_EPOCH_MILLIS));
        Self {
            kv: Arc::new(MockKvStore::new(clock.clone())),
            queue: Arc::new(MockQueue::new()),
            ai: Arc::new(MockAI::new()),
            email: Arc::new(MockEmailService::new()),
            fetcher: Arc::new(MockPageFetcher::new()),
            clock,
        }
    }

    /// Set a mock AI
    pub fn mock_ai(mut self, ai: MockAI) -> Self {
        self.ai = Arc::new(ai);
        self
    }

    /// Set a mock page fetcher
    pub fn mock_fetcher(mut self, fetcher: MockPageFetcher) -> Self {
        self.fetcher = Arc::new(fetcher);
        self
    }

    /// Set a mock email service
    pub fn mock_email(mut self, email: MockEmailService) -> Self {
        self.email = Arc::new(email);
        self
    }

    /// Set a mock queue
    pub fn mock_queue(mut self, queue: MockQueue) -> Self {
        self.queue = Arc::new(queue);
        self
    }

    /// Make every store write fail
    pub fn failing_store(mut self) -> Self {
        self.kv = Arc::new(MockKvStore::new(self.clock.clone()).failing_writes());
        self
    }

    /// Convert into ServerDeps with default configuration
    pub fn into_server_deps(&self) -> ServerDeps {
        self.server_deps_with(IntakeConfig::default(), AnalysisConfig::default())
    }

    pub fn server_deps_with(&self, intake: IntakeConfig, analysis: AnalysisConfig) -> ServerDeps {
        ServerDeps::new(
            self.kv.clone(),
            self.queue.clone(),
            self.ai.clone(),
            self.email.clone(),
            self.fetcher.clone(),
            self.clock.clone(),
            intake,
            analysis,
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
