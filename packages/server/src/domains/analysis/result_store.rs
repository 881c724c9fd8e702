use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::errors::StoreError;
use crate::common::AnalysisArtifact;
use crate::kernel::BaseKvStore;

/// Storage key for an artifact: `result:<email>:<epoch-ms>`.
pub fn result_key(email: &str, timestamp_ms: i64) -> String {
    format!("result:{}:{}", email, timestamp_ms)
}

/// Writes finished artifacts to the durable store with a retention TTL.
#[derive(Clone)]
pub struct ResultStore {
    kv: Arc<dyn BaseKvStore>,
    ttl: Duration,
}

impl ResultStore {
    pub fn new(kv: Arc<dyn BaseKvStore>, ttl: Duration) -> Self {
        Self { kv, ttl }
    }

    /// Serialize and write one artifact. Returns the key it was written under.
    pub async fn store(
        &self,
        email: &str,
        timestamp_ms: i64,
        artifact: &AnalysisArtifact,
    ) -> Result<String, StoreError> {
        let key = result_key(email, timestamp_ms);
        let value = serde_json::to_string(artifact)?;

        self.kv
            .put(&key, &value, self.ttl)
            .await
            .map_err(|source| StoreError::Write {
                key: key.clone(),
                source,
            })?;

        info!(key = %key, bytes = value.len(), ttl_secs = self.ttl.as_secs(), "Stored analysis artifact");
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ExtractedPage;
    use crate::domains::analysis::AiSummary;
    use crate::kernel::test_dependencies::{ManualClock, MockKvStore};

    fn artifact() -> AnalysisArtifact {
        AnalysisArtifact {
            url: "https://acme.test/".to_string(),
            scraped_at: "2026-01-01T00:00:00.000Z".to_string(),
            raw_html: "<html></html>".to_string(),
            extracted: ExtractedPage::default(),
            ai_summary: AiSummary::fallback(),
        }
    }

    #[test]
    fn key_format() {
        assert_eq!(
            result_key("a@b.co", 1_700_000_000_123),
            "result:a@b.co:1700000000123"
        );
    }

    #[tokio::test]
    async fn writes_json_with_ttl() {
        let kv = Arc::new(MockKvStore::new(Arc::new(ManualClock::new(0))));
        let store = ResultStore::new(kv.clone(), Duration::from_secs(604_800));

        let key = store.store("a@b.co", 42, &artifact()).await.unwrap();
        assert_eq!(key, "result:a@b.co:42");

        let puts = kv.puts();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].ttl, Duration::from_secs(604_800));
        let json: serde_json::Value = serde_json::from_str(&puts[0].value).unwrap();
        assert_eq!(json["url"], "https://acme.test/");
        assert_eq!(json["aiSummary"]["summary"], "Failed to parse AI response.");
    }

    #[tokio::test]
    async fn write_failure_is_store_error() {
        let kv = Arc::new(MockKvStore::new(Arc::new(ManualClock::new(0))).failing_writes());
        let store = ResultStore::new(kv, Duration::from_secs(60));

        let err = store.store("a@b.co", 1, &artifact()).await.unwrap_err();
        assert!(matches!(err, StoreError::Write { ref key, .. } if key == "result:a@b.co:1"));
    }
}
