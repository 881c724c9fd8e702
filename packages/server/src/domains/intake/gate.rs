//! Intake gate - synchronous admission of analysis requests
//!
//! Order of checks:
//! 1. body shape and field validation (errors collected)
//! 2. denylist, as soon as the URL is known, regardless of email validity
//! 3. per-email rate limit (`rate:<email>`)
//! 4. rate record write, then enqueue
//!
//! The rate limit is read-then-write with no lock, so two requests racing
//! inside one interval can both pass.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::denylist::Denylist;
use super::validation::{check_fields, FieldError};
use crate::common::AnalysisRequest;
use crate::config::IntakeConfig;
use crate::kernel::{BaseClock, BaseKvStore, BaseQueue};

/// Why a request was not admitted.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Invalid request")]
    Validation(Vec<FieldError>),

    #[error("This domain is not allowed for scraping")]
    Policy { host: String },

    #[error("Too many requests – slow down")]
    RateLimited,

    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

/// Key of the rate-limit record for one requester.
pub fn rate_key(email: &str) -> String {
    format!("rate:{}", email)
}

#[derive(Clone)]
pub struct IntakeGate {
    kv: Arc<dyn BaseKvStore>,
    queue: Arc<dyn BaseQueue>,
    clock: Arc<dyn BaseClock>,
    denylist: Denylist,
    config: IntakeConfig,
}

impl IntakeGate {
    pub fn new(
        kv: Arc<dyn BaseKvStore>,
        queue: Arc<dyn BaseQueue>,
        clock: Arc<dyn BaseClock>,
        config: IntakeConfig,
    ) -> Self {
        Self {
            kv,
            queue,
            clock,
            denylist: Denylist::new(&config.disallowed_domains),
            config,
        }
    }

    /// Validate, police and enqueue one raw request body.
    pub async fn admit(&self, body: &[u8]) -> Result<AnalysisRequest, IntakeError> {
        let checked = check_fields(body);

        if let Some(url) = &checked.url {
            if self.denylist.is_denied(url) {
                let host = url.host_str().unwrap_or_default().to_string();
                info!(host = %host, "Rejected denylisted domain");
                return Err(IntakeError::Policy { host });
            }
        }

        let (Some(url), Some(email)) = (checked.raw_url, checked.email) else {
            debug!(errors = ?checked.errors, "Rejected invalid request");
            return Err(IntakeError::Validation(checked.errors));
        };

        let now = self.clock.now_millis();
        let key = rate_key(&email);

        let last = self.kv.get(&key).await.map_err(IntakeError::Internal)?;
        if let Some(last) = last.as_deref().and_then(|raw| parse_last_request(&key, raw)) {
            if now - last < self.config.rate_limit_interval.as_millis() as i64 {
                info!(email = %email, "Rate limited");
                return Err(IntakeError::RateLimited);
            }
        }

        self.kv
            .put(&key, &now.to_string(), self.config.rate_record_ttl())
            .await
            .map_err(IntakeError::Internal)?;

        let request = AnalysisRequest { url, email };
        self.queue
            .send(&request)
            .await
            .map_err(IntakeError::Internal)?;

        info!(url = %request.url, email = %request.email, "Queued analysis request");
        Ok(request)
    }
}

fn parse_last_request(key: &str, raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(ms) => Some(ms),
        Err(_) => {
            warn!(key = %key, value = %raw, "Ignoring unreadable rate-limit record");
            None
        }
    }
}
