//! Pure Resend REST API client.
//!
//! Sends transactional email through `POST /emails`.
//!
//! # Example
//!
//! ```rust,ignore
//! use resend::{ResendOptions, ResendService, SendEmailRequest};
//!
//! let resend = ResendService::new(ResendOptions::new("re_123"));
//! let sent = resend
//!     .send_email(&SendEmailRequest::html(
//!         "no-reply@example.com",
//!         "someone@example.com",
//!         "Hello",
//!         "<p>Hi!</p>",
//!     ))
//!     .await?;
//! println!("queued as {}", sent.id);
//! ```

pub mod error;
pub mod models;

pub use error::{ResendError, Result};
pub use models::{SendEmailRequest, SendEmailResponse};

use reqwest::Client;

const BASE_URL: &str = "https://api.resend.com";

#[derive(Debug, Clone)]
pub struct ResendOptions {
    pub api_key: String,
    pub base_url: String,
}

impl ResendOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Clone)]
pub struct ResendService {
    client: Client,
    options: ResendOptions,
}

impl ResendService {
    pub fn new(options: ResendOptions) -> Self {
        Self {
            client: Client::new(),
            options,
        }
    }

    /// Send one email. Returns the id Resend assigned to it.
    pub async fn send_email(&self, request: &SendEmailRequest) -> Result<SendEmailResponse> {
        if self.options.api_key.is_empty() {
            return Err(ResendError::Config("API key is empty".into()));
        }
        if request.to.is_empty() {
            return Err(ResendError::Config("email has no recipients".into()));
        }

        let url = format!("{}/emails", self.options.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.options.api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %body, "Resend returned an error");
            return Err(ResendError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let sent: SendEmailResponse = resp.json().await?;
        tracing::debug!(id = %sent.id, subject = %request.subject, "Email accepted by Resend");
        Ok(sent)
    }
}
