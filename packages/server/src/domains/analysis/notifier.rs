use std::sync::Arc;

use tracing::info;

use super::errors::NotificationError;
use super::report_email::{render_report_email, REPORT_SUBJECT};
use super::summary::AiSummary;
use crate::kernel::BaseEmailService;

/// Sends the report email. Best-effort: callers log failures and move on.
#[derive(Clone)]
pub struct Notifier {
    email: Arc<dyn BaseEmailService>,
}

impl Notifier {
    pub fn new(email: Arc<dyn BaseEmailService>) -> Self {
        Self { email }
    }

    /// `year` is printed in the footer; the caller derives it from its clock.
    pub async fn notify(
        &self,
        recipient: &str,
        url: &str,
        summary: &AiSummary,
        year: i32,
    ) -> Result<(), NotificationError> {
        let html = render_report_email(url, summary, year);

        let message_id = self
            .email
            .send_html(recipient, REPORT_SUBJECT, &html)
            .await
            .map_err(|source| NotificationError {
                recipient: recipient.to_string(),
                source,
            })?;

        info!(email = %recipient, message_id = %message_id, "Sent SEO report email");
        Ok(())
    }
}
