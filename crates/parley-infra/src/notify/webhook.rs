//! Webhook notifier for committed bug reports.
//!
//! POSTs the report record as JSON to a configured URL. Delivery failures
//! surface as [`NotifyError`]; the report pipeline logs them and carries on,
//! so this channel can never fail a submission.

use std::time::Duration;

use parley_core::report::stores::Notifier;
use parley_types::error::NotifyError;
use parley_types::report::BugReport;

/// HTTP webhook implementation of `Notifier`.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// Create a notifier posting to `url`.
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            url: url.into(),
        }
    }
}

impl Notifier for WebhookNotifier {
    async fn notify(&self, report: &BugReport) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(report)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Delivery(format!(
                "webhook returned HTTP {status}"
            )));
        }
        Ok(())
    }
}
