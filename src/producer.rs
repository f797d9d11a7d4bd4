//! NATS publication of detection results and validation rejections.

use crate::types::alert::{FraudDetectionResult, RejectedTransaction};
use anyhow::Result;
use async_nats::Client;
use tracing::debug;

/// Publisher for the alert and rejected-transaction subjects.
#[derive(Clone)]
pub struct AlertProducer {
    client: Client,
    alert_subject: String,
    rejected_subject: String,
}

impl AlertProducer {
    pub fn new(client: Client, alert_subject: &str, rejected_subject: &str) -> Self {
        Self {
            client,
            alert_subject: alert_subject.to_string(),
            rejected_subject: rejected_subject.to_string(),
        }
    }

    /// Publish a detection result carrying at least one alert.
    ///
    /// An empty alert list is a no-op; clean transactions produce no
    /// traffic on the alert subject.
    pub async fn publish_result(&self, result: &FraudDetectionResult) -> Result<()> {
        if result.alerts.is_empty() {
            return Ok(());
        }
        let payload = serde_json::to_vec(result)?;
        self.client
            .publish(self.alert_subject.clone(), payload.into())
            .await?;

        debug!(
            transaction_id = %result.transaction_id,
            risk_score = result.risk_score,
            alerts = result.alerts.len(),
            "Published fraud alerts"
        );
        Ok(())
    }

    /// Route a syntactically invalid transaction to the rejected store.
    pub async fn publish_rejection(&self, rejection: &RejectedTransaction) -> Result<()> {
        let payload = serde_json::to_vec(rejection)?;
        self.client
            .publish(self.rejected_subject.clone(), payload.into())
            .await?;

        debug!(
            transaction_id = %rejection.transaction_id,
            errors = rejection.errors.len(),
            "Published validation rejection"
        );
        Ok(())
    }

    pub fn alert_subject(&self) -> &str {
        &self.alert_subject
    }
}

#[cfg(test)]
mod tests {
    // Publishing requires a running NATS server; covered by the
    // environment-level smoke tests rather than unit tests.
}
