//! NATS consumption of wire-transfer payloads.

use crate::types::transaction::Transaction;
use anyhow::{Context, Result};
use async_nats::{Client, Subscriber};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One queue message: the transaction record plus its raw MT103 text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePayload {
    pub transaction: Transaction,
    pub raw_message: String,
}

impl WirePayload {
    /// Decode a queue message body.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload).context("Failed to decode wire payload")
    }
}

/// Queue-group subscriber for the transaction subject. Instances sharing
/// the group split the subject between them.
pub struct TransactionConsumer {
    client: Client,
    subject: String,
    queue_group: String,
}

impl TransactionConsumer {
    pub fn new(client: Client, subject: &str, queue_group: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
            queue_group: queue_group.to_string(),
        }
    }

    /// Subscribe to the transaction subject.
    pub async fn subscribe(&self) -> Result<Subscriber> {
        let subscriber = self
            .client
            .queue_subscribe(self.subject.clone(), self.queue_group.clone())
            .await?;
        info!(
            subject = %self.subject,
            queue_group = %self.queue_group,
            "Subscribed to transaction subject"
        );
        Ok(subscriber)
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}
