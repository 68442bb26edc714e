//! ReceiveProcessorWebhookHandler - Verifies and enqueues processor webhooks.
//!
//! The HTTP request only authenticates the delivery and hands the event to
//! the reconciliation queue. Status changes happen in the background worker.

use std::sync::Arc;

use crate::domain::payment::{ProcessorEvent, ReconciliationError};
use crate::ports::{ProcessorClient, ProcessorEventQueue};

/// Command carrying a raw webhook delivery.
#[derive(Debug, Clone)]
pub struct ReceiveProcessorWebhookCommand {
    pub payload: Vec<u8>,
    /// Value of the signature header, if present.
    pub signature: Option<String>,
}

/// Handler for processor webhook intake.
pub struct ReceiveProcessorWebhookHandler {
    processor: Arc<dyn ProcessorClient>,
    queue: Arc<dyn ProcessorEventQueue>,
}

impl ReceiveProcessorWebhookHandler {
    pub fn new(processor: Arc<dyn ProcessorClient>, queue: Arc<dyn ProcessorEventQueue>) -> Self {
        Self { processor, queue }
    }

    /// Returns the accepted event.
    ///
    /// # Errors
    ///
    /// - `MissingSignature` / `InvalidSignature` before anything is enqueued
    /// - `MalformedPayload` when the authenticated body cannot be read
    /// - `QueueFull` / `QueueClosed` when the event cannot be queued
    pub async fn handle(
        &self,
        cmd: ReceiveProcessorWebhookCommand,
    ) -> Result<ProcessorEvent, ReconciliationError> {
        let signature = cmd
            .signature
            .filter(|s| !s.trim().is_empty())
            .ok_or(ReconciliationError::MissingSignature)?;

        let event = self
            .processor
            .verify_webhook(&cmd.payload, &signature)
            .await
            .map_err(|err| {
                tracing::warn!(code = %err.code, error = %err.message, "Rejected processor webhook");
                ReconciliationError::from(err)
            })?;

        self.queue.enqueue(event.clone()).await?;

        tracing::debug!(
            event_id = %event.event_id,
            event_type = event.kind.as_str(),
            "Processor event queued"
        );

        Ok(event)
    }
}
