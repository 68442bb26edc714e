//! ReconcilePaymentHandler - Applies processor events to payments.
//!
//! Each event maps to a single conditional transition out of `Pending`.
//! The repository applies it atomically, so duplicated or reordered
//! deliveries can move a payment at most once.
//!
//! An event can arrive before the payment row that carries its intent id
//! has been committed. `NotFound` is therefore retried with exponential
//! backoff before the event is given up as referring to an unknown intent.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{PaymentId, Timestamp};
use crate::domain::payment::{PaymentStatus, ProcessorEvent, ReconciliationError};
use crate::ports::{PaymentRepository, StatusTransition};

/// Retry policy for events whose payment is not yet visible.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Total lookups before giving up, including the first.
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles after each miss.
    pub initial_backoff: Duration,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(200),
        }
    }
}

impl ReconcilerConfig {
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// What reconciling one event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The payment moved out of `Pending`.
    Applied {
        payment_id: PaymentId,
        status: PaymentStatus,
    },
    /// The payment had already left `Pending`; nothing changed.
    AlreadySettled { current: PaymentStatus },
    /// The event type does not affect payments.
    Ignored,
}

/// Handler for applying processor events.
pub struct ReconcilePaymentHandler {
    repository: Arc<dyn PaymentRepository>,
    config: ReconcilerConfig,
}

impl ReconcilePaymentHandler {
    pub fn new(repository: Arc<dyn PaymentRepository>) -> Self {
        Self::with_config(repository, ReconcilerConfig::default())
    }

    pub fn with_config(repository: Arc<dyn PaymentRepository>, config: ReconcilerConfig) -> Self {
        Self { repository, config }
    }

    pub async fn handle(
        &self,
        event: &ProcessorEvent,
    ) -> Result<ReconcileOutcome, ReconciliationError> {
        self.apply(event, self.config.max_attempts).await
    }

    /// Applies the event with a single lookup and no backoff.
    pub async fn handle_once(
        &self,
        event: &ProcessorEvent,
    ) -> Result<ReconcileOutcome, ReconciliationError> {
        self.apply(event, 1).await
    }

    async fn apply(
        &self,
        event: &ProcessorEvent,
        max_attempts: u32,
    ) -> Result<ReconcileOutcome, ReconciliationError> {
        let Some(target) = event.kind.target_status() else {
            tracing::debug!(
                event_id = %event.event_id,
                event_type = event.kind.as_str(),
                "Ignoring processor event"
            );
            return Ok(ReconcileOutcome::Ignored);
        };

        let intent_id = event.provider_intent_id.as_deref().ok_or_else(|| {
            ReconciliationError::MalformedPayload(format!(
                "event {} has no payment intent id",
                event.event_id
            ))
        })?;

        let mut attempt = 1;
        loop {
            let outcome = self
                .repository
                .transition_status(intent_id, PaymentStatus::Pending, target, Timestamp::now())
                .await
                .map_err(|e| ReconciliationError::Database(e.to_string()))?;

            match outcome {
                StatusTransition::Applied(payment) => {
                    tracing::info!(
                        event_id = %event.event_id,
                        payment_id = %payment.id,
                        provider_intent_id = intent_id,
                        status = %payment.status,
                        "Payment reconciled"
                    );
                    return Ok(ReconcileOutcome::Applied {
                        payment_id: payment.id,
                        status: payment.status,
                    });
                }
                StatusTransition::Stale { current } => {
                    tracing::info!(
                        event_id = %event.event_id,
                        provider_intent_id = intent_id,
                        current = %current,
                        "Payment already settled; event ignored"
                    );
                    return Ok(ReconcileOutcome::AlreadySettled { current });
                }
                StatusTransition::NotFound if attempt < max_attempts => {
                    let delay = self.config.backoff_for(attempt);
                    tracing::debug!(
                        event_id = %event.event_id,
                        provider_intent_id = intent_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Payment not found yet; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                StatusTransition::NotFound => {
                    tracing::warn!(
                        event_id = %event.event_id,
                        provider_intent_id = intent_id,
                        attempts = attempt,
                        "No payment for processor intent"
                    );
                    return Err(ReconciliationError::UnknownIntent(intent_id.to_string()));
                }
            }
        }
    }
}
