//! CreatePaymentIntentHandler - Command handler for tenant-initiated payments.
//!
//! Opens a payment intent at the processor and records a pending payment
//! carrying the returned intent id. The processor later confirms or fails
//! the payment through a webhook.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::foundation::{LeaseId, PaymentId, Timestamp, UserId};
use crate::domain::payment::{
    compute_fee, AuthorizationGuard, Payment, PaymentAmount, PaymentDraft, PaymentError,
    PaymentType,
};
use crate::ports::{CreateIntentRequest, LeaseRegistry, PaymentRepository, ProcessorClient};

use super::PaymentSettings;

/// Command to open a payment intent against a lease.
#[derive(Debug, Clone)]
pub struct CreatePaymentIntentCommand {
    pub lease_id: LeaseId,
    /// Authenticated tenant paying the lease.
    pub tenant_id: UserId,
    /// Gross amount; validated by the handler.
    pub amount: Decimal,
    pub payment_type: PaymentType,
    /// Defaults to now when absent.
    pub due_date: Option<Timestamp>,
    pub description: Option<String>,
}

/// Result of a successful intent creation.
#[derive(Debug, Clone)]
pub struct CreatePaymentIntentResult {
    pub payment_id: PaymentId,
    /// Secret the client uses to confirm the intent with the processor.
    pub client_token: String,
    pub amount: PaymentAmount,
    pub payment: Payment,
}

/// Handler for creating processor-backed payments.
pub struct CreatePaymentIntentHandler {
    leases: Arc<dyn LeaseRegistry>,
    repository: Arc<dyn PaymentRepository>,
    processor: Arc<dyn ProcessorClient>,
    guard: AuthorizationGuard,
    settings: PaymentSettings,
}

impl CreatePaymentIntentHandler {
    pub fn new(
        leases: Arc<dyn LeaseRegistry>,
        repository: Arc<dyn PaymentRepository>,
        processor: Arc<dyn ProcessorClient>,
        settings: PaymentSettings,
    ) -> Self {
        Self {
            leases,
            repository,
            processor,
            guard: AuthorizationGuard::new(),
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreatePaymentIntentCommand,
    ) -> Result<CreatePaymentIntentResult, PaymentError> {
        // 1. Validate input before any I/O
        let amount = PaymentAmount::new(cmd.amount)?;
        let fee = compute_fee(&amount, self.settings.platform_fee_bps)?;

        // 2. Load lease
        let lease = self
            .leases
            .get_lease(&cmd.lease_id)
            .await?
            .ok_or(PaymentError::lease_not_found(cmd.lease_id))?;

        // 3. Authorize
        let decision = self.guard.can_initiate_intent(&cmd.tenant_id, &lease);
        if let Some(reason) = decision.denial_reason {
            return Err(PaymentError::forbidden(reason));
        }

        // 4. Open the intent at the processor
        let draft =
            PaymentDraft::for_lease(PaymentId::new(), &lease, amount, &self.settings.currency)
                .with_type(cmd.payment_type)
                .with_description(cmd.description);
        let request = intent_request(&draft);

        let intent = match tokio::time::timeout(
            self.settings.processor_timeout,
            self.processor.create_intent(request),
        )
        .await
        {
            Ok(Ok(intent)) => intent,
            Ok(Err(err)) => {
                tracing::warn!(
                    lease_id = %cmd.lease_id,
                    payment_id = %draft.id,
                    code = %err.code,
                    error = %err.message,
                    "Processor rejected payment intent"
                );
                return Err(err.into());
            }
            Err(_) => {
                tracing::warn!(
                    lease_id = %cmd.lease_id,
                    payment_id = %draft.id,
                    timeout_ms = self.settings.processor_timeout.as_millis() as u64,
                    "Processor timed out creating payment intent"
                );
                return Err(PaymentError::ProcessorTimeout);
            }
        };

        // 5. Persist the pending payment, cancelling the intent if that fails
        let due_date = cmd.due_date.unwrap_or_else(Timestamp::now);
        let payment = Payment::pending_intent(draft, &intent.provider_intent_id, due_date, fee);

        if let Err(err) = self.repository.insert(&payment).await {
            tracing::error!(
                payment_id = %payment.id,
                provider_intent_id = %intent.provider_intent_id,
                error = %err,
                "Failed to persist payment; cancelling processor intent"
            );
            if let Err(cancel_err) = self.processor.cancel_intent(&intent.provider_intent_id).await
            {
                tracing::error!(
                    provider_intent_id = %intent.provider_intent_id,
                    error = %cancel_err,
                    "Failed to cancel orphaned processor intent"
                );
            }
            return Err(err.into());
        }

        tracing::info!(
            payment_id = %payment.id,
            lease_id = %payment.lease_id,
            provider_intent_id = %intent.provider_intent_id,
            amount = %payment.amount,
            "Payment intent created"
        );

        Ok(CreatePaymentIntentResult {
            payment_id: payment.id,
            client_token: intent.client_token,
            amount: payment.amount,
            payment,
        })
    }
}

/// Builds the processor request for a draft.
///
/// The idempotency key is derived from the pre-allocated payment id so a
/// retried call cannot open a second intent for the same payment.
fn intent_request(draft: &PaymentDraft) -> CreateIntentRequest {
    let mut metadata = HashMap::new();
    metadata.insert("payment_id".to_string(), draft.id.to_string());
    metadata.insert("lease_id".to_string(), draft.lease_id.to_string());
    metadata.insert("tenant_id".to_string(), draft.tenant_id.to_string());
    metadata.insert("payment_type".to_string(), draft.payment_type.as_str().to_string());

    CreateIntentRequest {
        amount: draft.amount,
        currency: draft.currency.clone(),
        idempotency_key: format!("payment-intent-{}", draft.id),
        description: draft.description.clone(),
        metadata,
    }
}
