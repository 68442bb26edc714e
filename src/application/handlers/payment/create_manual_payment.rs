//! CreateManualPaymentHandler - Command handler for landlord-recorded payments.
//!
//! Records a payment received outside the processor (cash, check, bank
//! transfer). The payment is stored as already paid and never reconciled.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::foundation::{LeaseId, PaymentId, Timestamp, UserId};
use crate::domain::payment::{
    compute_fee, AuthorizationGuard, Payment, PaymentAmount, PaymentDraft, PaymentError,
    PaymentType,
};
use crate::ports::{LeaseRegistry, PaymentRepository};

use super::PaymentSettings;

/// Command to record a manual payment.
#[derive(Debug, Clone)]
pub struct CreateManualPaymentCommand {
    pub lease_id: LeaseId,
    /// Authenticated landlord recording the payment.
    pub landlord_id: UserId,
    pub amount: Decimal,
    /// Defaults to now when absent.
    pub paid_at: Option<Timestamp>,
    pub payment_type: PaymentType,
    pub description: Option<String>,
}

/// Handler for recording manual payments.
pub struct CreateManualPaymentHandler {
    leases: Arc<dyn LeaseRegistry>,
    repository: Arc<dyn PaymentRepository>,
    guard: AuthorizationGuard,
    settings: PaymentSettings,
}

impl CreateManualPaymentHandler {
    pub fn new(
        leases: Arc<dyn LeaseRegistry>,
        repository: Arc<dyn PaymentRepository>,
        settings: PaymentSettings,
    ) -> Self {
        Self {
            leases,
            repository,
            guard: AuthorizationGuard::new(),
            settings,
        }
    }

    pub async fn handle(&self, cmd: CreateManualPaymentCommand) -> Result<Payment, PaymentError> {
        let amount = PaymentAmount::new(cmd.amount)?;
        let fee = compute_fee(&amount, self.settings.platform_fee_bps)?;

        let lease = self
            .leases
            .get_lease(&cmd.lease_id)
            .await?
            .ok_or(PaymentError::lease_not_found(cmd.lease_id))?;

        let decision = self.guard.can_record_manual(&cmd.landlord_id, &lease);
        if let Some(reason) = decision.denial_reason {
            return Err(PaymentError::forbidden(reason));
        }

        let paid_at = cmd.paid_at.unwrap_or_else(Timestamp::now);
        let draft =
            PaymentDraft::for_lease(PaymentId::new(), &lease, amount, &self.settings.currency)
                .with_type(cmd.payment_type)
                .with_description(cmd.description);
        let payment = Payment::manual(draft, paid_at, fee);

        self.repository.insert(&payment).await?;

        tracing::info!(
            payment_id = %payment.id,
            lease_id = %payment.lease_id,
            landlord_id = %cmd.landlord_id,
            amount = %payment.amount,
            "Manual payment recorded"
        );

        Ok(payment)
    }
}
