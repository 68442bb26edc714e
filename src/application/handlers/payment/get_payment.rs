//! GetPaymentHandler - Query handler for a single payment.

use std::sync::Arc;

use crate::domain::foundation::{Actor, PaymentId, Timestamp};
use crate::domain::payment::{AuthorizationGuard, PaymentDetails, PaymentError};
use crate::ports::{LeaseRegistry, PaymentRepository};

/// Query to fetch a payment with its lease context.
#[derive(Debug, Clone)]
pub struct GetPaymentQuery {
    pub payment_id: PaymentId,
    pub actor: Actor,
}

/// Handler for reading a payment.
///
/// Visible to the payment's tenant, the landlord owning the lease, and admins.
pub struct GetPaymentHandler {
    leases: Arc<dyn LeaseRegistry>,
    repository: Arc<dyn PaymentRepository>,
    guard: AuthorizationGuard,
}

impl GetPaymentHandler {
    pub fn new(leases: Arc<dyn LeaseRegistry>, repository: Arc<dyn PaymentRepository>) -> Self {
        Self {
            leases,
            repository,
            guard: AuthorizationGuard::new(),
        }
    }

    pub async fn handle(&self, query: GetPaymentQuery) -> Result<PaymentDetails, PaymentError> {
        let payment = self
            .repository
            .find_by_id(&query.payment_id)
            .await?
            .ok_or(PaymentError::payment_not_found(query.payment_id))?;

        let lease = self
            .leases
            .get_lease(&payment.lease_id)
            .await?
            .ok_or(PaymentError::lease_not_found(payment.lease_id))?;

        let decision = self.guard.can_read(&query.actor, &payment, &lease);
        if let Some(reason) = decision.denial_reason {
            return Err(PaymentError::forbidden(reason));
        }

        Ok(PaymentDetails::new(payment, lease, &Timestamp::now()))
    }
}
