//! ListLeasePaymentsHandler - Query handler for a lease's payment history.

use std::sync::Arc;

use crate::domain::foundation::{Actor, LeaseId, Timestamp};
use crate::domain::payment::{AuthorizationGuard, LeaseSummary, Payment, PaymentError, PaymentStatus};
use crate::ports::{LeaseRegistry, PaymentRepository};

/// Query to list all payments of a lease.
#[derive(Debug, Clone)]
pub struct ListLeasePaymentsQuery {
    pub lease_id: LeaseId,
    pub actor: Actor,
}

/// A payment as listed in a lease history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEntry {
    pub payment: Payment,
    pub effective_status: PaymentStatus,
}

/// Payment history of a lease, newest first.
#[derive(Debug, Clone)]
pub struct LeasePaymentHistory {
    pub lease: LeaseSummary,
    pub payments: Vec<PaymentEntry>,
}

pub struct ListLeasePaymentsHandler {
    leases: Arc<dyn LeaseRegistry>,
    repository: Arc<dyn PaymentRepository>,
    guard: AuthorizationGuard,
}

impl ListLeasePaymentsHandler {
    pub fn new(leases: Arc<dyn LeaseRegistry>, repository: Arc<dyn PaymentRepository>) -> Self {
        Self {
            leases,
            repository,
            guard: AuthorizationGuard::new(),
        }
    }

    pub async fn handle(
        &self,
        query: ListLeasePaymentsQuery,
    ) -> Result<LeasePaymentHistory, PaymentError> {
        let lease = self
            .leases
            .get_lease(&query.lease_id)
            .await?
            .ok_or(PaymentError::lease_not_found(query.lease_id))?;

        let decision = self.guard.can_list_for_lease(&query.actor, &lease);
        if let Some(reason) = decision.denial_reason {
            return Err(PaymentError::forbidden(reason));
        }

        let now = Timestamp::now();
        let payments = self
            .repository
            .list_by_lease(&lease.id)
            .await?
            .into_iter()
            .map(|payment| PaymentEntry {
                effective_status: payment.effective_status(&now),
                payment,
            })
            .collect();

        Ok(LeasePaymentHistory { lease, payments })
    }
}
