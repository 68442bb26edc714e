//! Payment repository port.
//!
//! Defines the contract for persisting Payment records and for the atomic
//! conditional status update that makes webhook reconciliation idempotent.
//!
//! # Design
//!
//! - **Append and transition only**: payments are never deleted, and the
//!   only mutation is `transition_status`
//! - **Compare-and-swap**: `transition_status` applies only when the stored
//!   status still equals `expected`, so duplicate or reordered deliveries
//!   cannot move a payment twice
//! - **Unique intent id**: `provider_intent_id` is unique when present

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, LeaseId, PaymentId, Timestamp};
use crate::domain::payment::{Payment, PaymentStatus};

/// Outcome of a conditional status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusTransition {
    /// The update was applied; carries the updated payment.
    Applied(Payment),

    /// The payment exists but was no longer in the expected status.
    Stale { current: PaymentStatus },

    /// No payment carries the given intent id.
    NotFound,
}

/// Repository port for Payment persistence.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Insert a new payment.
    ///
    /// # Errors
    ///
    /// - `DuplicateProviderIntent` if another payment has the same intent id
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, payment: &Payment) -> Result<(), DomainError>;

    /// Find a payment by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError>;

    /// Find the payment correlated with a processor intent.
    async fn find_by_provider_intent_id(
        &self,
        provider_intent_id: &str,
    ) -> Result<Option<Payment>, DomainError>;

    /// List all payments for a lease, newest first.
    async fn list_by_lease(&self, lease_id: &LeaseId) -> Result<Vec<Payment>, DomainError>;

    /// Atomically move a payment from `expected` to `target`.
    ///
    /// Sets `paid_date` to `at` when `target` is `Paid` and no paid date is
    /// recorded yet.
    async fn transition_status(
        &self,
        provider_intent_id: &str,
        expected: PaymentStatus,
        target: PaymentStatus,
        at: Timestamp,
    ) -> Result<StatusTransition, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn PaymentRepository) {}
    }

    #[test]
    fn stale_carries_current_status() {
        let outcome = StatusTransition::Stale {
            current: PaymentStatus::Paid,
        };
        assert_ne!(outcome, StatusTransition::NotFound);
    }
}
