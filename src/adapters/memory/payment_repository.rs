//! In-memory implementation of PaymentRepository.
//!
//! Used for local development and tests. The conditional status update runs
//! as a check-and-set under a single write lock, which gives the same
//! one-winner guarantee as the Postgres `UPDATE ... WHERE status = $expected`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, LeaseId, PaymentId, Timestamp};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::ports::{PaymentRepository, StatusTransition};

#[derive(Default)]
struct Store {
    payments: HashMap<PaymentId, Payment>,
    by_intent: HashMap<String, PaymentId>,
}

/// In-memory payment store.
#[derive(Clone, Default)]
pub struct InMemoryPaymentRepository {
    store: Arc<RwLock<Store>>,
    fail_inserts: Arc<AtomicBool>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent insert fail with a database error.
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    /// Number of stored payments.
    pub async fn len(&self) -> usize {
        self.store.read().await.payments.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn insert(&self, payment: &Payment) -> Result<(), DomainError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(DomainError::database("insert failed"));
        }

        let mut store = self.store.write().await;
        if let Some(intent_id) = &payment.provider_intent_id {
            if store.by_intent.contains_key(intent_id) {
                return Err(DomainError::new(
                    ErrorCode::DuplicateProviderIntent,
                    "A payment already exists for this processor intent",
                ));
            }
            store.by_intent.insert(intent_id.clone(), payment.id);
        }
        store.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        Ok(self.store.read().await.payments.get(id).cloned())
    }

    async fn find_by_provider_intent_id(
        &self,
        provider_intent_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        let store = self.store.read().await;
        Ok(store
            .by_intent
            .get(provider_intent_id)
            .and_then(|id| store.payments.get(id))
            .cloned())
    }

    async fn list_by_lease(&self, lease_id: &LeaseId) -> Result<Vec<Payment>, DomainError> {
        let store = self.store.read().await;
        let mut payments: Vec<Payment> = store
            .payments
            .values()
            .filter(|p| &p.lease_id == lease_id)
            .cloned()
            .collect();
        payments.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(payments)
    }

    async fn transition_status(
        &self,
        provider_intent_id: &str,
        expected: PaymentStatus,
        target: PaymentStatus,
        at: Timestamp,
    ) -> Result<StatusTransition, DomainError> {
        let mut store = self.store.write().await;
        let Some(id) = store.by_intent.get(provider_intent_id).copied() else {
            return Ok(StatusTransition::NotFound);
        };
        let Some(payment) = store.payments.get_mut(&id) else {
            return Ok(StatusTransition::NotFound);
        };

        if payment.status != expected {
            return Ok(StatusTransition::Stale {
                current: payment.status,
            });
        }

        payment
            .apply_transition(target, at)
            .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))?;
        Ok(StatusTransition::Applied(payment.clone()))
    }
}
