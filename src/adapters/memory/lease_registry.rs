//! In-memory implementation of LeaseRegistry.
//!
//! Seeded with fixed leases for development and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::domain::foundation::{DomainError, LeaseId};
use crate::domain::payment::LeaseSummary;
use crate::ports::LeaseRegistry;

#[derive(Clone, Default)]
pub struct InMemoryLeaseRegistry {
    leases: Arc<RwLock<HashMap<LeaseId, LeaseSummary>>>,
}

impl InMemoryLeaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the given leases.
    pub fn with_leases(leases: impl IntoIterator<Item = LeaseSummary>) -> Self {
        let registry = Self::new();
        for lease in leases {
            registry.add(lease);
        }
        registry
    }

    pub fn add(&self, lease: LeaseSummary) {
        self.leases
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(lease.id, lease);
    }
}

#[async_trait]
impl LeaseRegistry for InMemoryLeaseRegistry {
    async fn get_lease(&self, lease_id: &LeaseId) -> Result<Option<LeaseSummary>, DomainError> {
        let leases = self
            .leases
            .read()
            .map_err(|_| DomainError::database("lease registry lock poisoned"))?;
        Ok(leases.get(lease_id).cloned())
    }
}
