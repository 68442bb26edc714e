//! Lease registry port (read-only).
//!
//! Leases are owned by the leasing subsystem. Payments only need the
//! tenant and landlord bound to a lease, surfaced as a `LeaseSummary`.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, LeaseId};
use crate::domain::payment::LeaseSummary;

/// Read-only lookup of leases.
#[async_trait]
pub trait LeaseRegistry: Send + Sync {
    /// Fetch a lease with its tenant and owning landlord.
    ///
    /// Returns `None` if the lease does not exist.
    async fn get_lease(&self, lease_id: &LeaseId) -> Result<Option<LeaseSummary>, DomainError>;
}
