//! Read-only lease shapes surfaced by the lease registry.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{LeaseId, PropertyId, UserId};

/// Tenant bound to a lease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Lease as seen by the payment subsystem.
///
/// The landlord is derived from the property that owns the lease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseSummary {
    pub id: LeaseId,
    pub tenant: TenantSummary,
    pub property_id: PropertyId,
    pub landlord_id: UserId,
    pub monthly_rent: Decimal,
    pub status: String,
}

impl LeaseSummary {
    pub fn tenant_id(&self) -> &UserId {
        &self.tenant.id
    }
}
