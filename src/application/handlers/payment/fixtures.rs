//! Shared fixtures for payment handler tests.

use rust_decimal::Decimal;

use crate::domain::foundation::{Actor, LeaseId, PropertyId, UserId};
use crate::domain::payment::{LeaseSummary, TenantSummary};

pub fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

pub fn tenant(id: &str) -> Actor {
    Actor::tenant(user(id))
}

pub fn landlord(id: &str) -> Actor {
    Actor::landlord(user(id))
}

/// Lease rented by `tenant-1` from `landlord-1` at 1200.00 a month.
pub fn lease() -> LeaseSummary {
    lease_for("tenant-1", "landlord-1")
}

pub fn lease_for(tenant_id: &str, landlord_id: &str) -> LeaseSummary {
    LeaseSummary {
        id: LeaseId::new(),
        tenant: TenantSummary {
            id: user(tenant_id),
            name: "Test Tenant".to_string(),
            email: format!("{}@example.com", tenant_id),
        },
        property_id: PropertyId::new(),
        landlord_id: user(landlord_id),
        monthly_rent: dec("1200.00"),
        status: "active".to_string(),
    }
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}
