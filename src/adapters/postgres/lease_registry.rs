//! PostgreSQL implementation of LeaseRegistry.
//!
//! Reads the lease, its tenant, and the landlord of the owning property in
//! one query. The leasing subsystem owns these tables; this adapter never
//! writes to them.

use crate::domain::foundation::{DomainError, ErrorCode, LeaseId, PropertyId, UserId};
use crate::domain::payment::{LeaseSummary, TenantSummary};
use crate::ports::LeaseRegistry;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the LeaseRegistry port.
pub struct PostgresLeaseRegistry {
    pool: PgPool,
}

impl PostgresLeaseRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LeaseRow {
    id: Uuid,
    tenant_id: String,
    tenant_name: String,
    tenant_email: String,
    property_id: Uuid,
    landlord_id: String,
    monthly_rent: Decimal,
    status: String,
}

impl TryFrom<LeaseRow> for LeaseSummary {
    type Error = DomainError;

    fn try_from(row: LeaseRow) -> Result<Self, Self::Error> {
        let invalid = |e: crate::domain::foundation::ValidationError| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid lease row: {}", e))
        };

        Ok(LeaseSummary {
            id: LeaseId::from_uuid(row.id),
            tenant: TenantSummary {
                id: UserId::new(row.tenant_id).map_err(invalid)?,
                name: row.tenant_name,
                email: row.tenant_email,
            },
            property_id: PropertyId::from_uuid(row.property_id),
            landlord_id: UserId::new(row.landlord_id).map_err(invalid)?,
            monthly_rent: row.monthly_rent,
            status: row.status,
        })
    }
}

#[async_trait]
impl LeaseRegistry for PostgresLeaseRegistry {
    async fn get_lease(&self, lease_id: &LeaseId) -> Result<Option<LeaseSummary>, DomainError> {
        let row: Option<LeaseRow> = sqlx::query_as(
            r#"
            SELECT l.id, l.tenant_id, u.full_name AS tenant_name, u.email AS tenant_email,
                   l.property_id, p.landlord_id, l.monthly_rent, l.status
            FROM leases l
            JOIN properties p ON p.id = l.property_id
            JOIN users u ON u.id = l.tenant_id
            WHERE l.id = $1
            "#,
        )
        .bind(lease_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to load lease: {}", e)))?;

        row.map(LeaseSummary::try_from).transpose()
    }
}
