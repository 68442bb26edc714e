//! PostgreSQL implementation of PaymentRepository.
//!
//! Status changes go through a single conditional `UPDATE ... WHERE status = $expected
//! RETURNING`, so concurrent webhook deliveries race on the row lock and only
//! one of them observes the row in the expected state.

use crate::domain::foundation::{
    DomainError, ErrorCode, LeaseId, PaymentId, Timestamp, UserId,
};
use crate::domain::payment::{
    Payment, PaymentAmount, PaymentProvider, PaymentStatus, PaymentType,
};
use crate::ports::{PaymentRepository, StatusTransition};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

const PAYMENT_COLUMNS: &str = r#"
    id, lease_id, tenant_id, amount, currency, payment_type, status, provider,
    provider_intent_id, due_date, paid_date, fee_amount, net_amount, description,
    created_at, updated_at
"#;

const PROVIDER_INTENT_UNIQUE: &str = "payments_provider_intent_id_key";

/// PostgreSQL implementation of the PaymentRepository port.
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    /// Creates a new PostgresPaymentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    lease_id: Uuid,
    tenant_id: String,
    amount: Decimal,
    currency: String,
    payment_type: String,
    status: String,
    provider: String,
    provider_intent_id: Option<String>,
    due_date: DateTime<Utc>,
    paid_date: Option<DateTime<Utc>>,
    fee_amount: Decimal,
    net_amount: Decimal,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            lease_id: LeaseId::from_uuid(row.lease_id),
            tenant_id: UserId::new(row.tenant_id).map_err(corrupt_row)?,
            amount: PaymentAmount::new(row.amount).map_err(corrupt_row)?,
            currency: row.currency,
            payment_type: row.payment_type.parse::<PaymentType>().map_err(corrupt_row)?,
            status: parse_status(&row.status)?,
            provider: row.provider.parse::<PaymentProvider>().map_err(corrupt_row)?,
            provider_intent_id: row.provider_intent_id,
            due_date: Timestamp::from_datetime(row.due_date),
            paid_date: row.paid_date.map(Timestamp::from_datetime),
            fee_amount: row.fee_amount,
            net_amount: row.net_amount,
            description: row.description,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn corrupt_row(err: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Invalid payment row: {}", err))
}

fn parse_status(s: &str) -> Result<PaymentStatus, DomainError> {
    let status = s.parse::<PaymentStatus>().map_err(corrupt_row)?;
    if !status.is_storable() {
        return Err(corrupt_row(format!("status '{}' is never stored", s)));
    }
    Ok(status)
}

fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    DomainError::database(format!("{}: {}", context, err))
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn insert(&self, payment: &Payment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, lease_id, tenant_id, amount, currency, payment_type, status, provider,
                provider_intent_id, due_date, paid_date, fee_amount, net_amount, description,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.lease_id.as_uuid())
        .bind(payment.tenant_id.as_str())
        .bind(payment.amount.as_decimal())
        .bind(&payment.currency)
        .bind(payment.payment_type.as_str())
        .bind(payment.status.as_str())
        .bind(payment.provider.as_str())
        .bind(&payment.provider_intent_id)
        .bind(payment.due_date.as_datetime())
        .bind(payment.paid_date.as_ref().map(|t| *t.as_datetime()))
        .bind(payment.fee_amount)
        .bind(payment.net_amount)
        .bind(&payment.description)
        .bind(payment.created_at.as_datetime())
        .bind(payment.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some(PROVIDER_INTENT_UNIQUE) {
                    return DomainError::new(
                        ErrorCode::DuplicateProviderIntent,
                        "A payment already exists for this processor intent",
                    );
                }
            }
            db_error("Failed to insert payment", e)
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        let sql = format!("SELECT {} FROM payments WHERE id = $1", PAYMENT_COLUMNS);
        let row: Option<PaymentRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find payment", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn find_by_provider_intent_id(
        &self,
        provider_intent_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        let sql = format!(
            "SELECT {} FROM payments WHERE provider_intent_id = $1",
            PAYMENT_COLUMNS
        );
        let row: Option<PaymentRow> = sqlx::query_as(&sql)
            .bind(provider_intent_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to find payment by intent", e))?;

        row.map(Payment::try_from).transpose()
    }

    async fn list_by_lease(&self, lease_id: &LeaseId) -> Result<Vec<Payment>, DomainError> {
        let sql = format!(
            "SELECT {} FROM payments WHERE lease_id = $1 ORDER BY created_at DESC, id DESC",
            PAYMENT_COLUMNS
        );
        let rows: Vec<PaymentRow> = sqlx::query_as(&sql)
            .bind(lease_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("Failed to list payments", e))?;

        rows.into_iter().map(Payment::try_from).collect()
    }

    async fn transition_status(
        &self,
        provider_intent_id: &str,
        expected: PaymentStatus,
        target: PaymentStatus,
        at: Timestamp,
    ) -> Result<StatusTransition, DomainError> {
        let sql = format!(
            r#"
            UPDATE payments SET
                status = $3,
                paid_date = CASE WHEN $3 = 'paid' THEN COALESCE(paid_date, $4) ELSE paid_date END,
                updated_at = $4
            WHERE provider_intent_id = $1 AND status = $2
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        );
        let updated: Option<PaymentRow> = sqlx::query_as(&sql)
            .bind(provider_intent_id)
            .bind(expected.as_str())
            .bind(target.as_str())
            .bind(at.as_datetime())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to transition payment", e))?;

        if let Some(row) = updated {
            return Ok(StatusTransition::Applied(Payment::try_from(row)?));
        }

        let current: Option<(String,)> =
            sqlx::query_as("SELECT status FROM payments WHERE provider_intent_id = $1")
                .bind(provider_intent_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to read payment status", e))?;

        match current {
            Some((status,)) => Ok(StatusTransition::Stale {
                current: parse_status(&status)?,
            }),
            None => Ok(StatusTransition::NotFound),
        }
    }
}
