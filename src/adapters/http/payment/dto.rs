//! Request and response DTOs for payment endpoints.
//!
//! Field names are camelCase on the wire. Amounts are decimals and are
//! accepted as JSON numbers or strings.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::handlers::payment::{
    CreatePaymentIntentResult, LeasePaymentHistory, PaymentEntry,
};
use crate::domain::foundation::{LeaseId, PaymentId, Timestamp, UserId};
use crate::domain::payment::{
    LeaseSummary, Payment, PaymentAmount, PaymentDetails, PaymentProvider, PaymentStatus,
    PaymentType,
};

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/payments/intent`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentRequest {
    pub lease_id: LeaseId,
    pub amount: Decimal,
    #[serde(rename = "type", default)]
    pub payment_type: PaymentType,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `POST /api/payments/manual`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateManualPaymentRequest {
    pub lease_id: LeaseId,
    pub amount: Decimal,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(rename = "type", default)]
    pub payment_type: PaymentType,
    #[serde(default)]
    pub description: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

/// Response of `POST /api/payments/intent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub payment_id: PaymentId,
    pub client_token: String,
    pub amount: PaymentAmount,
}

impl From<CreatePaymentIntentResult> for PaymentIntentResponse {
    fn from(result: CreatePaymentIntentResult) -> Self {
        Self {
            payment_id: result.payment_id,
            client_token: result.client_token,
            amount: result.amount,
        }
    }
}

/// A payment record.
///
/// `status` is the effective status, so a past-due pending payment reads
/// as `OVERDUE`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: PaymentId,
    pub lease_id: LeaseId,
    pub tenant_id: UserId,
    pub amount: PaymentAmount,
    pub currency: String,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    pub status: PaymentStatus,
    pub provider: PaymentProvider,
    pub provider_intent_id: Option<String>,
    pub due_date: Timestamp,
    pub paid_date: Option<Timestamp>,
    pub fee_amount: Decimal,
    pub net_amount: Decimal,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PaymentResponse {
    pub fn new(payment: Payment, status: PaymentStatus) -> Self {
        Self {
            id: payment.id,
            lease_id: payment.lease_id,
            tenant_id: payment.tenant_id,
            amount: payment.amount,
            currency: payment.currency,
            payment_type: payment.payment_type,
            status,
            provider: payment.provider,
            provider_intent_id: payment.provider_intent_id,
            due_date: payment.due_date,
            paid_date: payment.paid_date,
            fee_amount: payment.fee_amount,
            net_amount: payment.net_amount,
            description: payment.description,
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        }
    }

    /// Wraps a freshly created payment, which is never overdue.
    pub fn created(payment: Payment) -> Self {
        let status = payment.status;
        Self::new(payment, status)
    }
}

impl From<PaymentEntry> for PaymentResponse {
    fn from(entry: PaymentEntry) -> Self {
        Self::new(entry.payment, entry.effective_status)
    }
}

/// Response of `GET /api/payments/:id`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetailsResponse {
    #[serde(flatten)]
    pub payment: PaymentResponse,
    pub lease: LeaseSummary,
}

impl From<PaymentDetails> for PaymentDetailsResponse {
    fn from(details: PaymentDetails) -> Self {
        Self {
            payment: PaymentResponse::new(details.payment, details.effective_status),
            lease: details.lease,
        }
    }
}

/// Response of `GET /api/leases/:lease_id/payments`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeasePaymentsResponse {
    pub lease_id: LeaseId,
    pub payments: Vec<PaymentResponse>,
}

impl From<LeasePaymentHistory> for LeasePaymentsResponse {
    fn from(history: LeasePaymentHistory) -> Self {
        Self {
            lease_id: history.lease.id,
            payments: history.payments.into_iter().map(Into::into).collect(),
        }
    }
}

/// Response of the webhook endpoint once a delivery is accepted.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Error body shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: serde_json::Map::new(),
        }
    }

    pub fn with_detail(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}
