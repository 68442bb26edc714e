//! Payment aggregate entity.
//!
//! A Payment records money owed or received against a lease. It is created
//! either as a pending processor intent or as an already-paid manual entry.
//!
//! # Invariants
//!
//! - `amount > 0` (enforced by `PaymentAmount`)
//! - `tenant_id` is copied from the lease at creation and never changes
//! - `fee_amount + net_amount == amount`
//! - manual payments are `Paid` from birth and carry no `provider_intent_id`
//! - status only moves along `PaymentStatus` transitions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    LeaseId, PaymentId, StateMachine, Timestamp, UserId, ValidationError,
};

use super::{FeeBreakdown, LeaseSummary, PaymentAmount, PaymentStatus};

/// What the payment is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    #[default]
    Rent,
    Deposit,
    Fee,
    Other,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Rent => "rent",
            PaymentType::Deposit => "deposit",
            PaymentType::Fee => "fee",
            PaymentType::Other => "other",
        }
    }
}

impl FromStr for PaymentType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rent" => Ok(PaymentType::Rent),
            "deposit" => Ok(PaymentType::Deposit),
            "fee" => Ok(PaymentType::Fee),
            "other" => Ok(PaymentType::Other),
            other => Err(ValidationError::invalid_format(
                "type",
                format!("unknown payment type '{}'", other),
            )),
        }
    }
}

/// How the payment was collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    /// Collected through the external payment processor.
    Processor,

    /// Recorded by the landlord after an off-platform payment.
    Manual,
}

impl PaymentProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentProvider::Processor => "processor",
            PaymentProvider::Manual => "manual",
        }
    }
}

impl fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentProvider {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processor" => Ok(PaymentProvider::Processor),
            "manual" => Ok(PaymentProvider::Manual),
            other => Err(ValidationError::invalid_format(
                "provider",
                format!("unknown payment provider '{}'", other),
            )),
        }
    }
}

/// Fields shared by every newly created payment.
#[derive(Debug, Clone)]
pub struct PaymentDraft {
    pub id: PaymentId,
    pub lease_id: LeaseId,
    pub tenant_id: UserId,
    pub amount: PaymentAmount,
    pub currency: String,
    pub payment_type: PaymentType,
    pub description: Option<String>,
}

impl PaymentDraft {
    /// Starts a draft bound to the given lease and its current tenant.
    pub fn for_lease(
        id: PaymentId,
        lease: &LeaseSummary,
        amount: PaymentAmount,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id,
            lease_id: lease.id,
            tenant_id: lease.tenant_id().clone(),
            amount,
            currency: currency.into(),
            payment_type: PaymentType::default(),
            description: None,
        }
    }

    pub fn with_type(mut self, payment_type: PaymentType) -> Self {
        self.payment_type = payment_type;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }
}

/// Payment aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub lease_id: LeaseId,
    pub tenant_id: UserId,
    pub amount: PaymentAmount,
    pub currency: String,
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

impl Payment {
    /// Creates a pending payment backed by a processor intent.
    pub fn pending_intent(
        draft: PaymentDraft,
        provider_intent_id: impl Into<String>,
        due_date: Timestamp,
        fee: FeeBreakdown,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: draft.id,
            lease_id: draft.lease_id,
            tenant_id: draft.tenant_id,
            amount: draft.amount,
            currency: draft.currency,
            payment_type: draft.payment_type,
            status: PaymentStatus::Pending,
            provider: PaymentProvider::Processor,
            provider_intent_id: Some(provider_intent_id.into()),
            due_date,
            paid_date: None,
            fee_amount: fee.fee_amount,
            net_amount: fee.net_amount,
            description: draft.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a manual payment that is already paid.
    ///
    /// The due date is set to the paid date.
    pub fn manual(draft: PaymentDraft, paid_at: Timestamp, fee: FeeBreakdown) -> Self {
        let now = Timestamp::now();
        Self {
            id: draft.id,
            lease_id: draft.lease_id,
            tenant_id: draft.tenant_id,
            amount: draft.amount,
            currency: draft.currency,
            payment_type: draft.payment_type,
            status: PaymentStatus::Paid,
            provider: PaymentProvider::Manual,
            provider_intent_id: None,
            due_date: paid_at,
            paid_date: Some(paid_at),
            fee_amount: fee.fee_amount,
            net_amount: fee.net_amount,
            description: draft.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Status as presented to readers.
    ///
    /// A pending payment whose due date has passed reads as `Overdue`.
    pub fn effective_status(&self, now: &Timestamp) -> PaymentStatus {
        if self.status == PaymentStatus::Pending && now.is_after(&self.due_date) {
            PaymentStatus::Overdue
        } else {
            self.status
        }
    }

    /// Applies a status transition observed from the processor.
    ///
    /// Sets `paid_date` when moving to `Paid`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the transition is not allowed.
    pub fn apply_transition(
        &mut self,
        target: PaymentStatus,
        at: Timestamp,
    ) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(target)?;
        if target == PaymentStatus::Paid && self.paid_date.is_none() {
            self.paid_date = Some(at);
        }
        self.updated_at = at;
        Ok(())
    }
}

/// A payment together with the lease it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    pub payment: Payment,
    pub effective_status: PaymentStatus,
    pub lease: LeaseSummary,
}

impl PaymentDetails {
    pub fn new(payment: Payment, lease: LeaseSummary, now: &Timestamp) -> Self {
        let effective_status = payment.effective_status(now);
        Self {
            payment,
            effective_status,
            lease,
        }
    }
}
