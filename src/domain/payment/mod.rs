//! Payment domain module.
//!
//! Rent payment issuance, fee calculation, ownership rules, and the status
//! lifecycle driven by processor notifications.
//!
//! # Module Structure
//!
//! - `aggregate` - Payment aggregate entity
//! - `amount` - PaymentAmount value object
//! - `fee` - Platform fee calculator
//! - `guard` - AuthorizationGuard ownership rules
//! - `lease` - Lease read model from the lease registry
//! - `processor_event` - Verified processor notifications
//! - `status` - PaymentStatus state machine

mod aggregate;
mod amount;
mod errors;
mod fee;
mod guard;
mod lease;
mod processor_event;
mod reconciliation_errors;
mod status;

pub use aggregate::{Payment, PaymentDetails, PaymentDraft, PaymentProvider, PaymentType};
pub use amount::{PaymentAmount, CURRENCY_SCALE, MAX_AMOUNT};
pub use errors::PaymentError;
pub use fee::{compute_fee, FeeBreakdown, MAX_FEE_RATE_BPS};
pub use guard::AuthorizationGuard;
pub use lease::{LeaseSummary, TenantSummary};
pub use processor_event::{
    ProcessorEvent, ProcessorEventKind, EVENT_PAYMENT_FAILED, EVENT_PAYMENT_SUCCEEDED,
};
pub use reconciliation_errors::ReconciliationError;
pub use status::PaymentStatus;
