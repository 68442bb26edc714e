//! Payment handlers.
//!
//! ## Commands
//! - Creating processor-backed payment intents
//! - Recording manual payments
//! - Receiving processor webhooks
//! - Reconciling processor events (background worker)
//!
//! ## Queries
//! - Get a payment with its lease context
//! - List a lease's payment history

mod create_manual_payment;
mod create_payment_intent;
mod get_payment;
mod list_lease_payments;
mod receive_processor_webhook;
mod reconcile_payment;
mod settings;

#[cfg(test)]
mod fixtures;

// Commands
pub use create_manual_payment::{CreateManualPaymentCommand, CreateManualPaymentHandler};
pub use create_payment_intent::{
    CreatePaymentIntentCommand, CreatePaymentIntentHandler, CreatePaymentIntentResult,
};
pub use receive_processor_webhook::{
    ReceiveProcessorWebhookCommand, ReceiveProcessorWebhookHandler,
};
pub use reconcile_payment::{ReconcileOutcome, ReconcilePaymentHandler, ReconcilerConfig};

// Queries
pub use get_payment::{GetPaymentHandler, GetPaymentQuery};
pub use list_lease_payments::{
    LeasePaymentHistory, ListLeasePaymentsHandler, ListLeasePaymentsQuery, PaymentEntry,
};

pub use settings::PaymentSettings;
