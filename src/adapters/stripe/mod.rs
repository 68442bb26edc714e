//! Stripe processor adapter.
//!
//! Implements the `ProcessorClient` port for Stripe, including:
//! - PaymentIntent creation with idempotency keys
//! - PaymentIntent cancellation (compensation)
//! - Webhook signature verification
//!
//! # Security
//!
//! - Webhook signatures use HMAC-SHA256 with constant-time comparison
//! - Timestamps are validated to prevent replay attacks (5-minute window)
//! - All secrets are handled via `secrecy::SecretString`

mod mock_processor_client;
mod stripe_adapter;
mod webhook_types;

pub use mock_processor_client::{MockProcessorClient, MOCK_WEBHOOK_SIGNATURE};
pub use stripe_adapter::{StripeConfig, StripeProcessorClient};
pub use webhook_types::{SignatureHeader, SignatureParseError, StripeWebhookEvent};
