//! HTTP adapter for payment endpoints.
//!
//! Exposes the payment domain via REST API:
//! - `POST /api/payments/intent` - Open a processor payment intent (tenant)
//! - `POST /api/payments/manual` - Record an off-processor payment (landlord)
//! - `GET /api/payments/:id` - Fetch a payment with its lease summary
//! - `GET /api/leases/:lease_id/payments` - Payment history of a lease
//! - `POST /api/webhooks/processor` - Receive processor webhooks
//! - `GET /health` - Liveness probe

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{PaymentApiError, PaymentAppState, SIGNATURE_HEADER};
pub use routes::{payment_router, payment_routes, webhook_routes};
