//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Bearer token validation (JWT, mock)
//! - `events` - In-process reconciliation queue and worker
//! - `http` - Axum REST API
//! - `memory` - In-memory repositories for development and tests
//! - `postgres` - PostgreSQL repositories
//! - `stripe` - Stripe payment processor client (and a mock)

pub mod auth;
pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;

pub use auth::{JwtSessionValidator, MockSessionValidator};
pub use events::{reconciliation_channel, ReconciliationQueue, ReconciliationWorker};
pub use memory::{InMemoryLeaseRegistry, InMemoryPaymentRepository};
pub use postgres::{PostgresLeaseRegistry, PostgresPaymentRepository};
pub use stripe::{MockProcessorClient, StripeConfig, StripeProcessorClient, MOCK_WEBHOOK_SIGNATURE};
