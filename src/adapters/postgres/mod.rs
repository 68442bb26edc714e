//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresPaymentRepository` - Payment records with conditional status updates
//! - `PostgresLeaseRegistry` - Read-only lease lookup joined with property ownership

mod lease_registry;
mod payment_repository;

pub use lease_registry::PostgresLeaseRegistry;
pub use payment_repository::PostgresPaymentRepository;
