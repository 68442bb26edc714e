//! In-memory adapters for development and testing.

mod lease_registry;
mod payment_repository;

pub use lease_registry::InMemoryLeaseRegistry;
pub use payment_repository::InMemoryPaymentRepository;
