//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the rent payments domain.

mod auth;
mod authorization;
mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use auth::{Actor, ActorRole, AuthError};
pub use authorization::AuthorizationResult;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{LeaseId, PaymentId, PropertyId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
