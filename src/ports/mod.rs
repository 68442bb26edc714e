//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `PaymentRepository` - Payment records and conditional status updates
//! - `LeaseRegistry` - Read-only lease lookup
//!
//! ## External Service Ports
//!
//! - `ProcessorClient` - Payment processor intents and webhook verification
//! - `SessionValidator` - Bearer token validation
//!
//! ## Messaging Ports
//!
//! - `ProcessorEventQueue` - Webhook intake to reconciliation worker hand-off

mod lease_registry;
mod payment_repository;
mod processor_client;
mod processor_event_queue;
mod session_validator;

pub use lease_registry::LeaseRegistry;
pub use payment_repository::{PaymentRepository, StatusTransition};
pub use processor_client::{
    CreateIntentRequest, PaymentIntent, ProcessorClient, ProcessorError, ProcessorErrorCode,
};
pub use processor_event_queue::ProcessorEventQueue;
pub use session_validator::SessionValidator;
