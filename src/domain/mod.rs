//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, actors, errors)
//! - `payment` - Payment aggregate, fee calculation, authorization and
//!   processor event types
pub mod foundation;
pub mod payment;
