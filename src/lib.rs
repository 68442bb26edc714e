//! Rent Payments - Payment and reconciliation service for rental leases
//!
//! Tenants pay rent through a card processor, landlords record payments
//! received offline, and signed processor webhooks settle pending payments.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
