//! Processor event delivery.
//!
//! - `ReconciliationQueue` - Bounded in-process queue fed by the webhook endpoint
//! - `ReconciliationWorker` - Background task applying queued events concurrently

mod reconciliation_queue;

pub use reconciliation_queue::{
    reconciliation_channel, ReconciliationQueue, ReconciliationWorker, DEFAULT_MAX_IN_FLIGHT,
};
