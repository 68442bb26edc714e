//! Processor event queue port.
//!
//! The webhook endpoint only authenticates and enqueues. A background
//! worker drains the queue and applies each event in its own task.

use async_trait::async_trait;

use crate::domain::payment::{ProcessorEvent, ReconciliationError};

/// Hand-off point between webhook intake and reconciliation.
#[async_trait]
pub trait ProcessorEventQueue: Send + Sync {
    /// Enqueue a verified event for reconciliation without waiting for space.
    ///
    /// # Errors
    ///
    /// - `QueueFull` when the queue is at capacity
    /// - `QueueClosed` once the worker has shut down
    async fn enqueue(&self, event: ProcessorEvent) -> Result<(), ReconciliationError>;
}
