//! Error types for processor webhook intake and reconciliation.
//!
//! Only signature problems are reported back to the processor as failures.
//! Once a delivery is authenticated it is always acknowledged, because a
//! processor retry cannot fix a malformed payload or an unknown intent.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur while accepting or reconciling a processor event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconciliationError {
    /// The signature header was absent.
    #[error("Missing signature header")]
    MissingSignature,

    /// The signature did not match or the timestamp was outside the window.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The authenticated payload could not be interpreted.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// No payment carries the referenced intent id.
    #[error("Unknown intent: {0}")]
    UnknownIntent(String),

    /// Storage failed while applying the transition.
    #[error("Database error: {0}")]
    Database(String),

    /// The reconciliation queue no longer accepts events.
    #[error("Reconciliation queue closed")]
    QueueClosed,

    /// The reconciliation queue is at capacity.
    #[error("Reconciliation queue full")]
    QueueFull,
}

impl ReconciliationError {
    /// Maps the error to the status returned to the processor.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReconciliationError::InvalidSignature => StatusCode::UNAUTHORIZED,
            ReconciliationError::MissingSignature => StatusCode::BAD_REQUEST,

            // Authenticated deliveries are acknowledged
            ReconciliationError::MalformedPayload(_)
            | ReconciliationError::UnknownIntent(_)
            | ReconciliationError::Database(_) => StatusCode::OK,

            // Ask the processor to redeliver later
            ReconciliationError::QueueClosed | ReconciliationError::QueueFull => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }

    /// Returns true if the delivery is acknowledged despite the error.
    pub fn is_acknowledged(&self) -> bool {
        self.status_code() == StatusCode::OK
    }
}
