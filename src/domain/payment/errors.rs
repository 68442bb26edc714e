//! Payment request-path error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ValidationFailed | 400 |
//! | Forbidden | 403 |
//! | LeaseNotFound | 404 |
//! | PaymentNotFound | 404 |
//! | ProcessorRejected | 400 |
//! | ProcessorUnavailable | 502 |
//! | ProcessorTimeout | 504 |
//! | Infrastructure | 500 |
//!
//! Processor variants keep the raw reason for logs; `message()` never
//! exposes it.

use crate::domain::foundation::{DomainError, ErrorCode, LeaseId, PaymentId, ValidationError};

/// Errors returned by payment commands and queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// Input failed validation before any I/O.
    ValidationFailed { field: String, message: String },

    /// Actor is not allowed to perform the operation.
    Forbidden { reason: String },

    /// Lease does not exist in the lease registry.
    LeaseNotFound(LeaseId),

    /// Payment does not exist.
    PaymentNotFound(PaymentId),

    /// Processor refused the request (declined, invalid parameters).
    ProcessorRejected { reason: String },

    /// Processor could not be reached or returned a server error.
    ProcessorUnavailable { reason: String },

    /// Processor did not answer within the configured timeout.
    ProcessorTimeout,

    /// Storage or other infrastructure failure.
    Infrastructure(String),
}

impl PaymentError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PaymentError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        PaymentError::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn lease_not_found(id: LeaseId) -> Self {
        PaymentError::LeaseNotFound(id)
    }

    pub fn payment_not_found(id: PaymentId) -> Self {
        PaymentError::PaymentNotFound(id)
    }

    pub fn processor_rejected(reason: impl Into<String>) -> Self {
        PaymentError::ProcessorRejected {
            reason: reason.into(),
        }
    }

    pub fn processor_unavailable(reason: impl Into<String>) -> Self {
        PaymentError::ProcessorUnavailable {
            reason: reason.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        PaymentError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PaymentError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            PaymentError::Forbidden { .. } => ErrorCode::Forbidden,
            PaymentError::LeaseNotFound(_) => ErrorCode::LeaseNotFound,
            PaymentError::PaymentNotFound(_) => ErrorCode::PaymentNotFound,
            PaymentError::ProcessorRejected { .. } => ErrorCode::ProcessorRejected,
            PaymentError::ProcessorUnavailable { .. } => ErrorCode::ProcessorUnavailable,
            PaymentError::ProcessorTimeout => ErrorCode::ProcessorTimeout,
            PaymentError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// Returns a client-safe error message.
    pub fn message(&self) -> String {
        match self {
            PaymentError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            PaymentError::Forbidden { reason } => reason.clone(),
            PaymentError::LeaseNotFound(id) => format!("Lease not found: {}", id),
            PaymentError::PaymentNotFound(id) => format!("Payment not found: {}", id),
            PaymentError::ProcessorRejected { .. } => {
                "The payment processor rejected the request".to_string()
            }
            PaymentError::ProcessorUnavailable { .. } => {
                "The payment processor is currently unavailable".to_string()
            }
            PaymentError::ProcessorTimeout => {
                "The payment processor did not respond in time".to_string()
            }
            PaymentError::Infrastructure(_) => "An internal error occurred".to_string(),
        }
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentError::ProcessorRejected { reason }
            | PaymentError::ProcessorUnavailable { reason } => {
                write!(f, "{} ({})", self.message(), reason)
            }
            PaymentError::Infrastructure(msg) => write!(f, "Infrastructure error: {}", msg),
            _ => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for PaymentError {}

impl From<ValidationError> for PaymentError {
    fn from(err: ValidationError) -> Self {
        PaymentError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for PaymentError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => PaymentError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::Forbidden => PaymentError::Forbidden {
                reason: err.message,
            },
            _ => PaymentError::Infrastructure(err.to_string()),
        }
    }
}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
