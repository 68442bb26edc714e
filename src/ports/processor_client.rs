//! Processor client port for the external payment processor.
//!
//! Defines the contract for creating and cancelling payment intents and for
//! authenticating webhook deliveries.
//!
//! # Design
//!
//! - **Processor agnostic**: Works with any card/ACH processor
//! - **Idempotent**: `create_intent` carries an idempotency key so a retried
//!   request never opens a second intent
//! - **No settlement logic**: Card and bank flows stay with the processor

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::payment::{PaymentAmount, PaymentError, ProcessorEvent, ReconciliationError};

/// Port for payment processor integrations.
#[async_trait]
pub trait ProcessorClient: Send + Sync {
    /// Create a payment intent for the given amount.
    ///
    /// Returns the processor's intent id and the client secret the payer's
    /// browser uses to confirm the payment.
    async fn create_intent(&self, request: CreateIntentRequest)
        -> Result<PaymentIntent, ProcessorError>;

    /// Cancel a previously created intent.
    ///
    /// Used as compensation when the local record could not be persisted.
    async fn cancel_intent(&self, provider_intent_id: &str) -> Result<(), ProcessorError>;

    /// Verify a webhook signature and parse the event.
    ///
    /// Returns the parsed event if valid, error if signature invalid.
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<ProcessorEvent, ProcessorError>;
}

/// Request to create a payment intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIntentRequest {
    /// Gross amount to collect.
    pub amount: PaymentAmount,

    /// ISO currency code (lowercase).
    pub currency: String,

    /// Idempotency key for safe retries.
    pub idempotency_key: String,

    /// Statement description shown to the payer.
    pub description: Option<String>,

    /// Correlation metadata stored on the intent (lease, tenant, payment ids).
    pub metadata: HashMap<String, String>,
}

/// Payment intent as returned by the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Processor's intent id (e.g. `pi_...`).
    pub provider_intent_id: String,

    /// Client secret for confirming the intent in the browser.
    pub client_token: String,
}

/// Processor error with code and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorError {
    pub code: ProcessorErrorCode,
    pub message: String,
    /// Processor-specific error code, if provided.
    pub provider_code: Option<String>,
}

impl ProcessorError {
    pub fn new(code: ProcessorErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    /// Attaches the processor's own error code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProcessorErrorCode::NetworkError, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProcessorErrorCode::AuthenticationError, message)
    }

    pub fn declined(message: impl Into<String>) -> Self {
        Self::new(ProcessorErrorCode::CardDeclined, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ProcessorErrorCode::InvalidRequest, message)
    }

    pub fn invalid_signature(message: impl Into<String>) -> Self {
        Self::new(ProcessorErrorCode::InvalidSignature, message)
    }

    pub fn malformed_payload(message: impl Into<String>) -> Self {
        Self::new(ProcessorErrorCode::MalformedPayload, message)
    }

    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl std::fmt::Display for ProcessorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ProcessorError {}

impl From<ProcessorError> for PaymentError {
    fn from(err: ProcessorError) -> Self {
        match err.code {
            ProcessorErrorCode::CardDeclined
            | ProcessorErrorCode::InvalidRequest
            | ProcessorErrorCode::NotFound => PaymentError::processor_rejected(err.to_string()),
            _ => PaymentError::processor_unavailable(err.to_string()),
        }
    }
}

impl From<ProcessorError> for ReconciliationError {
    fn from(err: ProcessorError) -> Self {
        match err.code {
            ProcessorErrorCode::MalformedPayload => ReconciliationError::MalformedPayload(err.message),
            _ => ReconciliationError::InvalidSignature,
        }
    }
}

/// Processor error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Payment method was declined.
    CardDeclined,

    /// Request parameters were rejected.
    InvalidRequest,

    /// Resource not found.
    NotFound,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Webhook signature missing, stale, or wrong.
    InvalidSignature,

    /// Webhook body authenticated but unreadable.
    MalformedPayload,

    /// Processor returned a server error.
    ProviderError,
}

impl ProcessorErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProcessorErrorCode::NetworkError
                | ProcessorErrorCode::RateLimitExceeded
                | ProcessorErrorCode::ProviderError
        )
    }
}

impl std::fmt::Display for ProcessorErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProcessorErrorCode::NetworkError => "network_error",
            ProcessorErrorCode::AuthenticationError => "authentication_error",
            ProcessorErrorCode::CardDeclined => "card_declined",
            ProcessorErrorCode::InvalidRequest => "invalid_request",
            ProcessorErrorCode::NotFound => "not_found",
            ProcessorErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            ProcessorErrorCode::InvalidSignature => "invalid_signature",
            ProcessorErrorCode::MalformedPayload => "malformed_payload",
            ProcessorErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processor_client_is_object_safe() {
        fn _accepts_dyn(_client: &dyn ProcessorClient) {}
    }

    #[test]
    fn network_errors_are_retryable() {
        assert!(ProcessorErrorCode::NetworkError.is_retryable());
        assert!(ProcessorErrorCode::RateLimitExceeded.is_retryable());

        assert!(!ProcessorErrorCode::CardDeclined.is_retryable());
        assert!(!ProcessorErrorCode::InvalidSignature.is_retryable());
    }

    #[test]
    fn processor_error_display_includes_code() {
        let err = ProcessorError::declined("Your card was declined").with_provider_code("card_declined");
        assert!(err.to_string().contains("card_declined"));
        assert!(err.to_string().contains("Your card was declined"));
        assert_eq!(err.provider_code.as_deref(), Some("card_declined"));
    }

    #[test]
    fn declines_map_to_rejected() {
        let err: PaymentError = ProcessorError::declined("nope").into();
        assert!(matches!(err, PaymentError::ProcessorRejected { .. }));
    }

    #[test]
    fn outages_map_to_unavailable() {
        let err: PaymentError = ProcessorError::network("connection reset").into();
        assert!(matches!(err, PaymentError::ProcessorUnavailable { .. }));

        let err: PaymentError = ProcessorError::authentication("bad key").into();
        assert!(matches!(err, PaymentError::ProcessorUnavailable { .. }));
    }

    #[test]
    fn webhook_errors_map_to_reconciliation_errors() {
        let err: ReconciliationError = ProcessorError::invalid_signature("mismatch").into();
        assert_eq!(err, ReconciliationError::InvalidSignature);

        let err: ReconciliationError = ProcessorError::malformed_payload("bad json").into();
        assert_eq!(err, ReconciliationError::MalformedPayload("bad json".to_string()));
    }
}
