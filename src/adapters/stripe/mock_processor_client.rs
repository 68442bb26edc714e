//! Mock processor client for testing.
//!
//! Provides a configurable implementation of `ProcessorClient` for unit and
//! integration tests. Supports:
//! - Idempotent intent creation keyed by idempotency key
//! - Error injection per method
//! - Artificial latency for timeout tests
//! - Call tracking
//! - Webhook verification against a fixed signature

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::payment::ProcessorEvent;
use crate::ports::{CreateIntentRequest, PaymentIntent, ProcessorClient, ProcessorError};

/// Signature the mock accepts by default.
pub const MOCK_WEBHOOK_SIGNATURE: &str = "mock-signature";

/// Mock processor client.
///
/// # Example
///
/// ```ignore
/// let processor = MockProcessorClient::new();
/// processor.fail_method("create_intent", ProcessorError::network("down"));
///
/// let result = processor.create_intent(request).await;
/// assert!(result.is_err());
/// ```
#[derive(Clone, Default)]
pub struct MockProcessorClient {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Intents by idempotency key.
    intents: HashMap<String, PaymentIntent>,

    /// Requests in arrival order.
    create_requests: Vec<CreateIntentRequest>,

    /// Intent ids passed to `cancel_intent`.
    cancelled: Vec<String>,

    /// Errors returned by method name until cleared.
    method_errors: HashMap<&'static str, ProcessorError>,

    /// Delay applied before `create_intent` answers.
    create_delay: Option<Duration>,

    /// Signature accepted by `verify_webhook`; `None` rejects everything.
    accepted_signature: Option<String>,

    next_intent_number: u64,
}

impl MockProcessorClient {
    pub fn new() -> Self {
        let mock = Self::default();
        mock.inner.lock().unwrap().accepted_signature = Some(MOCK_WEBHOOK_SIGNATURE.to_string());
        mock
    }

    /// Create a mock that fails all webhook verifications.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.inner.lock().unwrap().accepted_signature = None;
        mock
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Make `method` fail with `error` until `clear_errors` is called.
    pub fn fail_method(&self, method: &'static str, error: ProcessorError) {
        self.inner.lock().unwrap().method_errors.insert(method, error);
    }

    pub fn clear_errors(&self) {
        self.inner.lock().unwrap().method_errors.clear();
    }

    /// Delay every `create_intent` response.
    pub fn set_create_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().create_delay = Some(delay);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Assertions
    // ════════════════════════════════════════════════════════════════════════════

    /// Number of `create_intent` calls received.
    pub fn create_calls(&self) -> usize {
        self.inner.lock().unwrap().create_requests.len()
    }

    pub fn last_create_request(&self) -> Option<CreateIntentRequest> {
        self.inner.lock().unwrap().create_requests.last().cloned()
    }

    /// Intent ids that were cancelled.
    pub fn cancelled_intents(&self) -> Vec<String> {
        self.inner.lock().unwrap().cancelled.clone()
    }

    fn injected_error(&self, method: &'static str) -> Option<ProcessorError> {
        self.inner.lock().unwrap().method_errors.get(method).cloned()
    }
}

#[async_trait]
impl ProcessorClient for MockProcessorClient {
    async fn create_intent(
        &self,
        request: CreateIntentRequest,
    ) -> Result<PaymentIntent, ProcessorError> {
        let delay = {
            let mut state = self.inner.lock().unwrap();
            state.create_requests.push(request.clone());
            state.create_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.injected_error("create_intent") {
            return Err(err);
        }

        let mut state = self.inner.lock().unwrap();
        if let Some(existing) = state.intents.get(&request.idempotency_key) {
            return Ok(existing.clone());
        }

        state.next_intent_number += 1;
        let id = format!("pi_mock_{}", state.next_intent_number);
        let intent = PaymentIntent {
            client_token: format!("{}_secret_mock", id),
            provider_intent_id: id,
        };
        state.intents.insert(request.idempotency_key, intent.clone());
        Ok(intent)
    }

    async fn cancel_intent(&self, provider_intent_id: &str) -> Result<(), ProcessorError> {
        self.inner
            .lock()
            .unwrap()
            .cancelled
            .push(provider_intent_id.to_string());

        match self.injected_error("cancel_intent") {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<ProcessorEvent, ProcessorError> {
        let accepted = self.inner.lock().unwrap().accepted_signature.clone();
        if accepted.as_deref() != Some(signature) {
            return Err(ProcessorError::invalid_signature("Invalid signature"));
        }

        serde_json::from_slice(payload)
            .map_err(|e| ProcessorError::malformed_payload(format!("Invalid JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentAmount;
    use crate::ports::ProcessorErrorCode;

    fn request(key: &str) -> CreateIntentRequest {
        CreateIntentRequest {
            amount: PaymentAmount::new("100".parse().unwrap()).unwrap(),
            currency: "usd".to_string(),
            idempotency_key: key.to_string(),
            description: None,
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn same_idempotency_key_returns_same_intent() {
        let mock = MockProcessorClient::new();
        let first = mock.create_intent(request("key-1")).await.unwrap();
        let second = mock.create_intent(request("key-1")).await.unwrap();
        let third = mock.create_intent(request("key-2")).await.unwrap();

        assert_eq!(first, second);
        assert_ne!(first.provider_intent_id, third.provider_intent_id);
        assert_eq!(mock.create_calls(), 3);
    }

    #[tokio::test]
    async fn injected_error_is_returned() {
        let mock = MockProcessorClient::new();
        mock.fail_method("create_intent", ProcessorError::network("down"));

        let err = mock.create_intent(request("k")).await.unwrap_err();
        assert_eq!(err.code, ProcessorErrorCode::NetworkError);

        mock.clear_errors();
        assert!(mock.create_intent(request("k")).await.is_ok());
    }

    #[tokio::test]
    async fn verify_webhook_requires_mock_signature() {
        let mock = MockProcessorClient::new();
        let payload = serde_json::to_vec(&ProcessorEvent::succeeded("evt_1", "pi_1")).unwrap();

        let event = mock.verify_webhook(&payload, MOCK_WEBHOOK_SIGNATURE).await.unwrap();
        assert_eq!(event.provider_intent_id.as_deref(), Some("pi_1"));

        let err = mock.verify_webhook(&payload, "forged").await.unwrap_err();
        assert_eq!(err.code, ProcessorErrorCode::InvalidSignature);
    }

    #[tokio::test]
    async fn rejecting_mock_refuses_every_signature() {
        let mock = MockProcessorClient::rejecting_webhooks();
        let result = mock.verify_webhook(b"{}", MOCK_WEBHOOK_SIGNATURE).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn cancel_is_recorded() {
        let mock = MockProcessorClient::new();
        mock.cancel_intent("pi_9").await.unwrap();
        assert_eq!(mock.cancelled_intents(), vec!["pi_9".to_string()]);
    }
}
