//! Stripe processor client adapter.
//!
//! Implements `ProcessorClient` against the Stripe PaymentIntents API.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window) for replay attack prevention
//! - Secrets handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key, webhook_secret);
//! let client = StripeProcessorClient::new(config);
//! ```

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::payment::{ProcessorEvent, ProcessorEventKind};
use crate::ports::{
    CreateIntentRequest, PaymentIntent, ProcessorClient, ProcessorError, ProcessorErrorCode,
};

use super::webhook_types::{
    SignatureHeader, StripeErrorResponse, StripePaymentIntent, StripeWebhookEvent,
};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age for webhook events (5 minutes).
const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for Stripe API.
    api_base_url: String,

    /// Whether to reject test-mode events.
    require_livemode: bool,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            require_livemode: false,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Require livemode events in production.
    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }
}

/// Stripe processor client.
pub struct StripeProcessorClient {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeProcessorClient {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Verify webhook signature using HMAC-SHA256.
    ///
    /// Accepts the delivery if any `v1` signature matches.
    fn verify_signature(&self, payload: &[u8], header: &SignatureHeader) -> Result<(), ProcessorError> {
        let now = chrono::Utc::now().timestamp();
        let age = now - header.timestamp;

        if age > MAX_TIMESTAMP_AGE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                age_secs = age,
                "Webhook event too old - possible replay attack"
            );
            return Err(ProcessorError::invalid_signature(format!(
                "Event too old ({} seconds)",
                age
            )));
        }

        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                "Webhook event from future - clock skew or manipulation"
            );
            return Err(ProcessorError::invalid_signature("Event timestamp in future"));
        }

        let mut mac = HmacSha256::new_from_slice(self.config.webhook_secret.expose_secret().as_bytes())
            .map_err(|e| ProcessorError::invalid_signature(format!("Invalid signing key: {}", e)))?;
        mac.update(header.timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        let expected = mac.finalize().into_bytes();
        let expected_bytes: &[u8] = expected.as_slice();

        let matched = header
            .v1_signatures
            .iter()
            .any(|provided| expected_bytes.ct_eq(provided.as_slice()).unwrap_u8() == 1);

        if !matched {
            tracing::warn!(
                provided_count = header.v1_signatures.len(),
                event_timestamp = header.timestamp,
                "Invalid webhook signature"
            );
            return Err(ProcessorError::invalid_signature("Invalid signature"));
        }

        Ok(())
    }

    /// Parse a verified payload into a domain event.
    fn parse_event(&self, payload: &[u8]) -> Result<ProcessorEvent, ProcessorError> {
        let stripe_event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            ProcessorError::malformed_payload(format!("Invalid JSON: {}", e))
        })?;

        if self.config.require_livemode && !stripe_event.livemode {
            tracing::warn!(
                event_id = %stripe_event.id,
                "Rejected test mode event in production"
            );
            return Err(ProcessorError::invalid_signature(
                "Test mode events not allowed in production",
            ));
        }

        let kind = ProcessorEventKind::from_event_type(&stripe_event.event_type);
        let provider_intent_id = if stripe_event.event_type.starts_with("payment_intent.") {
            let intent: StripePaymentIntent = serde_json::from_value(stripe_event.data.object)
                .map_err(|e| {
                    ProcessorError::malformed_payload(format!("Invalid payment intent: {}", e))
                })?;
            Some(intent.id)
        } else {
            None
        };

        Ok(ProcessorEvent::new(
            stripe_event.id,
            kind,
            provider_intent_id,
            stripe_event.livemode,
        ))
    }

    /// Convert a non-success Stripe response into a processor error.
    async fn error_from_response(&self, operation: &str, response: reqwest::Response) -> ProcessorError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<StripeErrorResponse>(&body).ok();

        let code = match (status.as_u16(), parsed.as_ref().map(|p| p.error.error_type.as_str())) {
            (_, Some("card_error")) | (402, _) => ProcessorErrorCode::CardDeclined,
            (401, _) | (403, _) => ProcessorErrorCode::AuthenticationError,
            (404, _) => ProcessorErrorCode::NotFound,
            (429, _) => ProcessorErrorCode::RateLimitExceeded,
            (400, _) | (409, _) | (_, Some("invalid_request_error")) => {
                ProcessorErrorCode::InvalidRequest
            }
            _ => ProcessorErrorCode::ProviderError,
        };

        tracing::error!(
            operation,
            status = status.as_u16(),
            error_code = %code,
            "Stripe API request failed"
        );

        let message = parsed
            .as_ref()
            .and_then(|p| p.error.message.clone())
            .unwrap_or_else(|| format!("Stripe API error (HTTP {})", status.as_u16()));
        let mut err = ProcessorError::new(code, message);
        if let Some(provider_code) = parsed.and_then(|p| p.error.decline_code.or(p.error.code)) {
            err = err.with_provider_code(provider_code);
        }
        err
    }
}

fn network_error(err: reqwest::Error) -> ProcessorError {
    ProcessorError::network(err.to_string())
}

#[async_trait]
impl ProcessorClient for StripeProcessorClient {
    async fn create_intent(
        &self,
        request: CreateIntentRequest,
    ) -> Result<PaymentIntent, ProcessorError> {
        let url = format!("{}/v1/payment_intents", self.config.api_base_url);
        let minor_units = request
            .amount
            .to_minor_units()
            .map_err(|e| ProcessorError::invalid_request(e.to_string()))?;

        let mut params: Vec<(String, String)> = vec![
            ("amount".to_string(), minor_units.to_string()),
            ("currency".to_string(), request.currency.to_lowercase()),
            ("automatic_payment_methods[enabled]".to_string(), "true".to_string()),
        ];
        if let Some(description) = &request.description {
            params.push(("description".to_string(), description.clone()));
        }
        for (key, value) in &request.metadata {
            params.push((format!("metadata[{}]", key), value.clone()));
        }

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .header("Idempotency-Key", &request.idempotency_key)
            .form(&params)
            .send()
            .await
            .map_err(network_error)?;

        if !response.status().is_success() {
            return Err(self.error_from_response("create_intent", response).await);
        }

        let intent: StripePaymentIntent = response.json().await.map_err(|e| {
            ProcessorError::new(
                ProcessorErrorCode::ProviderError,
                format!("Failed to parse Stripe response: {}", e),
            )
        })?;

        let client_token = intent.client_secret.ok_or_else(|| {
            ProcessorError::new(
                ProcessorErrorCode::ProviderError,
                "Stripe response missing client_secret",
            )
        })?;

        tracing::info!(
            provider_intent_id = %intent.id,
            idempotency_key = %request.idempotency_key,
            "Created payment intent"
        );

        Ok(PaymentIntent {
            provider_intent_id: intent.id,
            client_token,
        })
    }

    async fn cancel_intent(&self, provider_intent_id: &str) -> Result<(), ProcessorError> {
        let url = format!(
            "{}/v1/payment_intents/{}/cancel",
            self.config.api_base_url, provider_intent_id
        );

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&[("cancellation_reason", "abandoned")])
            .send()
            .await
            .map_err(network_error)?;

        if !response.status().is_success() {
            return Err(self.error_from_response("cancel_intent", response).await);
        }

        tracing::info!(provider_intent_id, "Cancelled payment intent");
        Ok(())
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<ProcessorEvent, ProcessorError> {
        let header = SignatureHeader::parse(signature).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse Stripe-Signature header");
            ProcessorError::invalid_signature(e.to_string())
        })?;

        self.verify_signature(payload, &header)?;

        let event = self.parse_event(payload)?;

        tracing::info!(
            event_id = %event.event_id,
            event_type = event.kind.as_str(),
            "Webhook signature verified"
        );

        Ok(event)
    }
}
