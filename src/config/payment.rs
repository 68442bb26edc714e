//! Payment configuration

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration (Stripe, fees, reconciliation)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe API key
    pub stripe_api_key: SecretString,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: SecretString,

    /// Stripe API base URL, overridable for local stubs
    pub stripe_api_base_url: Option<String>,

    /// ISO currency code charged for every payment
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Platform fee in basis points
    #[serde(default = "default_platform_fee_bps")]
    pub platform_fee_bps: u32,

    /// Processor call timeout in seconds
    #[serde(default = "default_processor_timeout")]
    pub processor_timeout_secs: u64,

    /// Attempts made to find the payment for a webhook event
    #[serde(default = "default_reconcile_max_attempts")]
    pub reconcile_max_attempts: u32,

    /// Initial backoff between reconciliation attempts, in milliseconds
    #[serde(default = "default_reconcile_backoff")]
    pub reconcile_backoff_ms: u64,

    /// Number of webhook events that may wait for the worker
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Number of webhook events reconciled concurrently
    #[serde(default = "default_reconcile_concurrency")]
    pub reconcile_concurrency: usize,

    /// Reject webhook events not sent in live mode
    #[serde(default)]
    pub require_livemode: bool,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.expose_secret().starts_with("sk_live_")
    }

    /// Get processor timeout as Duration
    pub fn processor_timeout(&self) -> Duration {
        Duration::from_secs(self.processor_timeout_secs)
    }

    /// Get initial reconciliation backoff as Duration
    pub fn reconcile_backoff(&self) -> Duration {
        Duration::from_millis(self.reconcile_backoff_ms)
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let api_key = self.stripe_api_key.expose_secret();
        let webhook_secret = self.stripe_webhook_secret.expose_secret();

        if api_key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_API_KEY"));
        }
        if webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_WEBHOOK_SECRET"));
        }

        // Verify key prefixes for safety
        if !api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }

        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCurrency);
        }
        if self.platform_fee_bps > 10_000 {
            return Err(ValidationError::InvalidPlatformFee);
        }
        if self.processor_timeout_secs == 0 || self.processor_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.reconcile_max_attempts == 0 {
            return Err(ValidationError::InvalidReconcileAttempts);
        }
        if self.queue_capacity == 0 {
            return Err(ValidationError::InvalidQueueCapacity);
        }

        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: SecretString::new(String::new()),
            stripe_webhook_secret: SecretString::new(String::new()),
            stripe_api_base_url: None,
            currency: default_currency(),
            platform_fee_bps: default_platform_fee_bps(),
            processor_timeout_secs: default_processor_timeout(),
            reconcile_max_attempts: default_reconcile_max_attempts(),
            reconcile_backoff_ms: default_reconcile_backoff(),
            queue_capacity: default_queue_capacity(),
            reconcile_concurrency: default_reconcile_concurrency(),
            require_livemode: false,
        }
    }
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_platform_fee_bps() -> u32 {
    250
}

fn default_processor_timeout() -> u64 {
    10
}

fn default_reconcile_max_attempts() -> u32 {
    5
}

fn default_reconcile_backoff() -> u64 {
    200
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_reconcile_concurrency() -> usize {
    32
}
