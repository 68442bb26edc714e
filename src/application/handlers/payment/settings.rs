//! Settings shared by the payment command handlers.

use std::time::Duration;

/// Currency, fee rate, and processor timeout applied to new payments.
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    /// ISO currency code sent to the processor (lowercase).
    pub currency: String,

    /// Platform fee in basis points (0..=10000).
    pub platform_fee_bps: u32,

    /// Upper bound on a single processor call.
    pub processor_timeout: Duration,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            currency: "usd".to_string(),
            platform_fee_bps: 250,
            processor_timeout: Duration::from_secs(10),
        }
    }
}

impl PaymentSettings {
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_platform_fee_bps(mut self, bps: u32) -> Self {
        self.platform_fee_bps = bps;
        self
    }

    pub fn with_processor_timeout(mut self, timeout: Duration) -> Self {
        self.processor_timeout = timeout;
        self
    }
}
