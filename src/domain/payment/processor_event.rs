//! Verified processor notifications.
//!
//! The processor adapter parses and authenticates a webhook delivery into a
//! `ProcessorEvent`. Only two event kinds move a payment; everything else is
//! acknowledged and ignored.

use serde::{Deserialize, Serialize};

use super::PaymentStatus;

/// Processor event type for a confirmed payment.
pub const EVENT_PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";

/// Processor event type for a failed payment attempt.
pub const EVENT_PAYMENT_FAILED: &str = "payment_intent.payment_failed";

/// Kind of processor notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessorEventKind {
    Succeeded,
    Failed,
    /// Any event type this subsystem does not act on.
    Other(String),
}

impl ProcessorEventKind {
    /// Classifies a raw processor event type string.
    pub fn from_event_type(event_type: &str) -> Self {
        match event_type {
            EVENT_PAYMENT_SUCCEEDED => ProcessorEventKind::Succeeded,
            EVENT_PAYMENT_FAILED => ProcessorEventKind::Failed,
            other => ProcessorEventKind::Other(other.to_string()),
        }
    }

    /// The status a pending payment moves to for this event, if any.
    pub fn target_status(&self) -> Option<PaymentStatus> {
        match self {
            ProcessorEventKind::Succeeded => Some(PaymentStatus::Paid),
            ProcessorEventKind::Failed => Some(PaymentStatus::Failed),
            ProcessorEventKind::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProcessorEventKind::Succeeded => EVENT_PAYMENT_SUCCEEDED,
            ProcessorEventKind::Failed => EVENT_PAYMENT_FAILED,
            ProcessorEventKind::Other(t) => t,
        }
    }
}

/// An authenticated notification from the payment processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorEvent {
    /// Processor-assigned event id (e.g. `evt_...`).
    pub event_id: String,

    pub kind: ProcessorEventKind,

    /// Intent the event refers to. Absent for non payment-intent events.
    pub provider_intent_id: Option<String>,

    /// Whether the event came from live mode.
    pub livemode: bool,
}

impl ProcessorEvent {
    pub fn new(
        event_id: impl Into<String>,
        kind: ProcessorEventKind,
        provider_intent_id: Option<String>,
        livemode: bool,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            kind,
            provider_intent_id,
            livemode,
        }
    }

    /// Shorthand for a succeeded event on the given intent.
    pub fn succeeded(event_id: impl Into<String>, intent_id: impl Into<String>) -> Self {
        Self::new(event_id, ProcessorEventKind::Succeeded, Some(intent_id.into()), false)
    }

    /// Shorthand for a failed event on the given intent.
    pub fn failed(event_id: impl Into<String>, intent_id: impl Into<String>) -> Self {
        Self::new(event_id, ProcessorEventKind::Failed, Some(intent_id.into()), false)
    }
}
