//! Authorization support types.
//!
//! `AuthorizationResult` is the standard outcome of an ownership check. It
//! carries enough context to log the decision and to build a `Forbidden`
//! error without the caller re-describing the resource.
//!
//! The payment-specific rules that produce these results live in
//! `domain::payment::guard`.

use super::{DomainError, ErrorCode};

/// Result of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationResult {
    /// Whether access was granted.
    pub granted: bool,

    /// The action being authorized (e.g., "initiate_intent", "read").
    pub action: &'static str,

    /// The resource type being accessed (e.g., "Lease", "Payment").
    pub resource_type: &'static str,

    /// The ID of the resource being accessed.
    pub resource_id: String,

    /// The user who requested access.
    pub user_id: String,

    /// Reason for denial, if denied.
    pub denial_reason: Option<String>,
}

impl AuthorizationResult {
    /// Creates a successful authorization result.
    pub fn granted(
        action: &'static str,
        resource_type: &'static str,
        resource_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            granted: true,
            action,
            resource_type,
            resource_id: resource_id.into(),
            user_id: user_id.into(),
            denial_reason: None,
        }
    }

    /// Creates a denied authorization result.
    pub fn denied(
        action: &'static str,
        resource_type: &'static str,
        resource_id: impl Into<String>,
        user_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            granted: false,
            action,
            resource_type,
            resource_id: resource_id.into(),
            user_id: user_id.into(),
            denial_reason: Some(reason.into()),
        }
    }

    /// Converts this result to a `Result<(), DomainError>`.
    ///
    /// Returns `Ok(())` if granted, `Err(Forbidden)` if denied.
    pub fn into_result(self) -> Result<(), DomainError> {
        if self.granted {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                self.denial_reason
                    .unwrap_or_else(|| "Access denied".to_string()),
            )
            .with_detail("action", self.action)
            .with_detail("resource_type", self.resource_type)
            .with_detail("resource_id", self.resource_id))
        }
    }

    /// Returns true if access was granted.
    pub fn is_granted(&self) -> bool {
        self.granted
    }

    /// Returns true if access was denied.
    pub fn is_denied(&self) -> bool {
        !self.granted
    }

    /// Emits a tracing event describing the decision.
    pub fn log(&self) {
        if self.granted {
            tracing::debug!(
                action = self.action,
                resource_type = self.resource_type,
                resource_id = %self.resource_id,
                user_id = %self.user_id,
                "Authorization granted"
            );
        } else {
            tracing::warn!(
                action = self.action,
                resource_type = self.resource_type,
                resource_id = %self.resource_id,
                user_id = %self.user_id,
                reason = self.denial_reason.as_deref().unwrap_or("unspecified"),
                "Authorization denied"
            );
        }
    }
}
