//! Session validation port for bearer token validation.
//!
//! This port defines the contract for validating access tokens and extracting
//! the calling actor. It is issuer-agnostic; the shipped adapter validates
//! HS256 JWTs, and tests use in-memory token tables.
//!
//! All implementations MUST validate:
//! - **Signature**: Token must be signed by the expected key
//! - **Expiry (exp)**: Token must not be expired
//! - **Role**: Token must carry a role the platform recognizes

use async_trait::async_trait;

use crate::domain::foundation::{Actor, AuthError};

/// Validates access tokens and extracts the calling actor.
///
/// HTTP middleware uses this to validate Bearer tokens.
///
/// # Contract
///
/// Implementations must:
/// - Return `AuthError::InvalidToken` for malformed/bad signature tokens
/// - Return `AuthError::TokenExpired` for expired tokens
/// - Return `AuthError::UnsupportedRole` for unknown roles
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate an access token and return the authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `token` - The raw token (without "Bearer " prefix)
    async fn validate(&self, token: &str) -> Result<Actor, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use std::collections::HashMap;
    use std::sync::RwLock;

    /// Simple mock implementation for testing the trait
    struct TestSessionValidator {
        tokens: RwLock<HashMap<String, Actor>>,
    }

    impl TestSessionValidator {
        fn new() -> Self {
            Self {
                tokens: RwLock::new(HashMap::new()),
            }
        }

        fn add_valid_token(&self, token: &str, actor: Actor) {
            self.tokens.write().unwrap().insert(token.to_string(), actor);
        }
    }

    #[async_trait]
    impl SessionValidator for TestSessionValidator {
        async fn validate(&self, token: &str) -> Result<Actor, AuthError> {
            self.tokens
                .read()
                .unwrap()
                .get(token)
                .cloned()
                .ok_or(AuthError::InvalidToken)
        }
    }

    #[tokio::test]
    async fn session_validator_returns_actor_for_valid_token() {
        let validator = TestSessionValidator::new();
        validator.add_valid_token(
            "valid-token-123",
            Actor::landlord(UserId::new("landlord-1").unwrap()),
        );

        let actor = validator.validate("valid-token-123").await.unwrap();

        assert_eq!(actor.user_id.as_str(), "landlord-1");
    }

    #[tokio::test]
    async fn session_validator_returns_error_for_invalid_token() {
        let validator = TestSessionValidator::new();

        let result = validator.validate("invalid-token").await;

        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn session_validator_trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn SessionValidator>();
    }
}
