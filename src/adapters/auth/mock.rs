//! Mock session validator for testing.
//!
//! # Example
//!
//! ```ignore
//! use rent_payments::adapters::auth::MockSessionValidator;
//!
//! let validator = MockSessionValidator::new()
//!     .with_tenant("tenant-token", "tenant-1")
//!     .with_landlord("landlord-token", "landlord-1");
//!
//! let actor = validator.validate("tenant-token").await?;
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{Actor, ActorRole, AuthError, UserId};
use crate::ports::SessionValidator;

/// Maps fixed tokens to actors. Unknown tokens return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, Actor>>,
    /// Returned for every validation when set.
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_actor(self, token: impl Into<String>, actor: Actor) -> Self {
        self.tokens.write().unwrap().insert(token.into(), actor);
        self
    }

    pub fn with_tenant(self, token: impl Into<String>, user_id: &str) -> Self {
        self.with_role(token, user_id, ActorRole::Tenant)
    }

    pub fn with_landlord(self, token: impl Into<String>, user_id: &str) -> Self {
        self.with_role(token, user_id, ActorRole::Landlord)
    }

    pub fn with_admin(self, token: impl Into<String>, user_id: &str) -> Self {
        self.with_role(token, user_id, ActorRole::Admin)
    }

    fn with_role(self, token: impl Into<String>, user_id: &str, role: ActorRole) -> Self {
        let actor = Actor::new(UserId::new(user_id).unwrap(), role);
        self.with_actor(token, actor)
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self.force_error.write().unwrap() = Some(error);
        self
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<Actor, AuthError> {
        if let Some(error) = self.force_error.read().unwrap().clone() {
            return Err(error);
        }

        self.tokens
            .read()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
