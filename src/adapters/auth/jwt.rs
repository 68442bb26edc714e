//! HS256 JWT adapter for session validation.
//!
//! Validates bearer tokens signed with a shared secret and maps their claims
//! to an `Actor`:
//!
//! - **sub**: user id (non-blank)
//! - **role**: `tenant`, `landlord`, or `admin`
//! - **exp**: expiry, always enforced
//! - **iss**: checked only when an issuer is configured

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Actor, ActorRole, AuthError, UserId};
use crate::ports::SessionValidator;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Session validator for shared-secret JWTs.
pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    pub fn new(secret: &SecretString, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<Actor, AuthError> {
        let claims = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("Token expired");
                        AuthError::TokenExpired
                    }
                    ErrorKind::InvalidIssuer => {
                        tracing::warn!("Invalid issuer in token");
                        AuthError::InvalidToken
                    }
                    _ => {
                        tracing::warn!("Token validation failed: {}", e);
                        AuthError::InvalidToken
                    }
                }
            })?
            .claims;

        let user_id = UserId::new(&claims.sub).map_err(|_| {
            tracing::warn!("Token has a blank subject");
            AuthError::InvalidToken
        })?;

        let role: ActorRole = claims.role.parse().map_err(|_| {
            tracing::warn!(role = %claims.role, "Token carries an unsupported role");
            AuthError::UnsupportedRole(claims.role.clone())
        })?;

        Ok(Actor::new(user_id, role))
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator")
            .field("issuer", &self.validation.iss)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-at-least-32-bytes-long!!";

    fn secret() -> SecretString {
        SecretString::new(SECRET.to_string())
    }

    fn token(sub: &str, role: &str, exp_offset_secs: i64, iss: Option<&str>) -> String {
        let claims = AccessClaims {
            sub: sub.to_string(),
            role: role.to_string(),
            exp: Utc::now().timestamp() + exp_offset_secs,
            iss: iss.map(String::from),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn valid_token_maps_to_actor() {
        let validator = JwtSessionValidator::new(&secret(), None);

        let actor = validator
            .validate(&token("landlord-1", "landlord", 3600, None))
            .await
            .unwrap();

        assert_eq!(actor.user_id.as_str(), "landlord-1");
        assert_eq!(actor.role, ActorRole::Landlord);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let validator = JwtSessionValidator::new(&secret(), None);

        let result = validator.validate(&token("t-1", "tenant", -3600, None)).await;

        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected() {
        let validator =
            JwtSessionValidator::new(&SecretString::new("another-secret".to_string()), None);

        let result = validator.validate(&token("t-1", "tenant", 3600, None)).await;

        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn unknown_role_is_rejected() {
        let validator = JwtSessionValidator::new(&secret(), None);

        let result = validator.validate(&token("t-1", "owner", 3600, None)).await;

        assert!(matches!(result, Err(AuthError::UnsupportedRole(r)) if r == "owner"));
    }

    #[tokio::test]
    async fn issuer_is_checked_when_configured() {
        let validator = JwtSessionValidator::new(&secret(), Some("https://auth.example.com"));

        let good = token("t-1", "tenant", 3600, Some("https://auth.example.com"));
        assert!(validator.validate(&good).await.is_ok());

        let bad = token("t-1", "tenant", 3600, Some("https://evil.example.com"));
        assert!(matches!(
            validator.validate(&bad).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn garbage_is_rejected() {
        let validator = JwtSessionValidator::new(&secret(), None);
        assert!(validator.validate("not-a-jwt").await.is_err());
    }

    #[test]
    fn jwt_validator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<JwtSessionValidator>();
    }
}
