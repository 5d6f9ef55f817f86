//! Bearer-token authentication.
//!
//! Tokens are issued by the external auth service as HS256 JWTs. The `sub`
//! claim is the profile id. Role checks happen later against the profiles
//! table; this module only proves who the caller is.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use carecard_config::AuthConfig;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{config_error, unauthorized, CarecardError};

/// Claims we read from the auth service's tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Verifies bearer tokens. Cheap to clone; put one in each router state.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(config: &AuthConfig) -> Result<Self, CarecardError> {
        if config.jwt_secret.is_empty() {
            return Err(config_error("auth.jwt_secret is empty"));
        }
        let mut validation = Validation::new(Algorithm::HS256);
        match config.audience.as_deref() {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }
        Ok(Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, CarecardError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Rejected bearer token: {}", e);
                unauthorized("invalid or expired token")
            })
    }
}

/// Signs a token with the shared secret. Used by local tooling and tests to
/// stand in for the auth service.
pub fn encode_token(secret: &str, claims: &Claims) -> Result<String, CarecardError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| CarecardError::InternalError(format!("failed to sign token: {e}")))
}

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: Option<String>,
}

impl<S> FromRequestParts<S> for AuthUser
where
    JwtVerifier: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = CarecardError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| unauthorized("missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("expected a Bearer token"))?;

        let claims = JwtVerifier::from_ref(state).verify(token)?;
        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            audience: None,
        }
    }

    fn claims(sub: &str, exp_offset: i64) -> Claims {
        Claims {
            sub: sub.to_string(),
            exp: (chrono::Utc::now().timestamp() + exp_offset) as usize,
            email: Some("member@example.com".to_string()),
            aud: None,
        }
    }

    #[test]
    fn test_verify_valid_token() {
        let verifier = JwtVerifier::new(&config()).unwrap();
        let token = encode_token("test-secret", &claims("user-1", 3600)).unwrap();
        let decoded = verifier.verify(&token).unwrap();
        assert_eq!(decoded.sub, "user-1");
        assert_eq!(decoded.email.as_deref(), Some("member@example.com"));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let verifier = JwtVerifier::new(&config()).unwrap();
        let token = encode_token("other-secret", &claims("user-1", 3600)).unwrap();
        assert!(matches!(
            verifier.verify(&token),
            Err(CarecardError::AuthError(_))
        ));
    }

    #[test]
    fn test_verify_rejects_expired() {
        let verifier = JwtVerifier::new(&config()).unwrap();
        let token = encode_token("test-secret", &claims("user-1", -3600)).unwrap();
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_empty_secret_is_config_error() {
        let result = JwtVerifier::new(&AuthConfig::default());
        assert!(matches!(result, Err(CarecardError::ConfigError(_))));
    }
}
