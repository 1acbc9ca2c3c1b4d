//! Auth session state for tinytalk.
//!
//! The hosted platform issues signed JWTs; the client never verifies them,
//! it only reads the claims to recover the user ID and expiry from a
//! cached token.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Claims tinytalk reads from the platform's tokens.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject (user ID)
    sub: String,
    /// Expiration time (unix seconds), if the platform sets one
    exp: Option<i64>,
}

/// An authenticated session against the hosted backend.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AuthSession {
    /// Bearer token
    pub token: String,

    /// The authenticated user's ID
    pub user_id: String,

    /// Token expiry (unix seconds), if known
    pub expires_at: Option<i64>,
}

impl AuthSession {
    /// Create a session from a token and an already-known user ID.
    pub fn new(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
            expires_at: None,
        }
    }

    /// Recover a session from a cached token by reading its claims.
    ///
    /// The signature is NOT verified; the backend re-checks it on every
    /// request anyway.
    pub fn from_token(token: &str) -> Result<Self> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| Error::Auth(format!("Could not read token claims: {}", e)))?;

        Ok(Self {
            token: token.to_string(),
            user_id: data.claims.sub,
            expires_at: data.claims.exp,
        })
    }

    /// Whether the token's expiry has passed.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(exp) => exp <= chrono::Utc::now().timestamp(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn make_token(sub: &str, exp: Option<i64>) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_session_from_token() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = make_token("u42", Some(exp));

        let session = AuthSession::from_token(&token).unwrap();
        assert_eq!(session.user_id, "u42");
        assert_eq!(session.expires_at, Some(exp));
        assert!(!session.is_expired());
    }

    #[test]
    fn test_expired_token_detected() {
        let token = make_token("u42", Some(chrono::Utc::now().timestamp() - 10));

        let session = AuthSession::from_token(&token).unwrap();
        assert!(session.is_expired());
    }

    #[test]
    fn test_token_without_expiry() {
        let token = make_token("u42", None);

        let session = AuthSession::from_token(&token).unwrap();
        assert_eq!(session.expires_at, None);
        assert!(!session.is_expired());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(AuthSession::from_token("not-a-jwt").is_err());
    }
}
