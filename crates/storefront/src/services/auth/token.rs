//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs carrying only the user ID and a validity window.
//! There is no server-side session: a token that verifies is the whole proof
//! of identity until it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use curbside_core::UserId;

/// Errors from signing or verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing failed.
    #[error("failed to sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    /// The token is past its expiry.
    #[error("token has expired")]
    Expired,

    /// Malformed, tampered, or signed with another key.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The user this token identifies.
    pub sub: UserId,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expires at (unix seconds).
    pub exp: i64,
}

/// Issues and verifies tokens with one shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("keys", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Create an issuer whose tokens live for `ttl`.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            ttl,
        }
    }

    /// Sign a token for `user`, valid from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails.
    pub fn issue(&self, user: UserId) -> Result<String, TokenError> {
        self.issue_at(user, Utc::now())
    }

    /// Sign a token for `user` as if issued at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails.
    pub fn issue_at(&self, user: UserId, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Encode)
    }

    /// Check the signature and expiry and return the claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for an expired token and
    /// `TokenError::Invalid` for anything else that fails verification.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(&SecretString::from(secret), Duration::days(30))
    }

    #[test]
    fn test_issue_then_verify() {
        let issuer = issuer("k3Y!pL9@vX2#mQ7$rT4%wZ8^nB1&cD6*");
        let user = UserId::generate();

        let claims = issuer.verify(&issuer.issue(user).unwrap()).unwrap();
        assert_eq!(claims.sub, user);
        assert_eq!(claims.exp - claims.iat, Duration::days(30).num_seconds());
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer("k3Y!pL9@vX2#mQ7$rT4%wZ8^nB1&cD6*");
        let long_ago = Utc::now() - Duration::days(31);

        let token = issuer.issue_at(UserId::generate(), long_ago).unwrap();
        assert!(matches!(issuer.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_foreign_key_rejected() {
        let ours = issuer("k3Y!pL9@vX2#mQ7$rT4%wZ8^nB1&cD6*");
        let theirs = issuer("Zq8&uN3!hJ6@eR1#tY5$oP0%aS4^dF7*");

        let token = theirs.issue(UserId::generate()).unwrap();
        assert!(matches!(ours.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        let issuer = issuer("k3Y!pL9@vX2#mQ7$rT4%wZ8^nB1&cD6*");
        assert!(matches!(
            issuer.verify("not.a.token"),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let issuer = issuer("k3Y!pL9@vX2#mQ7$rT4%wZ8^nB1&cD6*");
        assert!(!format!("{issuer:?}").contains("k3Y!"));
    }
}
