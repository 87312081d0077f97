//! Bearer token issuing and verification.
//!
//! Tokens are HMAC-signed JWTs carrying the subject (username) and an
//! absolute expiry. The signing key is loaded once at startup and shared
//! process-wide; verification is stateless and happens on every request.
//! Expiry is a hard absolute-time comparison with zero leeway.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use clementine_core::Username;

/// Errors that can occur verifying or issuing a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The input is not structurally a token.
    #[error("malformed token")]
    Malformed,

    /// The token's expiry is in the past.
    #[error("expired token")]
    Expired,

    /// The signature does not verify (wrong key, tampered payload, or
    /// wrong algorithm).
    #[error("invalid token")]
    Invalid,

    /// Signing failed; only possible with unusable key material.
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Registered claims carried by every Clementine token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject: the username of the authenticated account.
    sub: String,
    /// Absolute expiry, seconds since the Unix epoch.
    exp: i64,
    /// Issued-at, seconds since the Unix epoch.
    iat: i64,
}

/// Process-wide token issuer/verifier.
///
/// Holds the derived key material; construct once in `AppState` and share
/// by reference.
pub struct TokenKeeper {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl_seconds: i64,
    validation: Validation,
}

impl TokenKeeper {
    /// Create a keeper from the configured secret, algorithm, and TTL.
    #[must_use]
    pub fn new(secret: &SecretString, algorithm: Algorithm, ttl_minutes: u64) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(algorithm);
        // Hard absolute-time expiry: no clock-skew compensation.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret_bytes),
            decoding_key: DecodingKey::from_secret(secret_bytes),
            algorithm,
            ttl_seconds: i64::try_from(ttl_minutes).unwrap_or(i64::MAX / 60) * 60,
            validation,
        }
    }

    /// Issue a signed token for `subject`, expiring TTL from now.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if encoding fails.
    pub fn issue(&self, subject: &Username) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.as_str().to_owned(),
            exp: now + self.ttl_seconds,
            iat: now,
        };

        jsonwebtoken::encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Verify a token and return its subject.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Malformed`] on structurally invalid input
    /// - [`TokenError::Expired`] if the expiry is in the past
    /// - [`TokenError::Invalid`] on signature or algorithm mismatch
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::InvalidToken
                    | ErrorKind::Base64(_)
                    | ErrorKind::Json(_)
                    | ErrorKind::Utf8(_) => TokenError::Malformed,
                    _ => TokenError::Invalid,
                }
            })?;

        Ok(data.claims.sub)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn keeper_with(secret: &str) -> TokenKeeper {
        TokenKeeper::new(&SecretString::from(secret.to_owned()), Algorithm::HS256, 30)
    }

    fn keeper() -> TokenKeeper {
        keeper_with("GkP9vW2xRq8tLz4mNc7yBh5jDf3sAe6u")
    }

    fn subject() -> Username {
        Username::parse("alice").unwrap()
    }

    #[test]
    fn issue_then_verify_roundtrip() {
        let keeper = keeper();
        let token = keeper.issue(&subject()).expect("token issue");
        let sub = keeper.verify(&token).expect("token verify");
        assert_eq!(sub, "alice");
    }

    #[test]
    fn verify_rejects_expired() {
        let keeper = keeper();

        // Encode an already-expired claim set with the same key.
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "alice".to_owned(),
            exp: now - 120,
            iat: now - 240,
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &keeper.encoding_key,
        )
        .unwrap();

        assert!(matches!(keeper.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn verify_rejects_malformed() {
        let keeper = keeper();
        assert!(matches!(
            keeper.verify("not-a-token"),
            Err(TokenError::Malformed)
        ));
        assert!(matches!(keeper.verify(""), Err(TokenError::Malformed)));
    }

    #[test]
    fn verify_rejects_foreign_signature() {
        let token = keeper().issue(&subject()).unwrap();
        let other = keeper_with("Zt6yQn3wEr9uIo1pAs5dFg8hJk2lXc4v");
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn verify_rejects_algorithm_mismatch() {
        let secret = SecretString::from("GkP9vW2xRq8tLz4mNc7yBh5jDf3sAe6u".to_owned());
        let hs512 = TokenKeeper::new(&secret, Algorithm::HS512, 30);
        let token = hs512.issue(&subject()).unwrap();
        assert!(matches!(keeper().verify(&token), Err(TokenError::Invalid)));
    }
}
