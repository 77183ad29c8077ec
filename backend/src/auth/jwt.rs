//! JWT token issuance and verification
//!
//! Tokens are HS256-signed, stateless and short-lived. There is no refresh
//! or revocation: a token stays valid until `exp`.

use anyhow::Result;
use chrono::Utc;
use fruit_pilot_shared::AuthError;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Display name, informational only
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Subject parsed as a user identifier
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::InvalidToken)
    }
}

/// Pre-computed JWT keys for efficient token operations
/// These are expensive to create, so we cache them in AppState
#[derive(Clone)]
struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

/// JWT service for token operations
///
/// Built once at startup from the configured secret and shared through
/// `AppState`. Cloning only bumps reference counts.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    validation: Arc<Validation>,
    expiry_secs: i64,
}

impl JwtService {
    /// Create a new JWT service with pre-computed keys
    pub fn new(secret: &str, expiry_secs: i64) -> Self {
        // Expiry is checked by hand in `verify_at` so that `exp == now`
        // is already expired and no leeway applies.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            keys: JwtKeys::new(secret),
            validation: Arc::new(validation),
            expiry_secs,
        }
    }

    /// Issue a token for a user, valid for the configured window
    #[inline]
    pub fn issue(&self, user_id: Uuid, username: &str) -> Result<String> {
        self.issue_at(user_id, username, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `issued_at`
    pub fn issue_at(&self, user_id: Uuid, username: &str, issued_at: i64) -> Result<String> {
        let exp = issued_at
            .checked_add(self.expiry_secs)
            .ok_or_else(|| anyhow::anyhow!("Token expiry overflows the timestamp range"))?;

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: issued_at,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to generate token: {}", e))
    }

    /// Verify a token against the current time
    #[inline]
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify signature and structure, then require `exp` strictly after `now`
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.keys.decoding, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "Token rejected");
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::InvalidToken,
                }
            })?;

        let claims = token_data.claims;
        if claims.exp <= now {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }

    /// Get token lifetime in seconds
    #[inline]
    pub fn expiry_secs(&self) -> i64 {
        self.expiry_secs
    }
}
