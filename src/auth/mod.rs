use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{SecurityConfig, MAX_JWT_EXPIRY_HOURS};

pub mod password;

pub use password::{hash_password, verify_password, PasswordError};

/// Token claims. `sub` carries the Username the token was issued to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(username: impl Into<String>, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: username.into(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Signing and verification keys derived once from the configured secret
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl JwtKeys {
    /// `expiry_hours` is capped at [`MAX_JWT_EXPIRY_HOURS`]; config validation rejects larger values
    pub fn new(secret: &str, expiry_hours: u64) -> Self {
        let hours = i64::try_from(expiry_hours.min(MAX_JWT_EXPIRY_HOURS)).unwrap_or(0);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::try_hours(hours).unwrap_or_else(Duration::zero),
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(&security.jwt_secret, security.jwt_expiry_hours)
    }

    /// Token lifetime in seconds, reported to clients at login
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime.num_seconds()
    }

    pub fn issue(&self, username: &str) -> Result<String, JwtError> {
        self.encode(&Claims::new(username, self.lifetime))
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded claims
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })
    }
}
