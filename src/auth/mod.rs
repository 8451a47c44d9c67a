pub mod bearer;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use bearer::extract_bearer_token;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Claims expiring `expiry_hours` from now. Fails instead of overflowing
    /// when the expiry cannot be represented.
    pub fn new(subject: impl Into<String>, expiry_hours: u64) -> Result<Self, JwtError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(JwtError::InvalidExpiry(expiry_hours))?;

        Ok(Self {
            sub: subject.into(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }
}

/// Who made the request, as far as the verifier could tell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub subject: Option<String>,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Authentication failures. Every variant maps to a 401.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingHeader,

    #[error("authorization header must use Bearer scheme")]
    NotBearer,

    #[error("empty bearer token")]
    EmptyToken,

    #[error("malformed bearer token")]
    Malformed,

    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Decides whether a bearer token identifies someone
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;

    fn name(&self) -> &'static str;
}

/// Accepts any token made of three non-empty dot-separated segments.
///
/// No signature or expiry is checked. This is a stand-in until an identity
/// provider is wired in; configure a JWT secret to get `JwtVerifier` instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeVerifier;

impl IdentityVerifier for ShapeVerifier {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
            return Err(AuthError::Malformed);
        }
        Ok(Identity::anonymous())
    }

    fn name(&self) -> &'static str {
        "shape"
    }
}

/// Verifies HS256 signature and expiry
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl IdentityVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        // Non-JWT shapes fail with `Malformed` before decoding
        ShapeVerifier.verify(token)?;

        let token_data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| AuthError::Invalid(e.to_string()))?;

        Ok(Identity {
            subject: Some(token_data.claims.sub),
        })
    }

    fn name(&self) -> &'static str {
        "jwt"
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Token expiry of {0} hours is out of range")]
    InvalidExpiry(u64),
}

pub fn generate_jwt(secret: &str, claims: &Claims) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}
