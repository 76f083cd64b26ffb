//! Signed identity tokens
//!
//! A stateless HS256 token carries the account's public fields for 24
//! hours. Tokens are minted at login/registration, carried in the `jwt`
//! cookie, and never revoked server-side; clearing the cookie or letting
//! the expiry pass is the only invalidation.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{Account, Role};

/// Token lifetime, matched by the cookie max-age
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Claims embedded in every identity token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountClaims {
    /// Account id (subject)
    pub sub: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    /// Issued-at (Unix timestamp, seconds)
    pub iat: i64,
    /// Expiry (Unix timestamp, seconds)
    pub exp: i64,
}

/// Verification failure. Callers must not branch on the variant: both
/// mean the bearer is treated as anonymous.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,
    #[error("expired token")]
    Expired,
}

/// Issues and verifies identity tokens with a process-wide secret.
/// Rotating the secret invalidates every outstanding token.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        // No leeway: an expired token is expired
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign the account's public fields into an opaque token string
    pub fn issue(&self, account: &Account) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = AccountClaims {
            sub: account.account_id,
            email: account.email.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            role: account.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Recover the claims when the signature is valid and the token is
    /// unexpired
    pub fn verify(&self, token: &str) -> Result<AccountClaims, TokenError> {
        decode::<AccountClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
