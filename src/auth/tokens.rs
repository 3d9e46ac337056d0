//! JWT token issuance and verification (HS256).
//!
//! Refresh does not rotate: verifying a refresh token never invalidates it,
//! so several refresh tokens for one identity can be live at once until they
//! expire on their own.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::models::Role;
use crate::error::{AppError, AppResult};

/// Access token lifetime: 15 minutes.
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
/// Refresh token lifetime: 7 days.
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Identity claims carried by both access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issue a signed token carrying the identity, valid for `ttl_secs`.
///
/// # Errors
///
/// Returns `Upstream` if signing fails.
pub fn issue(
    id: &str,
    username: &str,
    role: Role,
    ttl_secs: i64,
    secret: &[u8],
) -> AppResult<String> {
    let now = Utc::now();
    let claims = TokenClaims {
        id: id.to_string(),
        username: username.to_string(),
        role,
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_secs)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AppError::Upstream(format!("jwt encode: {e}")))
}

/// Issue the standard access + refresh pair for one identity.
///
/// # Errors
///
/// Returns `Upstream` if signing fails.
pub fn issue_pair(id: &str, username: &str, role: Role, secret: &[u8]) -> AppResult<TokenPair> {
    Ok(TokenPair {
        access_token: issue(id, username, role, ACCESS_TOKEN_TTL_SECS, secret)?,
        refresh_token: issue(id, username, role, REFRESH_TOKEN_TTL_SECS, secret)?,
    })
}

/// Verify a token, failing closed on signature mismatch, expiry, or shape.
///
/// # Errors
///
/// Returns `InvalidToken` for any verification failure.
pub fn verify(token: &str, secret: &[u8]) -> AppResult<TokenClaims> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<TokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
}
