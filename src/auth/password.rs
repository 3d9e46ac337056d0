//! Password hashing via bcrypt.

use crate::error::{AppError, AppResult};

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Hash a password with bcrypt (cost 10).
///
/// # Errors
///
/// Returns `Upstream` if hashing fails.
pub fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, BCRYPT_COST)
        .map_err(|e| AppError::Upstream(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
///
/// # Errors
///
/// Returns `Upstream` if verification itself fails (malformed hash).
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    bcrypt::verify(password, hash).map_err(|e| AppError::Upstream(format!("bcrypt verify: {e}")))
}
