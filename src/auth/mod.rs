//! Authentication: credentials, token pairs, and the OTP flow.

pub mod otp;
pub mod password;
pub mod tokens;

use serde::Serialize;

use crate::db::models::{Role, User};
use crate::db::{users, Database};
use crate::error::{AppError, AppResult};
use crate::storage::MediaStore;

use tokens::{issue_pair, verify, TokenPair};

/// Folder for uploaded profile images (kept permanently).
pub const PROFILE_IMAGE_FOLDER: &str = "konfess-profiles";

/// Token pair plus the authenticated user record.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub username: String,
    pub password: String,
}

/// Authenticate with username + password and issue a token pair.
///
/// # Errors
///
/// `InvalidCredentials` on unknown username or password mismatch; the two
/// cases are indistinguishable to the caller.
pub async fn login(
    db: &Database,
    secret: &[u8],
    username: &str,
    password: &str,
) -> AppResult<AuthResponse> {
    let user = users::find_by_username(db.pool(), username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !password::verify_password(password, &user.password)? {
        return Err(AppError::InvalidCredentials);
    }

    let pair = issue_pair(&user.id, &user.username, user.role, secret)?;
    Ok(AuthResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        user,
    })
}

/// Register a new account (role USER) with an optional profile image, and
/// issue the same token pair shape as `login`.
///
/// # Errors
///
/// `Conflict` if the username is taken; `Upstream` on hashing or upload
/// failure.
pub async fn register(
    db: &Database,
    media: &dyn MediaStore,
    secret: &[u8],
    registration: Registration,
    profile_image: Option<Vec<u8>>,
) -> AppResult<AuthResponse> {
    if users::find_by_username(db.pool(), &registration.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "User with this username already exists".into(),
        ));
    }

    let password_hash = password::hash_password(&registration.password)?;

    let profile_image_url = match profile_image {
        Some(bytes) => Some(media.upload(bytes, PROFILE_IMAGE_FOLDER).await?.url),
        None => None,
    };

    let user = users::create(
        db.pool(),
        users::NewUser {
            name: registration.name,
            username: registration.username,
            password_hash,
            role: Role::User,
            chat_id: None,
            profile_image: profile_image_url,
        },
    )
    .await?;

    let pair = issue_pair(&user.id, &user.username, user.role, secret)?;
    Ok(AuthResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        user,
    })
}

/// Exchange a refresh token for a new access + refresh pair with identical
/// claims. The supplied token is not invalidated.
///
/// # Errors
///
/// `InvalidToken` if verification fails for any reason.
pub fn refresh(secret: &[u8], refresh_token: &str) -> AppResult<TokenPair> {
    let claims = verify(refresh_token, secret)?;
    issue_pair(&claims.id, &claims.username, claims.role, secret)
}
