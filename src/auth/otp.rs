//! OTP session manager: one-time codes delivered over the bot transport.

use chrono::{Duration, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::bot::transport::{BotTransport, Formatting};
use crate::db::{sessions, users, Database};
use crate::error::{AppError, AppResult};

/// OTP validity window.
const OTP_TTL_MINUTES: i64 = 5;

/// Echo of a successfully verified (username, otp) pair.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OtpVerification {
    pub username: String,
    pub otp: String,
}

/// Generate a 6-digit code, uniformly random in [100000, 999999].
fn generate_code() -> String {
    rand::rng().random_range(100_000u32..=999_999).to_string()
}

/// Request an OTP for the user and deliver it to their linked chat.
///
/// A new session row is stored without invalidating earlier unconsumed
/// codes; verification matches the exact pair, not the latest row.
///
/// # Errors
///
/// `NotFound` if the user is unknown or has no linked chat; `Upstream` if
/// delivery fails.
pub async fn request(
    db: &Database,
    transport: &dyn BotTransport,
    username: &str,
) -> AppResult<()> {
    let user = users::find_by_username(db.pool(), username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let chat_id = user.chat_id.ok_or_else(|| {
        AppError::NotFound("This user has not binded with the telegram bot yet!".into())
    })?;

    let otp = generate_code();
    let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

    sessions::create(db.pool(), username, &otp, expires_at).await?;

    let message = format!(
        "សួរស្តី, {}!\n\nលេខកូដ OTP របស់អ្នកគឺ: {}\n\nសូមប្រើលេខកូដនេះដើម្បីបញ្ចប់ដំណើរការរបស់អ្នក។\n\n⚠️ ហាមចែករំលែកលេខកូដនេះជាមួយអ្នកណាផ្សេង៕",
        user.name, otp
    );

    transport
        .send_message(chat_id, &message, Formatting::Plain)
        .await?;

    info!(username, "OTP delivered");
    Ok(())
}

/// Verify an OTP for the user.
///
/// On a code match every session row for the username is removed first;
/// only then is expiry checked, so an expired code is rejected even though
/// its row is already gone. Both failure modes report `NotFound`.
///
/// # Errors
///
/// `NotFound` if the pair does not match or the code is expired.
pub async fn verify(db: &Database, username: &str, otp: &str) -> AppResult<OtpVerification> {
    let session = sessions::find_by_username_and_otp(db.pool(), username, otp)
        .await?
        .ok_or_else(|| AppError::NotFound("OTP is not valid".into()))?;

    sessions::delete_for_username(db.pool(), username).await?;

    if Utc::now() > session.expires_at {
        return Err(AppError::NotFound("OTP is expired".into()));
    }

    Ok(OtpVerification {
        username: username.to_string(),
        otp: otp.to_string(),
    })
}
