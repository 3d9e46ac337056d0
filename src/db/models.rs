//! Persistent record types shared across repositories and the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Application roles, stored as TEXT.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default,
)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
    Superadmin,
}

impl Role {
    /// Stable uppercase name, as stored and as shown in bot cards.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::Superadmin => "SUPERADMIN",
        }
    }
}

/// Identity record. The password hash is never serialized.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub chat_id: Option<i64>,
    pub profile_image: Option<String>,
}

/// Ephemeral OTP session row; stale rows are only removed on a code match.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: String,
    pub username: String,
    pub otp: String,
    pub expires_at: DateTime<Utc>,
}

/// Sponsorship banner/logo entry managed by admins.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Sponsorship {
    pub id: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub image: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_serde() {
        let json = serde_json::to_string(&Role::Superadmin).expect("serialize");
        assert_eq!(json, "\"SUPERADMIN\"");
        let role: Role = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(role, Role::Superadmin);
    }

    #[test]
    fn user_serialization_hides_password() {
        let user = User {
            id: "u1".into(),
            name: "Dara".into(),
            username: "dara".into(),
            password: "hash".into(),
            role: Role::User,
            chat_id: Some(42),
            profile_image: None,
        };
        let json = serde_json::to_string(&user).expect("serialize");
        assert!(!json.contains("hash"));
        assert!(json.contains("\"chatId\":42"));
    }
}
